use serde::{Deserialize, Serialize};

/// A point in screen pixels or projected map units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Screen position in pixels relative to the surface origin
pub type Pixel = Point;

/// Position in the surface's projected map units
pub type Coordinate = Point;

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Scales both axes, e.g. pixels by a view resolution
    pub fn multiply(&self, scalar: f64) -> Point {
        Point::new(self.x * scalar, self.y * scalar)
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl From<geo_types::Coord<f64>> for Point {
    fn from(coord: geo_types::Coord<f64>) -> Self {
        Self::new(coord.x, coord.y)
    }
}

impl From<Point> for geo_types::Coord<f64> {
    fn from(point: Point) -> Self {
        geo_types::coord! { x: point.x, y: point.y }
    }
}
