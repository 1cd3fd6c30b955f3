use crate::core::geo::Point;
use serde::{Deserialize, Serialize};

/// Axis-aligned extent in projected map units or pixels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    /// Creates new bounds from two points
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// Creates bounds from individual coordinates
    pub fn from_coords(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self::new(Point::new(min_x, min_y), Point::new(max_x, max_y))
    }

    /// Square bounds of half-width `radius` around `center`
    pub fn around(center: Point, radius: f64) -> Self {
        Self::from_coords(
            center.x - radius,
            center.y - radius,
            center.x + radius,
            center.y + radius,
        )
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }

    /// Extends the bounds to include a point
    pub fn extend(&mut self, point: &Point) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
    }

    /// Extends the bounds to include another bounds
    pub fn extend_bounds(&mut self, other: &Bounds) {
        self.extend(&other.min);
        self.extend(&other.max);
    }

    /// Union of all extents, `None` when the iterator is empty
    pub fn union_all<I>(extents: I) -> Option<Bounds>
    where
        I: IntoIterator<Item = Bounds>,
    {
        extents.into_iter().fold(None, |acc, next| match acc {
            None => Some(next),
            Some(mut acc) => {
                acc.extend_bounds(&next);
                Some(acc)
            }
        })
    }
}

impl From<geo_types::Rect<f64>> for Bounds {
    fn from(rect: geo_types::Rect<f64>) -> Self {
        Self::new(rect.min().into(), rect.max().into())
    }
}
