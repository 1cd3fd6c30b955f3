use geo_types::Geometry;
use serde::{Deserialize, Serialize};

/// RGBA color that serializes as plain components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Builds a color from an opacity in `0.0..=1.0`
    pub fn rgba(r: u8, g: u8, b: u8, alpha: f32) -> Self {
        let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self { r, g, b, a }
    }
}

/// Style for point features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointStyle {
    pub fill_color: SerializableColor,
    pub stroke_color: SerializableColor,
    pub stroke_width: f32,
    pub radius: f32,
    pub opacity: f32,
}

impl Default for PointStyle {
    fn default() -> Self {
        Self {
            fill_color: SerializableColor::rgba(255, 0, 0, 0.6),
            stroke_color: SerializableColor::rgb(255, 0, 0),
            stroke_width: 2.0,
            radius: 7.0,
            opacity: 1.0,
        }
    }
}

/// Style for line features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    pub color: SerializableColor,
    pub width: f32,
    pub opacity: f32,
    /// Line dash pattern (empty for solid line)
    pub dash_pattern: Vec<f32>,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            color: SerializableColor::rgb(255, 0, 0),
            width: 3.0,
            opacity: 1.0,
            dash_pattern: Vec::new(),
        }
    }
}

/// Style for polygon features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonStyle {
    pub fill_color: SerializableColor,
    pub stroke_color: SerializableColor,
    pub stroke_width: f32,
    pub fill_opacity: f32,
    pub stroke_opacity: f32,
}

impl Default for PolygonStyle {
    fn default() -> Self {
        Self {
            fill_color: SerializableColor::rgba(255, 0, 0, 0.2),
            stroke_color: SerializableColor::rgb(255, 0, 0),
            stroke_width: 2.0,
            fill_opacity: 1.0,
            stroke_opacity: 1.0,
        }
    }
}

/// Resolved style a highlight layer is painted with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum HighlightStyle {
    Point(PointStyle),
    Line(LineStyle),
    Polygon(PolygonStyle),
}

impl HighlightStyle {
    pub fn kind(&self) -> GeometryKind {
        match self {
            HighlightStyle::Point(_) => GeometryKind::Point,
            HighlightStyle::Line(_) => GeometryKind::Line,
            HighlightStyle::Polygon(_) => GeometryKind::Polygon,
        }
    }
}

/// Coarse geometry classification used for default styles and click filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryKind {
    Point,
    Line,
    Polygon,
}

impl GeometryKind {
    /// Classifies a geometry; multi-variants fold into their base kind.
    /// Collections and a missing geometry fall back to `Point`.
    pub fn of(geometry: Option<&Geometry<f64>>) -> Self {
        match geometry {
            Some(Geometry::LineString(_))
            | Some(Geometry::MultiLineString(_))
            | Some(Geometry::Line(_)) => GeometryKind::Line,
            Some(Geometry::Polygon(_))
            | Some(Geometry::MultiPolygon(_))
            | Some(Geometry::Rect(_))
            | Some(Geometry::Triangle(_)) => GeometryKind::Polygon,
            _ => GeometryKind::Point,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GeometryKind::Point => "point",
            GeometryKind::Line => "line",
            GeometryKind::Polygon => "polygon",
        }
    }
}

impl std::str::FromStr for GeometryKind {
    type Err = crate::MapError;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s {
            "point" => Ok(GeometryKind::Point),
            "line" => Ok(GeometryKind::Line),
            "polygon" => Ok(GeometryKind::Polygon),
            other => Err(crate::MapError::validation(format!(
                "Unknown geometry kind '{}'",
                other
            ))),
        }
    }
}
