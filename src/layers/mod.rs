pub mod feature;
pub mod style;

pub use feature::{SimpleFeature, VectorLayer};
pub use style::{
    GeometryKind, HighlightStyle, LineStyle, PointStyle, PolygonStyle, SerializableColor,
};
