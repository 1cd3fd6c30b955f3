//! Feature selection
//!
//! [`model::SelectionModel`] records which features are selected,
//! [`highlight::HighlightRenderer`] paints them and [`handler::SelectHandler`]
//! drives both from hit-testing or programmatic queries.

pub mod handler;
pub mod highlight;
pub mod model;

pub use handler::{
    FeatureFilter, ProgrammaticSelectOptions, SelectCallback, SelectEvent, SelectHandler,
    SelectMode, SelectOptions,
};
pub use highlight::{HighlightRenderer, SelectStyle, StyleFn};
pub use model::{SelectionDiff, SelectionModel};
