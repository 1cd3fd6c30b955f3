//! Spatial indexing used for pixel hit-testing

pub mod index;

pub use index::{SpatialIndex, SpatialItem};
