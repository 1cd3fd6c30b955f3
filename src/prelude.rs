//! Prelude module for common maplet-interact types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use maplet_interact::prelude::*;`

pub use crate::core::{
    bounds::Bounds,
    config::{HighlightDefaults, SelectConfig},
    error_handler::{default_reporter, ErrorHandler, ErrorReporter, NoopReporter},
    geo::{Coordinate, Pixel, Point},
};

pub use crate::input::{
    events::{KeyModifiers, MapEventData, MapEventType},
    handler::EventManager,
    registry::{ListenerId, ListenerInfo, ListenerOptions},
};

pub use crate::layers::{
    feature::{SimpleFeature, VectorLayer},
    style::{GeometryKind, HighlightStyle, LineStyle, PointStyle, PolygonStyle, SerializableColor},
};

pub use crate::select::{
    handler::{ProgrammaticSelectOptions, SelectEvent, SelectHandler, SelectMode, SelectOptions},
    highlight::SelectStyle,
    model::SelectionDiff,
};

pub use crate::surface::{
    headless::HeadlessSurface, Feature, FeatureLayer, FeatureRef, RenderSurface,
};

pub use crate::tools::{MapTools, ToolEvent, ToolEventOptions};

pub use crate::traits::Configurable;

pub use crate::{Error as MapError, ErrorKind, Result};

pub use std::{sync::Arc, time::Duration};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
