//! # maplet-interact
//!
//! Event and selection coordination for a 2D map render surface.
//!
//! The crate sits between an external render surface (anything implementing
//! [`surface::RenderSurface`]) and application code. It multiplexes the
//! surface's native events into logical subscriptions ([`EventManager`]) and
//! keeps feature selection separate from how the selection is painted
//! ([`SelectHandler`]).

pub mod core;
pub mod input;
pub mod layers;
pub mod prelude;
pub mod select;
pub mod spatial;
pub mod surface;
pub mod tools;
pub mod traits;

pub use crate::core::{
    bounds::Bounds,
    config::{HighlightDefaults, SelectConfig},
    error_handler::{default_reporter, ErrorHandler, ErrorReporter, NoopReporter},
    geo::Point,
};

pub use input::{
    events::{MapEventData, MapEventType},
    handler::EventManager,
    registry::{ListenerId, ListenerInfo, ListenerOptions},
};

pub use layers::{
    feature::{SimpleFeature, VectorLayer},
    style::{GeometryKind, HighlightStyle},
};

pub use select::{
    handler::{ProgrammaticSelectOptions, SelectEvent, SelectHandler, SelectMode, SelectOptions},
    highlight::SelectStyle,
    model::{SelectionDiff, SelectionModel},
};

pub use surface::{headless::HeadlessSurface, Feature, FeatureLayer, FeatureRef, RenderSurface};

pub use tools::{MapTools, ToolEvent, ToolEventOptions, ToolEventType};

pub use traits::Configurable;

use serde::Serialize;
use serde_json::Value;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Machine-readable classification of a [`MapError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    Validation,
    Component,
    Map,
    Serialization,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Validation => write!(f, "VALIDATION_ERROR"),
            ErrorKind::Component => write!(f, "COMPONENT_ERROR"),
            ErrorKind::Map => write!(f, "MAP_ERROR"),
            ErrorKind::Serialization => write!(f, "SERIALIZATION_ERROR"),
        }
    }
}

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    /// A caller passed a bad argument
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        context: Option<Value>,
    },

    /// Failure inside this crate's own logic or in caller-supplied code it ran
    #[error("Component error: {message}")]
    Component {
        message: String,
        context: Option<Value>,
    },

    /// The render surface rejected an operation
    #[error("Map error: {message}")]
    Map {
        message: String,
        context: Option<Value>,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl MapError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            context: None,
        }
    }

    pub fn component(message: impl Into<String>) -> Self {
        Self::Component {
            message: message.into(),
            context: None,
        }
    }

    pub fn map(message: impl Into<String>) -> Self {
        Self::Map {
            message: message.into(),
            context: None,
        }
    }

    /// Attaches diagnostic context (the inputs at the time of failure).
    pub fn with_context(mut self, value: Value) -> Self {
        match &mut self {
            Self::Validation { context, .. }
            | Self::Component { context, .. }
            | Self::Map { context, .. } => *context = Some(value),
            Self::Serialization(_) => {}
        }
        self
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Component { .. } => ErrorKind::Component,
            Self::Map { .. } => ErrorKind::Map,
            Self::Serialization(_) => ErrorKind::Serialization,
        }
    }

    /// Human readable message without the kind prefix
    pub fn message(&self) -> String {
        match self {
            Self::Validation { message, .. }
            | Self::Component { message, .. }
            | Self::Map { message, .. } => message.clone(),
            Self::Serialization(e) => e.to_string(),
        }
    }

    pub fn context(&self) -> Option<&Value> {
        match self {
            Self::Validation { context, .. }
            | Self::Component { context, .. }
            | Self::Map { context, .. } => context.as_ref(),
            Self::Serialization(_) => None,
        }
    }
}

/// Error type alias for convenience
pub type Error = MapError;

/// Fails with a [`MapError::Validation`] when `condition` does not hold.
pub fn validate(condition: bool, message: &str, context: Option<Value>) -> Result<()> {
    if condition {
        return Ok(());
    }
    let error = MapError::validation(message);
    Err(match context {
        Some(context) => error.with_context(context),
        None => error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_kind_and_context() {
        let err = MapError::component("listener failed").with_context(json!({ "id": "click_1" }));
        assert_eq!(err.kind(), ErrorKind::Component);
        assert_eq!(err.message(), "listener failed");
        assert_eq!(err.context(), Some(&json!({ "id": "click_1" })));
        assert_eq!(err.to_string(), "Component error: listener failed");
    }

    #[test]
    fn test_validate() {
        assert!(validate(true, "unused", None).is_ok());

        let err = validate(false, "Valid layer name is required", Some(json!({ "layer": "" })))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.context(), Some(&json!({ "layer": "" })));
    }

    #[test]
    fn test_error_kind_display() {
        assert_eq!(ErrorKind::Validation.to_string(), "VALIDATION_ERROR");
        assert_eq!(ErrorKind::Map.to_string(), "MAP_ERROR");
    }
}
