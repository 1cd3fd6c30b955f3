//! Configuration for selection behavior
//!
//! Defaults for fit animations, hit tolerance and the per-geometry styles
//! highlight layers fall back to when no select style is set. Loadable from
//! JSON with every field optional.

use crate::{
    layers::style::{GeometryKind, HighlightStyle, LineStyle, PointStyle, PolygonStyle},
    validate, Result,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectConfig {
    /// Duration of the fit animation used by programmatic selection
    pub fit_duration_ms: u64,
    /// Pixel padding applied on every side when fitting
    pub fit_padding: f64,
    pub fit_max_zoom: Option<f64>,
    /// Hit tolerance in pixels when a mode doesn't set one
    pub hit_tolerance: f64,
    pub highlight: HighlightDefaults,
}

impl Default for SelectConfig {
    fn default() -> Self {
        Self {
            fit_duration_ms: 500,
            fit_padding: 100.0,
            fit_max_zoom: None,
            hit_tolerance: 0.0,
            highlight: HighlightDefaults::default(),
        }
    }
}

impl SelectConfig {
    /// Parses a (possibly partial) JSON config and validates it
    pub fn from_json(input: &str) -> Result<Self> {
        let config: SelectConfig = serde_json::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validate(
            self.hit_tolerance.is_finite() && self.hit_tolerance >= 0.0,
            "hit_tolerance must be a non-negative number",
            Some(json!({ "hit_tolerance": self.hit_tolerance })),
        )?;
        validate(
            self.fit_padding.is_finite() && self.fit_padding >= 0.0,
            "fit_padding must be a non-negative number",
            Some(json!({ "fit_padding": self.fit_padding })),
        )?;
        if let Some(max_zoom) = self.fit_max_zoom {
            validate(
                max_zoom.is_finite(),
                "fit_max_zoom must be finite",
                Some(json!({ "fit_max_zoom": max_zoom })),
            )?;
        }
        Ok(())
    }

    pub fn fit_duration(&self) -> Duration {
        Duration::from_millis(self.fit_duration_ms)
    }
}

/// Styles painted for a selected feature when no select style applies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HighlightDefaults {
    pub point: PointStyle,
    pub line: LineStyle,
    pub polygon: PolygonStyle,
}

impl HighlightDefaults {
    pub fn for_kind(&self, kind: GeometryKind) -> HighlightStyle {
        match kind {
            GeometryKind::Point => HighlightStyle::Point(self.point.clone()),
            GeometryKind::Line => HighlightStyle::Line(self.line.clone()),
            GeometryKind::Polygon => HighlightStyle::Polygon(self.polygon.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::style::SerializableColor;

    #[test]
    fn test_defaults() {
        let config = SelectConfig::default();
        assert_eq!(config.fit_duration(), Duration::from_millis(500));
        assert_eq!(config.fit_padding, 100.0);
        assert_eq!(config.hit_tolerance, 0.0);
        assert!(config.validate().is_ok());

        match config.highlight.for_kind(GeometryKind::Polygon) {
            HighlightStyle::Polygon(style) => {
                assert_eq!(style.fill_color, SerializableColor::rgba(255, 0, 0, 0.2));
                assert_eq!(style.stroke_width, 2.0);
            }
            other => panic!("unexpected style {:?}", other),
        }
        match config.highlight.for_kind(GeometryKind::Point) {
            HighlightStyle::Point(style) => assert_eq!(style.radius, 7.0),
            other => panic!("unexpected style {:?}", other),
        }
    }

    #[test]
    fn test_partial_json() {
        let config = SelectConfig::from_json(r#"{ "fit_padding": 20.0, "hit_tolerance": 4 }"#)
            .unwrap();
        assert_eq!(config.fit_padding, 20.0);
        assert_eq!(config.hit_tolerance, 4.0);
        assert_eq!(config.fit_duration_ms, 500);
        assert_eq!(config.highlight, HighlightDefaults::default());
    }

    #[test]
    fn test_invalid_config() {
        let err = SelectConfig::from_json(r#"{ "hit_tolerance": -1.0 }"#).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Validation);

        let err = SelectConfig::from_json("{ not json").unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Serialization);
    }
}
