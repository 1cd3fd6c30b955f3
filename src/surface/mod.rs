//! The render surface this crate is layered on
//!
//! Everything here is an interface the external map engine implements: the
//! native event primitive (`subscribe`/`unsubscribe`), pixel hit-testing,
//! view state and fitting, vector layer access and non-interactive highlight
//! layers. [`headless::HeadlessSurface`] is an in-memory implementation.

pub mod headless;

use crate::{
    core::{
        bounds::Bounds,
        geo::{Coordinate, Pixel},
    },
    input::events::{KeyModifiers, MouseButton},
    layers::style::HighlightStyle,
    Result,
};
use geo::BoundingRect;
use geo_types::Geometry;
use serde::{Deserialize, Serialize};
use std::{sync::Arc, time::Duration};

/// An opaque geometry + attributes object owned by the render surface
pub trait Feature: Send + Sync + std::fmt::Debug {
    fn id(&self) -> Option<&str>;

    /// Attribute lookup
    fn get(&self, key: &str) -> Option<serde_json::Value>;

    fn geometry(&self) -> Option<&Geometry<f64>>;

    /// Bounding extent of the geometry, if it has one
    fn extent(&self) -> Option<Bounds> {
        self.geometry()
            .and_then(|geometry| geometry.bounding_rect())
            .map(Bounds::from)
    }
}

/// Shared handle to a feature. Identity is the allocation, not the contents.
pub type FeatureRef = Arc<dyn Feature>;

/// Stable identity key for a [`FeatureRef`]
pub(crate) type FeatureKey = usize;

pub(crate) fn feature_key(feature: &FeatureRef) -> FeatureKey {
    Arc::as_ptr(feature).cast::<()>() as usize
}

/// A named collection of features the surface renders
pub trait FeatureLayer: Send + Sync {
    fn name(&self) -> Option<&str>;

    fn features(&self) -> Vec<FeatureRef>;

    fn feature_by_id(&self, id: &str) -> Option<FeatureRef> {
        self.features()
            .into_iter()
            .find(|feature| feature.id() == Some(id))
    }
}

/// Object a native subscription is registered on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NativeTarget {
    Map,
    View,
}

/// Native event names the surface emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NativeEventName {
    Click,
    DblClick,
    PointerMove,
    MoveEnd,
    ChangeResolution,
    RenderComplete,
    Error,
}

impl NativeEventName {
    pub fn as_str(&self) -> &'static str {
        match self {
            NativeEventName::Click => "click",
            NativeEventName::DblClick => "dblclick",
            NativeEventName::PointerMove => "pointermove",
            NativeEventName::MoveEnd => "moveend",
            NativeEventName::ChangeResolution => "change:resolution",
            NativeEventName::RenderComplete => "rendercomplete",
            NativeEventName::Error => "error",
        }
    }

    /// Whether the payload carries a pointer position
    pub fn is_pointer(&self) -> bool {
        matches!(
            self,
            NativeEventName::Click | NativeEventName::DblClick | NativeEventName::PointerMove
        )
    }
}

impl std::fmt::Display for NativeEventName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw payload delivered by the surface to a native handler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NativeEvent {
    pub name: NativeEventName,
    pub pixel: Option<Pixel>,
    pub coordinate: Option<Coordinate>,
    pub button: Option<MouseButton>,
    pub modifiers: KeyModifiers,
    pub message: Option<String>,
}

impl NativeEvent {
    pub fn new(name: NativeEventName) -> Self {
        Self {
            name,
            pixel: None,
            coordinate: None,
            button: None,
            modifiers: KeyModifiers::default(),
            message: None,
        }
    }

    pub fn pointer(name: NativeEventName, pixel: Pixel, coordinate: Coordinate) -> Self {
        Self {
            pixel: Some(pixel),
            coordinate: Some(coordinate),
            button: Some(MouseButton::Left),
            ..Self::new(name)
        }
    }

    pub fn with_modifiers(mut self, modifiers: KeyModifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Callback the surface invokes for a native event
pub type NativeHandler = Arc<dyn Fn(&NativeEvent) + Send + Sync>;

/// Key returned by [`RenderSurface::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubscriptionId(pub u64);

/// Key of a highlight layer created through [`RenderSurface::add_highlight_layer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OverlayId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HitOptions {
    /// Extra hit radius in pixels
    pub tolerance: f64,
}

/// One feature found under a pixel
#[derive(Debug, Clone)]
pub struct HitResult {
    pub feature: FeatureRef,
    /// Name of the layer the feature was found in
    pub layer: Option<String>,
}

/// Snapshot of the surface's view
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub center: Option<Coordinate>,
    pub zoom: Option<f64>,
    /// Map units per pixel
    pub resolution: f64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            center: None,
            zoom: None,
            resolution: 1.0,
        }
    }
}

/// Parameters of an animated view fit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitOptions {
    pub duration: Duration,
    /// Padding in pixels applied to every side
    pub padding: f64,
    pub max_zoom: Option<f64>,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(500),
            padding: 100.0,
            max_zoom: None,
        }
    }
}

/// The external 2D map engine
pub trait RenderSurface: Send + Sync {
    /// Registers a native handler. `once` handlers are dropped by the surface
    /// after their first delivery.
    fn subscribe(
        &self,
        target: NativeTarget,
        event: NativeEventName,
        handler: NativeHandler,
        once: bool,
    ) -> Result<SubscriptionId>;

    fn unsubscribe(&self, id: SubscriptionId) -> bool;

    /// Features under `pixel`, topmost first. Highlight layers never hit.
    fn hit_test(&self, pixel: Pixel, options: &HitOptions) -> Vec<HitResult>;

    fn view(&self) -> ViewState;

    /// Starts a fit animation. Completion is not reported.
    fn fit(&self, extent: Bounds, options: &FitOptions);

    fn feature_layers(&self) -> Vec<Arc<dyn FeatureLayer>>;

    /// Creates a non-interactive layer painting `feature` with `style`
    fn add_highlight_layer(&self, feature: &FeatureRef, style: &HighlightStyle) -> OverlayId;

    fn update_highlight_layer(&self, id: OverlayId, style: &HighlightStyle);

    fn remove_highlight_layer(&self, id: OverlayId) -> bool;
}
