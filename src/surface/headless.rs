//! In-memory render surface
//!
//! Keeps vector layers in an R-tree for bounding-box hit testing, delivers
//! simulated native events to subscribed handlers and records highlight
//! layers and fit requests so callers can inspect what would be drawn.

use crate::{
    core::{
        bounds::Bounds,
        geo::{Coordinate, Pixel, Point},
    },
    input::events::KeyModifiers,
    layers::style::HighlightStyle,
    spatial::index::{SpatialIndex, SpatialItem},
    surface::{
        feature_key, FeatureLayer, FeatureRef, FitOptions, HitOptions, HitResult, NativeEvent,
        NativeEventName, NativeHandler, NativeTarget, OverlayId, RenderSurface, SubscriptionId,
        ViewState,
    },
    MapError, Result,
};
use serde_json::json;
use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

struct Subscription {
    target: NativeTarget,
    event: NativeEventName,
    handler: NativeHandler,
    once: bool,
}

/// Payload stored per indexed feature
#[derive(Clone)]
struct IndexedFeature {
    /// Draw order across all layers, higher is on top
    z_order: usize,
    layer: Option<String>,
    feature: FeatureRef,
}

struct Highlight {
    feature: FeatureRef,
    style: HighlightStyle,
}

/// A fit request as received by the surface
#[derive(Debug, Clone, PartialEq)]
pub struct FitRequest {
    pub extent: Bounds,
    pub options: FitOptions,
}

struct SurfaceState {
    subscriptions: BTreeMap<SubscriptionId, Subscription>,
    next_subscription: u64,
    layers: Vec<Arc<dyn FeatureLayer>>,
    index: SpatialIndex<IndexedFeature>,
    /// Draw order of the last indexed feature
    top_z: usize,
    view: ViewState,
    highlights: BTreeMap<OverlayId, Highlight>,
    next_overlay: u64,
    fit_requests: Vec<FitRequest>,
    hit_tests: usize,
    target_attached: bool,
}

impl Default for SurfaceState {
    fn default() -> Self {
        Self {
            subscriptions: BTreeMap::new(),
            next_subscription: 0,
            layers: Vec::new(),
            index: SpatialIndex::new(),
            top_z: 0,
            view: ViewState {
                center: Some(Point::new(0.0, 0.0)),
                zoom: Some(0.0),
                resolution: 1.0,
            },
            highlights: BTreeMap::new(),
            next_overlay: 0,
            fit_requests: Vec::new(),
            hit_tests: 0,
            target_attached: true,
        }
    }
}

impl SurfaceState {
    /// Indexes the features of a layer stacked above everything so far
    fn index_layer(&mut self, layer: &Arc<dyn FeatureLayer>) {
        let layer_index = self.layers.len();
        let name = layer.name().map(str::to_owned);
        for (feature_index, feature) in layer.features().into_iter().enumerate() {
            self.top_z += 1;
            let Some(extent) = feature.extent() else {
                continue;
            };
            self.index.insert(SpatialItem::new(
                format!("{}:{}", layer_index, feature_index),
                extent,
                IndexedFeature {
                    z_order: self.top_z,
                    layer: name.clone(),
                    feature,
                },
            ));
        }
    }
}

/// Render surface that draws nothing
///
/// Map coordinates are pixels scaled by the view resolution.
#[derive(Default)]
pub struct HeadlessSurface {
    state: Mutex<SurfaceState>,
}

impl std::fmt::Debug for HeadlessSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("HeadlessSurface")
            .field("subscriptions", &state.subscriptions.len())
            .field("layers", &state.layers.len())
            .field("highlights", &state.highlights.len())
            .field("view", &state.view)
            .finish()
    }
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layer(self, layer: impl FeatureLayer + 'static) -> Self {
        self.add_layer(Arc::new(layer));
        self
    }

    /// Adds a layer on top of the existing ones
    pub fn add_layer(&self, layer: Arc<dyn FeatureLayer>) {
        let mut state = self.state();
        state.index_layer(&layer);
        state.layers.push(layer);
    }

    fn state(&self) -> MutexGuard<'_, SurfaceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn pixel_to_coordinate(&self, pixel: Pixel) -> Coordinate {
        pixel.multiply(self.state().view.resolution)
    }

    /// Detaching the target makes further `subscribe` calls fail
    pub fn set_target_attached(&self, attached: bool) {
        self.state().target_attached = attached;
    }

    /// Delivers `event` to every handler subscribed on `target`
    pub fn fire(&self, target: NativeTarget, event: &NativeEvent) -> usize {
        let handlers: Vec<NativeHandler> = {
            let mut state = self.state();
            let matching: Vec<SubscriptionId> = state
                .subscriptions
                .iter()
                .filter(|(_, sub)| sub.target == target && sub.event == event.name)
                .map(|(id, _)| *id)
                .collect();

            let mut handlers = Vec::with_capacity(matching.len());
            for id in matching {
                let once = state.subscriptions.get(&id).map_or(false, |sub| sub.once);
                let handler = if once {
                    state.subscriptions.remove(&id).map(|sub| sub.handler)
                } else {
                    state.subscriptions.get(&id).map(|sub| sub.handler.clone())
                };
                handlers.extend(handler);
            }
            handlers
        };

        log::trace!("delivering '{}' to {} handler(s)", event.name, handlers.len());
        for handler in &handlers {
            handler(event);
        }
        handlers.len()
    }

    fn pointer(&self, name: NativeEventName, pixel: Pixel, modifiers: KeyModifiers) -> usize {
        let coordinate = self.pixel_to_coordinate(pixel);
        let event = NativeEvent::pointer(name, pixel, coordinate).with_modifiers(modifiers);
        self.fire(NativeTarget::Map, &event)
    }

    pub fn click(&self, pixel: Pixel) -> usize {
        self.pointer(NativeEventName::Click, pixel, KeyModifiers::default())
    }

    /// Click with Ctrl held
    pub fn ctrl_click(&self, pixel: Pixel) -> usize {
        self.pointer(NativeEventName::Click, pixel, KeyModifiers::ctrl())
    }

    pub fn click_with(&self, pixel: Pixel, modifiers: KeyModifiers) -> usize {
        self.pointer(NativeEventName::Click, pixel, modifiers)
    }

    pub fn dblclick(&self, pixel: Pixel) -> usize {
        self.pointer(NativeEventName::DblClick, pixel, KeyModifiers::default())
    }

    pub fn pointer_move(&self, pixel: Pixel) -> usize {
        self.pointer(NativeEventName::PointerMove, pixel, KeyModifiers::default())
    }

    /// Moves the view. Fires `change:resolution` on the view when the
    /// resolution changes, then `moveend` on the map.
    pub fn set_view(&self, center: Coordinate, zoom: f64, resolution: f64) {
        let resolution_changed = {
            let mut state = self.state();
            let changed = state.view.resolution != resolution;
            state.view = ViewState {
                center: Some(center),
                zoom: Some(zoom),
                resolution,
            };
            changed
        };

        if resolution_changed {
            self.fire(
                NativeTarget::View,
                &NativeEvent::new(NativeEventName::ChangeResolution),
            );
        }
        self.fire(NativeTarget::Map, &NativeEvent::new(NativeEventName::MoveEnd));
    }

    pub fn render_complete(&self) -> usize {
        self.fire(
            NativeTarget::Map,
            &NativeEvent::new(NativeEventName::RenderComplete),
        )
    }

    pub fn emit_error(&self, message: &str) -> usize {
        self.fire(
            NativeTarget::Map,
            &NativeEvent::new(NativeEventName::Error).with_message(message),
        )
    }

    /// Live native subscriptions for `event` on any target
    pub fn subscription_count(&self, event: NativeEventName) -> usize {
        self.state()
            .subscriptions
            .values()
            .filter(|sub| sub.event == event)
            .count()
    }

    pub fn total_subscriptions(&self) -> usize {
        self.state().subscriptions.len()
    }

    pub fn highlight_count(&self) -> usize {
        self.state().highlights.len()
    }

    /// Style of the highlight layer painting `feature`, if any
    pub fn highlight_style_of(&self, feature: &FeatureRef) -> Option<HighlightStyle> {
        let key = feature_key(feature);
        self.state()
            .highlights
            .values()
            .find(|highlight| feature_key(&highlight.feature) == key)
            .map(|highlight| highlight.style.clone())
    }

    /// Features currently painted by highlight layers, in creation order
    pub fn highlighted_features(&self) -> Vec<FeatureRef> {
        self.state()
            .highlights
            .values()
            .map(|highlight| highlight.feature.clone())
            .collect()
    }

    pub fn fit_requests(&self) -> Vec<FitRequest> {
        self.state().fit_requests.clone()
    }

    /// Number of `hit_test` calls served so far
    pub fn hit_test_count(&self) -> usize {
        self.state().hit_tests
    }
}

impl RenderSurface for HeadlessSurface {
    fn subscribe(
        &self,
        target: NativeTarget,
        event: NativeEventName,
        handler: NativeHandler,
        once: bool,
    ) -> Result<SubscriptionId> {
        let mut state = self.state();
        if !state.target_attached {
            return Err(MapError::map("Map is missing a target element")
                .with_context(json!({ "event": event.as_str() })));
        }

        state.next_subscription += 1;
        let id = SubscriptionId(state.next_subscription);
        state.subscriptions.insert(
            id,
            Subscription {
                target,
                event,
                handler,
                once,
            },
        );
        Ok(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.state().subscriptions.remove(&id).is_some()
    }

    fn hit_test(&self, pixel: Pixel, options: &HitOptions) -> Vec<HitResult> {
        let mut state = self.state();
        state.hit_tests += 1;
        let resolution = state.view.resolution;
        let coordinate = pixel.multiply(resolution);

        let mut hits: Vec<&IndexedFeature> = state
            .index
            .query_point(coordinate, options.tolerance * resolution)
            .into_iter()
            .map(|item| &item.data)
            .collect();
        hits.sort_by(|a, b| b.z_order.cmp(&a.z_order));

        hits.into_iter()
            .map(|hit| HitResult {
                feature: hit.feature.clone(),
                layer: hit.layer.clone(),
            })
            .collect()
    }

    fn view(&self) -> ViewState {
        self.state().view
    }

    fn fit(&self, extent: Bounds, options: &FitOptions) {
        log::debug!("fit to {:?} over {:?}", extent, options.duration);
        let mut state = self.state();
        state.view.center = Some(extent.center());
        state.fit_requests.push(FitRequest {
            extent,
            options: options.clone(),
        });
    }

    fn feature_layers(&self) -> Vec<Arc<dyn FeatureLayer>> {
        self.state().layers.clone()
    }

    fn add_highlight_layer(&self, feature: &FeatureRef, style: &HighlightStyle) -> OverlayId {
        let mut state = self.state();
        state.next_overlay += 1;
        let id = OverlayId(state.next_overlay);
        state.highlights.insert(
            id,
            Highlight {
                feature: feature.clone(),
                style: style.clone(),
            },
        );
        id
    }

    fn update_highlight_layer(&self, id: OverlayId, style: &HighlightStyle) {
        if let Some(highlight) = self.state().highlights.get_mut(&id) {
            highlight.style = style.clone();
        }
    }

    fn remove_highlight_layer(&self, id: OverlayId) -> bool {
        self.state().highlights.remove(&id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::feature::{SimpleFeature, VectorLayer};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn surface() -> HeadlessSurface {
        HeadlessSurface::new()
            .with_layer(
                VectorLayer::new("bottom")
                    .with_feature(SimpleFeature::point("low", 10.0, 10.0)),
            )
            .with_layer(
                VectorLayer::new("top")
                    .with_feature(SimpleFeature::point("high", 10.0, 10.0))
                    .with_feature(SimpleFeature::point("far", 50.0, 50.0)),
            )
    }

    #[test]
    fn test_hit_test_topmost_first() {
        let surface = surface();
        let hits = surface.hit_test(Point::new(10.0, 10.0), &HitOptions::default());
        let ids: Vec<_> = hits.iter().map(|hit| hit.feature.id()).collect();
        assert_eq!(ids, vec![Some("high"), Some("low")]);
        assert_eq!(hits[0].layer.as_deref(), Some("top"));

        assert!(surface
            .hit_test(Point::new(12.0, 12.0), &HitOptions::default())
            .is_empty());
        assert_eq!(
            surface
                .hit_test(Point::new(12.0, 12.0), &HitOptions { tolerance: 2.0 })
                .len(),
            2
        );
    }

    #[test]
    fn test_layer_added_later_is_hit_first() {
        let surface = surface();
        surface.add_layer(Arc::new(
            VectorLayer::new("overlay").with_feature(SimpleFeature::point("newest", 10.0, 10.0)),
        ));

        let hits = surface.hit_test(Point::new(10.0, 10.0), &HitOptions::default());
        let ids: Vec<_> = hits.iter().map(|hit| hit.feature.id()).collect();
        assert_eq!(ids, vec![Some("newest"), Some("high"), Some("low")]);
        assert_eq!(surface.hit_test_count(), 1);
    }

    #[test]
    fn test_hit_test_scales_with_resolution() {
        let surface = surface();
        surface.set_view(Point::new(0.0, 0.0), 1.0, 2.0);
        let hits = surface.hit_test(Point::new(5.0, 5.0), &HitOptions::default());
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_once_subscription_is_dropped_after_delivery() {
        let surface = HeadlessSurface::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        surface
            .subscribe(
                NativeTarget::Map,
                NativeEventName::RenderComplete,
                Arc::new(move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                }),
                true,
            )
            .unwrap();

        assert_eq!(surface.render_complete(), 1);
        assert_eq!(surface.render_complete(), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(surface.total_subscriptions(), 0);
    }

    #[test]
    fn test_detached_target_rejects_subscriptions() {
        let surface = HeadlessSurface::new();
        surface.set_target_attached(false);
        let err = surface
            .subscribe(NativeTarget::Map, NativeEventName::Click, Arc::new(|_| {}), false)
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Map);
    }

    #[test]
    fn test_highlights_are_not_hit() {
        let surface = HeadlessSurface::new();
        let feature = SimpleFeature::point("h", 1.0, 1.0).into_ref();
        let id = surface.add_highlight_layer(&feature, &HighlightStyle::Point(Default::default()));

        assert!(surface.hit_test(Point::new(1.0, 1.0), &HitOptions::default()).is_empty());
        assert_eq!(surface.highlight_count(), 1);
        assert!(surface.highlight_style_of(&feature).is_some());
        assert!(surface.remove_highlight_layer(id));
        assert!(!surface.remove_highlight_layer(id));
    }

    #[test]
    fn test_set_view_fires_resolution_only_on_change() {
        let surface = HeadlessSurface::new();
        let zooms = Arc::new(AtomicUsize::new(0));
        let counter = zooms.clone();
        surface
            .subscribe(
                NativeTarget::View,
                NativeEventName::ChangeResolution,
                Arc::new(move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                }),
                false,
            )
            .unwrap();

        surface.set_view(Point::new(1.0, 1.0), 0.0, 1.0);
        assert_eq!(zooms.load(Ordering::SeqCst), 0);
        surface.set_view(Point::new(1.0, 1.0), 1.0, 0.5);
        assert_eq!(zooms.load(Ordering::SeqCst), 1);
    }
}
