use crate::{
    core::{
        bounds::Bounds,
        config::SelectConfig,
        error_handler::{default_reporter, ErrorReporter},
    },
    input::{
        events::{MapEventData, MapEventType},
        handler::EventManager,
        registry::{ListenerId, ListenerOptions},
    },
    layers::style::HighlightStyle,
    select::{
        highlight::{HighlightRenderer, SelectStyle, StyleContext},
        model::{SelectionDiff, SelectionModel},
    },
    surface::{Feature, FeatureLayer, FeatureRef, FitOptions, HitOptions, HitResult, RenderSurface},
    traits::Configurable,
    MapError, Result,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
    time::Duration,
};

/// Interactive selection trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectMode {
    Click,
    Hover,
    /// Click with Ctrl (Cmd on macOS) and no other modifier
    Ctrl,
}

impl SelectMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectMode::Click => "click",
            SelectMode::Hover => "hover",
            SelectMode::Ctrl => "ctrl",
        }
    }

    /// Logical event the mode listens to
    pub fn event_type(&self) -> MapEventType {
        match self {
            SelectMode::Click | SelectMode::Ctrl => MapEventType::Click,
            SelectMode::Hover => MapEventType::Hover,
        }
    }

    fn accepts(&self, event: &MapEventData) -> bool {
        match self {
            SelectMode::Ctrl => event.modifiers.platform_modifier_only(),
            SelectMode::Click | SelectMode::Hover => true,
        }
    }
}

impl std::fmt::Display for SelectMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SelectMode {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "click" => Ok(SelectMode::Click),
            "hover" => Ok(SelectMode::Hover),
            "ctrl" => Ok(SelectMode::Ctrl),
            "" => Err(MapError::validation("Select mode is required")),
            other => Err(MapError::validation(format!("Unknown select mode '{}'", other))
                .with_context(json!({ "mode": other }))),
        }
    }
}

/// Predicate over a hit candidate; an `Err` rejects the candidate
pub type FeatureFilter = Arc<dyn Fn(&dyn Feature) -> Result<bool> + Send + Sync>;

/// Callback receiving an interactive selection change
pub type SelectCallback = Arc<dyn Fn(&SelectEvent) -> Result<()> + Send + Sync>;

/// Payload of `on_select` / `on_deselect`
#[derive(Debug, Clone)]
pub struct SelectEvent {
    pub selected: Vec<FeatureRef>,
    pub deselected: Vec<FeatureRef>,
    pub map_event: Option<MapEventData>,
}

/// Options for [`SelectHandler::enable_select`]
#[derive(Clone, Default)]
pub struct SelectOptions {
    /// Append hits to the selection instead of replacing it
    pub multi: bool,
    /// Only features of these layers are candidates
    pub layer_filter: Option<Vec<String>>,
    pub feature_filter: Option<FeatureFilter>,
    /// Hit radius in pixels; the config default when unset
    pub hit_tolerance: Option<f64>,
    pub select_style: Option<SelectStyle>,
    pub on_select: Option<SelectCallback>,
    pub on_deselect: Option<SelectCallback>,
}

impl std::fmt::Debug for SelectOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectOptions")
            .field("multi", &self.multi)
            .field("layer_filter", &self.layer_filter)
            .field("feature_filter", &self.feature_filter.is_some())
            .field("hit_tolerance", &self.hit_tolerance)
            .field("select_style", &self.select_style)
            .field("on_select", &self.on_select.is_some())
            .field("on_deselect", &self.on_deselect.is_some())
            .finish()
    }
}

impl SelectOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn multi(mut self, multi: bool) -> Self {
        self.multi = multi;
        self
    }

    pub fn layers<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.layer_filter = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn feature_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&dyn Feature) -> Result<bool> + Send + Sync + 'static,
    {
        self.feature_filter = Some(Arc::new(filter));
        self
    }

    pub fn hit_tolerance(mut self, tolerance: f64) -> Self {
        self.hit_tolerance = Some(tolerance);
        self
    }

    pub fn select_style(mut self, style: impl Into<SelectStyle>) -> Self {
        self.select_style = Some(style.into());
        self
    }

    pub fn on_select<F>(mut self, callback: F) -> Self
    where
        F: Fn(&SelectEvent) -> Result<()> + Send + Sync + 'static,
    {
        self.on_select = Some(Arc::new(callback));
        self
    }

    pub fn on_deselect<F>(mut self, callback: F) -> Self
    where
        F: Fn(&SelectEvent) -> Result<()> + Send + Sync + 'static,
    {
        self.on_deselect = Some(Arc::new(callback));
        self
    }

    fn admits_layer(&self, hit: &HitResult) -> bool {
        match &self.layer_filter {
            None => true,
            Some(names) => hit
                .layer
                .as_deref()
                .map_or(false, |layer| names.iter().any(|name| name == layer)),
        }
    }
}

/// Options for [`SelectHandler::select_by_ids`] and
/// [`SelectHandler::select_by_property`]
#[derive(Debug, Clone, Default)]
pub struct ProgrammaticSelectOptions {
    /// Restrict the scan to the layer with this name
    pub layer_name: Option<String>,
    /// Style for the matched features, overriding the handler style
    pub select_style: Option<SelectStyle>,
    /// Fit the view to the matched features
    pub fit_view: bool,
    pub fit_duration: Option<Duration>,
    pub fit_padding: Option<f64>,
    pub max_zoom: Option<f64>,
}

impl ProgrammaticSelectOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layer(mut self, name: impl Into<String>) -> Self {
        self.layer_name = Some(name.into());
        self
    }

    pub fn select_style(mut self, style: impl Into<SelectStyle>) -> Self {
        self.select_style = Some(style.into());
        self
    }

    pub fn fit_view(mut self, fit: bool) -> Self {
        self.fit_view = fit;
        self
    }

    pub fn fit_duration(mut self, duration: Duration) -> Self {
        self.fit_duration = Some(duration);
        self
    }

    pub fn fit_padding(mut self, padding: f64) -> Self {
        self.fit_padding = Some(padding);
        self
    }

    pub fn max_zoom(mut self, zoom: f64) -> Self {
        self.max_zoom = Some(zoom);
        self
    }
}

/// Property equality where numbers compare by value, so `2` matches `2.0`
fn property_matches(stored: &Value, wanted: &Value) -> bool {
    match (stored, wanted) {
        (Value::Number(a), Value::Number(b)) => a == b || a.as_f64() == b.as_f64(),
        _ => stored == wanted,
    }
}

struct SelectState {
    model: SelectionModel,
    highlights: HighlightRenderer,
    mode: Option<SelectMode>,
    /// Options of the active interactive mode
    options: Option<SelectOptions>,
    listener: Option<ListenerId>,
    /// Restyles highlights on resolution changes while a style function
    /// paints any of them
    zoom_listener: Option<ListenerId>,
    /// Handler-level highlight style
    style: Option<SelectStyle>,
    config: SelectConfig,
    destroyed: bool,
}

struct SelectShared {
    surface: Arc<dyn RenderSurface>,
    reporter: Arc<dyn ErrorReporter>,
    events: EventManager,
    state: Mutex<SelectState>,
}

impl SelectShared {
    fn state(&self) -> MutexGuard<'_, SelectState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn style_context<'a>(
        &'a self,
        style: Option<&'a SelectStyle>,
        config: &'a SelectConfig,
    ) -> StyleContext<'a> {
        StyleContext {
            style,
            resolution: self.surface.view().resolution,
            defaults: &config.highlight,
            reporter: self.reporter.as_ref(),
        }
    }

    /// Applies `change` to the model and reconciles highlights in one step
    fn apply<F>(&self, change: F) -> SelectionDiff
    where
        F: FnOnce(&mut SelectionModel) -> SelectionDiff,
    {
        let mut guard = self.state();
        let state = &mut *guard;
        let diff = change(&mut state.model);
        if !diff.is_empty() {
            let ctx = self.style_context(state.style.as_ref(), &state.config);
            state.highlights.reconcile(self.surface.as_ref(), &diff, &ctx);
        }
        diff
    }

    fn destroyed_error(operation: &str) -> MapError {
        MapError::component("SelectHandler has been destroyed")
            .with_context(json!({ "operation": operation }))
    }

    fn passes_filter(&self, options: &SelectOptions, feature: &FeatureRef) -> bool {
        let Some(filter) = &options.feature_filter else {
            return true;
        };
        match filter(feature.as_ref()) {
            Ok(accepted) => accepted,
            Err(error) => {
                self.reporter.report(
                    &MapError::component(format!("Error in feature filter: {}", error))
                        .with_context(json!({ "featureId": feature.id() })),
                );
                false
            }
        }
    }

    /// Selects from the features under the event pixel. The normalized event
    /// already carries a zero-tolerance hit test; a wider hit radius needs a
    /// second query against the surface.
    fn handle_hit(self: &Arc<Self>, event: &MapEventData) {
        let (mode, options, tolerance) = {
            let state = self.state();
            let (Some(mode), Some(options)) = (state.mode, state.options.clone()) else {
                return;
            };
            let tolerance = options.hit_tolerance.unwrap_or(state.config.hit_tolerance);
            (mode, options, tolerance)
        };

        if !mode.accepts(event) {
            return;
        }
        let Some(pixel) = event.pixel else {
            return;
        };

        let hits = if tolerance > 0.0 {
            self.surface.hit_test(pixel, &HitOptions { tolerance })
        } else {
            event.hits.clone()
        };
        let candidate = hits
            .into_iter()
            .filter(|hit| options.admits_layer(hit))
            .map(|hit| hit.feature)
            .find(|feature| self.passes_filter(&options, feature));

        let diff = self.apply(|model| match candidate {
            Some(feature) if options.multi => model.add(feature),
            Some(feature) => model.replace_with(vec![feature]),
            None if options.multi => SelectionDiff::default(),
            None => model.clear(),
        });

        if !diff.is_empty() {
            self.sync_zoom_listener();
            self.notify(&options, diff, event);
        }
    }

    /// Keeps the zoom listener registered exactly while some highlight is
    /// painted by a style function
    fn sync_zoom_listener(self: &Arc<Self>) {
        let (wanted, registered) = {
            let state = self.state();
            let wanted = !state.destroyed
                && state.highlights.depends_on_resolution(state.style.as_ref());
            (wanted, state.zoom_listener.is_some())
        };

        if wanted && !registered {
            let weak = Arc::downgrade(self);
            let listener = self.events.on(
                MapEventType::ZoomEnd,
                move |_| {
                    if let Some(shared) = weak.upgrade() {
                        shared.restyle_for_view();
                    }
                    Ok(())
                },
                ListenerOptions::default(),
            );
            match listener {
                Ok(id) => self.state().zoom_listener = Some(id),
                Err(error) => self.reporter.report(
                    &MapError::component(format!("Failed to track view resolution: {}", error)),
                ),
            }
        } else if !wanted && registered {
            let listener = self.state().zoom_listener.take();
            if let Some(id) = listener {
                self.events.off(id);
            }
        }
    }

    fn restyle_for_view(&self) {
        let mut guard = self.state();
        let state = &mut *guard;
        let ctx = self.style_context(state.style.as_ref(), &state.config);
        state.highlights.restyle_all(self.surface.as_ref(), &ctx, false);
    }

    /// Runs selection callbacks. The diff is fully applied at this point.
    fn notify(&self, options: &SelectOptions, diff: SelectionDiff, event: &MapEventData) {
        let select_event = SelectEvent {
            selected: diff.added,
            deselected: diff.removed,
            map_event: Some(event.clone()),
        };

        let callbacks = [
            (!select_event.selected.is_empty(), &options.on_select, "onSelect"),
            (!select_event.deselected.is_empty(), &options.on_deselect, "onDeselect"),
        ];
        for (fire, callback, name) in callbacks {
            let Some(callback) = callback.as_ref().filter(|_| fire) else {
                continue;
            };
            if let Err(error) = callback(&select_event) {
                self.reporter.report(
                    &MapError::component(format!("Error in select callback: {}", error))
                        .with_context(json!({ "callback": name })),
                );
            }
        }
    }

    fn select_programmatic(
        self: &Arc<Self>,
        matches: Vec<FeatureRef>,
        options: &ProgrammaticSelectOptions,
        operation: &str,
    ) -> Result<SelectionDiff> {
        let (diff, config) = {
            let mut guard = self.state();
            let state = &mut *guard;
            if state.destroyed {
                return Err(Self::destroyed_error(operation));
            }

            let diff = state.model.replace_with(matches.clone());
            let ctx = self.style_context(state.style.as_ref(), &state.config);
            state.highlights.reconcile(self.surface.as_ref(), &diff, &ctx);
            state.highlights.set_override(
                self.surface.as_ref(),
                &matches,
                options.select_style.as_ref(),
                &ctx,
            );
            (diff, state.config.clone())
        };
        self.sync_zoom_listener();

        if options.fit_view && !matches.is_empty() {
            self.fit_to(&matches, options, &config);
        }
        Ok(diff)
    }

    fn fit_to(&self, features: &[FeatureRef], options: &ProgrammaticSelectOptions, config: &SelectConfig) {
        let extents = features.iter().filter_map(|feature| {
            let extent = feature.extent();
            if extent.is_none() {
                self.reporter.report(
                    &MapError::component("Feature has no geometry extent")
                        .with_context(json!({ "featureId": feature.id() })),
                );
            }
            extent
        });

        let Some(extent) = Bounds::union_all(extents) else {
            return;
        };
        let fit = FitOptions {
            duration: options.fit_duration.unwrap_or_else(|| config.fit_duration()),
            padding: options.fit_padding.unwrap_or(config.fit_padding),
            max_zoom: options.max_zoom.or(config.fit_max_zoom),
        };
        log::debug!("fitting view to {} selected feature(s)", features.len());
        self.surface.fit(extent, &fit);
    }

    /// Candidate layers for programmatic selection
    fn scan<P>(&self, layer_name: Option<&str>, mut matches: P) -> Vec<FeatureRef>
    where
        P: FnMut(&dyn FeatureLayer) -> Vec<FeatureRef>,
    {
        self.surface
            .feature_layers()
            .iter()
            .filter(|layer| layer_name.map_or(true, |name| layer.name() == Some(name)))
            .flat_map(|layer| matches(layer.as_ref()))
            .collect()
    }
}

impl Drop for SelectShared {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        state.highlights.release_all(self.surface.as_ref());
    }
}

/// Feature selection with highlight rendering kept separate from hit-testing.
///
/// Starts disabled. Interactive selection is driven by one listener on an
/// internal [`EventManager`]; programmatic selection works regardless of the
/// interactive state. Every membership change is a [`SelectionDiff`] that is
/// reconciled into highlight layers before any callback runs.
///
/// Cloning yields another handle to the same handler.
#[derive(Clone)]
pub struct SelectHandler {
    shared: Arc<SelectShared>,
}

impl std::fmt::Debug for SelectHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.state();
        f.debug_struct("SelectHandler")
            .field("mode", &state.mode)
            .field("selected", &state.model.len())
            .field("highlights", &state.highlights.len())
            .field("destroyed", &state.destroyed)
            .finish()
    }
}

impl SelectHandler {
    pub fn new(surface: Arc<dyn RenderSurface>, reporter: Arc<dyn ErrorReporter>) -> Self {
        let events = EventManager::new(surface.clone(), reporter.clone());
        Self {
            shared: Arc::new(SelectShared {
                surface,
                reporter,
                events,
                state: Mutex::new(SelectState {
                    model: SelectionModel::new(),
                    highlights: HighlightRenderer::new(),
                    mode: None,
                    options: None,
                    listener: None,
                    zoom_listener: None,
                    style: None,
                    config: SelectConfig::default(),
                    destroyed: false,
                }),
            }),
        }
    }

    /// Handler reporting to the default [`crate::ErrorHandler`]
    pub fn with_default_reporter(surface: Arc<dyn RenderSurface>) -> Self {
        Self::new(surface, default_reporter())
    }

    pub fn with_config(
        surface: Arc<dyn RenderSurface>,
        reporter: Arc<dyn ErrorReporter>,
        config: SelectConfig,
    ) -> Result<Self> {
        let handler = Self::new(surface, reporter);
        handler.set_config(config)?;
        Ok(handler)
    }

    /// Enables interactive selection, replacing any active mode.
    ///
    /// The selection survives a mode switch. On failure the previous mode
    /// stays active.
    pub fn enable_select(&self, mode: SelectMode, options: SelectOptions) -> Result<&Self> {
        if let Some(tolerance) = options.hit_tolerance {
            crate::validate(
                tolerance.is_finite() && tolerance >= 0.0,
                "hit_tolerance must be a non-negative number",
                Some(json!({ "hit_tolerance": tolerance })),
            )?;
        }
        if self.shared.state().destroyed {
            return Err(SelectShared::destroyed_error("enableSelect"));
        }

        let weak: Weak<SelectShared> = Arc::downgrade(&self.shared);
        let listener = self.shared.events.on(
            mode.event_type(),
            move |event| {
                if let Some(shared) = weak.upgrade() {
                    shared.handle_hit(event);
                }
                Ok(())
            },
            ListenerOptions::default(),
        )?;

        let previous = {
            let mut guard = self.shared.state();
            let state = &mut *guard;
            let previous = state.listener.replace(listener);
            state.mode = Some(mode);
            if let Some(style) = &options.select_style {
                state.style = Some(style.clone());
                let ctx = self.shared.style_context(state.style.as_ref(), &state.config);
                state.highlights.restyle_all(self.shared.surface.as_ref(), &ctx, false);
            }
            state.options = Some(options);
            previous
        };

        if let Some(previous) = previous {
            self.shared.events.off(previous);
        }
        self.shared.sync_zoom_listener();
        log::debug!("select enabled in '{}' mode", mode);
        Ok(self)
    }

    /// Stops interactive selection. Selected features stay selected.
    pub fn disable_select(&self) -> &Self {
        let previous = {
            let mut state = self.shared.state();
            state.mode = None;
            state.options = None;
            state.listener.take()
        };
        if let Some(previous) = previous {
            self.shared.events.off(previous);
            log::debug!("select disabled");
        }
        self
    }

    pub fn get_selected_features(&self) -> Vec<FeatureRef> {
        self.shared.state().model.features()
    }

    /// Drops the selection and its highlight layers
    pub fn clear_selection(&self) -> SelectionDiff {
        let diff = self.shared.apply(SelectionModel::clear);
        self.shared.sync_zoom_listener();
        diff
    }

    /// Selects every feature whose id is in `ids`, replacing the selection.
    ///
    /// An empty id list is tolerated and changes nothing. Ids that match no
    /// feature are skipped.
    pub fn select_by_ids<S: AsRef<str>>(
        &self,
        ids: &[S],
        options: &ProgrammaticSelectOptions,
    ) -> Result<SelectionDiff> {
        if self.shared.state().destroyed {
            return Err(SelectShared::destroyed_error("selectByIds"));
        }
        if ids.is_empty() {
            log::warn!("select_by_ids called with no ids");
            return Ok(SelectionDiff::default());
        }
        if let Some(index) = ids.iter().position(|id| id.as_ref().is_empty()) {
            return Err(MapError::validation("Feature id must not be empty")
                .with_context(json!({ "index": index })));
        }

        let matches = self.shared.scan(options.layer_name.as_deref(), |layer| {
            ids.iter()
                .filter_map(|id| layer.feature_by_id(id.as_ref()))
                .collect()
        });
        self.shared.select_programmatic(matches, options, "selectByIds")
    }

    /// Selects every feature whose `key` attribute equals `value`, replacing
    /// the selection
    pub fn select_by_property(
        &self,
        key: &str,
        value: impl Into<Value>,
        options: &ProgrammaticSelectOptions,
    ) -> Result<SelectionDiff> {
        if self.shared.state().destroyed {
            return Err(SelectShared::destroyed_error("selectByProperty"));
        }
        if key.is_empty() {
            return Err(MapError::validation("Property name must not be empty"));
        }

        let value = value.into();
        let matches = self.shared.scan(options.layer_name.as_deref(), |layer| {
            layer
                .features()
                .into_iter()
                .filter(|feature| {
                    feature
                        .get(key)
                        .map_or(false, |stored| property_matches(&stored, &value))
                })
                .collect()
        });
        self.shared
            .select_programmatic(matches, options, "selectByProperty")
    }

    /// Replaces the style of current and future highlights in place,
    /// dropping per-feature overrides
    pub fn update_select_style(&self, style: impl Into<SelectStyle>) -> Result<&Self> {
        {
            let mut guard = self.shared.state();
            let state = &mut *guard;
            if state.destroyed {
                return Err(SelectShared::destroyed_error("updateSelectStyle"));
            }
            state.style = Some(style.into());
            let ctx = self.shared.style_context(state.style.as_ref(), &state.config);
            state.highlights.restyle_all(self.shared.surface.as_ref(), &ctx, true);
        }
        self.shared.sync_zoom_listener();
        Ok(self)
    }

    pub fn is_select_enabled(&self) -> bool {
        self.shared.state().mode.is_some()
    }

    pub fn current_mode(&self) -> Option<SelectMode> {
        self.shared.state().mode
    }

    pub fn select_style(&self) -> Option<SelectStyle> {
        self.shared.state().style.clone()
    }

    pub fn highlight_count(&self) -> usize {
        self.shared.state().highlights.len()
    }

    /// Style painted for `feature`, `None` when it isn't selected
    pub fn highlight_style(&self, feature: &FeatureRef) -> Option<HighlightStyle> {
        self.shared.state().highlights.style_of(feature)
    }

    pub fn is_destroyed(&self) -> bool {
        self.shared.state().destroyed
    }

    /// Disables selection, clears it and releases every highlight layer.
    /// Later calls are no-ops.
    pub fn destroy(&self) {
        if self.is_destroyed() {
            return;
        }
        self.disable_select();
        {
            let mut state = self.shared.state();
            state.model.clear();
            state.highlights.release_all(self.shared.surface.as_ref());
            state.style = None;
            state.zoom_listener = None;
            state.destroyed = true;
        }
        self.shared.events.clear();
        log::debug!("select handler destroyed");
    }
}

impl Configurable for SelectHandler {
    type Config = SelectConfig;

    fn config(&self) -> SelectConfig {
        self.shared.state().config.clone()
    }

    /// Replaces the config and restyles highlights that use the defaults
    fn set_config(&self, config: SelectConfig) -> Result<()> {
        Self::validate_config(&config)?;
        let mut guard = self.shared.state();
        let state = &mut *guard;
        state.config = config;
        let ctx = self.shared.style_context(state.style.as_ref(), &state.config);
        state.highlights.restyle_all(self.shared.surface.as_ref(), &ctx, false);
        Ok(())
    }

    fn validate_config(config: &SelectConfig) -> Result<()> {
        config.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::{error_handler::NoopReporter, geo::Point},
        layers::feature::{SimpleFeature, VectorLayer},
        surface::headless::HeadlessSurface,
    };

    fn fixture() -> (Arc<HeadlessSurface>, SelectHandler) {
        let surface = Arc::new(
            HeadlessSurface::new().with_layer(
                VectorLayer::new("points")
                    .with_feature(SimpleFeature::point("a", 10.0, 10.0))
                    .with_feature(SimpleFeature::point("b", 20.0, 20.0)),
            ),
        );
        let handler = SelectHandler::new(surface.clone(), Arc::new(NoopReporter));
        (surface, handler)
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!("ctrl".parse::<SelectMode>().unwrap(), SelectMode::Ctrl);
        assert_eq!(SelectMode::Ctrl.event_type(), MapEventType::Click);
        assert_eq!(SelectMode::Hover.event_type(), MapEventType::Hover);
        assert!("".parse::<SelectMode>().is_err());
        assert!("drag".parse::<SelectMode>().is_err());
    }

    #[test]
    fn test_starts_disabled() {
        let (surface, handler) = fixture();
        assert!(!handler.is_select_enabled());
        assert_eq!(handler.current_mode(), None);
        assert_eq!(surface.total_subscriptions(), 0);
    }

    #[test]
    fn test_click_replaces_and_miss_clears() {
        let (surface, handler) = fixture();
        handler.enable_select(SelectMode::Click, SelectOptions::new()).unwrap();

        surface.click(Point::new(10.0, 10.0));
        surface.click(Point::new(20.0, 20.0));
        let selected = handler.get_selected_features();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id(), Some("b"));

        surface.click(Point::new(90.0, 90.0));
        assert!(handler.get_selected_features().is_empty());
        assert_eq!(handler.highlight_count(), 0);
    }

    #[test]
    fn test_negative_tolerance_is_rejected() {
        let (_surface, handler) = fixture();
        let err = handler
            .enable_select(SelectMode::Click, SelectOptions::new().hit_tolerance(-2.0))
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Validation);
        assert!(!handler.is_select_enabled());
    }

    #[test]
    fn test_drop_releases_highlights() {
        let (surface, handler) = fixture();
        handler
            .select_by_ids(&["a", "b"], &ProgrammaticSelectOptions::new())
            .unwrap();
        assert_eq!(surface.highlight_count(), 2);
        drop(handler);
        assert_eq!(surface.highlight_count(), 0);
    }

    #[test]
    fn test_set_config_rejects_invalid() {
        let (_surface, handler) = fixture();
        let result = handler.update_config(|config| config.fit_padding = f64::NAN);
        assert!(result.is_err());
        assert_eq!(handler.config().fit_padding, 100.0);
    }
}
