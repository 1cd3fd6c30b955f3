//! Convenience facade over [`EventManager`] for the `click | moveend | hover`
//! callback vocabulary, plus layer lookup by name.

use crate::{
    core::{error_handler::ErrorReporter, geo::Pixel},
    input::{
        events::{MapEventData, MapEventType},
        handler::EventManager,
        registry::{EventFilter, ListenerId, ListenerInfo, ListenerOptions},
    },
    layers::style::GeometryKind,
    surface::{FeatureLayer, FeatureRef, RenderSurface},
    MapError, Result,
};
use geo_types::Geometry;
use serde_json::json;
use std::sync::Arc;

/// Event types accepted by [`MapTools::map_on_event`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolEventType {
    Click,
    MoveEnd,
    Hover,
}

impl ToolEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolEventType::Click => "click",
            ToolEventType::MoveEnd => "moveend",
            ToolEventType::Hover => "hover",
        }
    }

    pub fn event_type(&self) -> MapEventType {
        match self {
            ToolEventType::Click => MapEventType::Click,
            ToolEventType::MoveEnd => MapEventType::MoveEnd,
            ToolEventType::Hover => MapEventType::Hover,
        }
    }
}

impl std::str::FromStr for ToolEventType {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "click" => Ok(ToolEventType::Click),
            "moveend" => Ok(ToolEventType::MoveEnd),
            "hover" => Ok(ToolEventType::Hover),
            "" => Err(MapError::validation("Event type is required")),
            other => Err(MapError::validation(format!("Unsupported event type '{}'", other))
                .with_context(json!({ "type": other }))),
        }
    }
}

/// Payload handed to a [`MapTools`] callback
#[derive(Debug, Clone)]
pub enum ToolEvent {
    Click {
        /// Topmost feature under the pointer
        feature: Option<FeatureRef>,
        features: Vec<FeatureRef>,
        pixel: Option<Pixel>,
    },
    MoveEnd {
        zoom: Option<f64>,
    },
    Hover {
        features: Vec<FeatureRef>,
        pixel: Option<Pixel>,
    },
}

#[derive(Clone, Default)]
pub struct ToolEventOptions {
    /// Skip clicks whose topmost feature has another geometry kind
    pub click_type: Option<GeometryKind>,
    pub once: bool,
    pub filter: Option<EventFilter>,
}

impl std::fmt::Debug for ToolEventOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolEventOptions")
            .field("click_type", &self.click_type)
            .field("once", &self.once)
            .field("filter", &self.filter.is_some())
            .finish()
    }
}

impl ToolEventOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn click_type(mut self, kind: GeometryKind) -> Self {
        self.click_type = Some(kind);
        self
    }

    pub fn once(mut self) -> Self {
        self.once = true;
        self
    }

    pub fn filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&MapEventData) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(filter));
        self
    }
}

/// Whether a click on `feature` passes a click type filter. Features without
/// a geometry always pass; collections never do.
fn matches_click_type(feature: &FeatureRef, kind: GeometryKind) -> bool {
    match feature.geometry() {
        None => true,
        Some(Geometry::GeometryCollection(_)) => false,
        Some(geometry) => GeometryKind::of(Some(geometry)) == kind,
    }
}

fn to_tool_event(event_type: ToolEventType, event: &MapEventData) -> ToolEvent {
    match event_type {
        ToolEventType::Click => ToolEvent::Click {
            feature: event.feature.clone(),
            features: event.features.clone(),
            pixel: event.pixel,
        },
        ToolEventType::MoveEnd => ToolEvent::MoveEnd { zoom: event.zoom },
        ToolEventType::Hover => ToolEvent::Hover {
            features: event.features.clone(),
            pixel: event.pixel,
        },
    }
}

/// Map event helpers
#[derive(Clone)]
pub struct MapTools {
    surface: Arc<dyn RenderSurface>,
    reporter: Arc<dyn ErrorReporter>,
    events: EventManager,
}

impl std::fmt::Debug for MapTools {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapTools")
            .field("events", &self.events)
            .finish()
    }
}

impl MapTools {
    pub fn new(surface: Arc<dyn RenderSurface>, reporter: Arc<dyn ErrorReporter>) -> Self {
        let events = EventManager::new(surface.clone(), reporter.clone());
        Self {
            surface,
            reporter,
            events,
        }
    }

    /// Registers `callback` for `click`, `moveend` or `hover`.
    ///
    /// Callback errors are reported, never propagated to the dispatcher.
    pub fn map_on_event<F>(
        &self,
        event_type: &str,
        callback: F,
        options: ToolEventOptions,
    ) -> Result<ListenerId>
    where
        F: Fn(ToolEvent) -> Result<()> + Send + Sync + 'static,
    {
        let registered = event_type
            .parse::<ToolEventType>()
            .and_then(|tool_type| self.register(tool_type, callback, options.clone()));

        registered.map_err(|error| {
            self.reporter.report(
                &MapError::component(format!("Failed to register map event: {}", error))
                    .with_context(json!({
                        "type": event_type,
                        "clickType": options.click_type.map(|kind| kind.as_str()),
                        "once": options.once,
                    })),
            );
            error
        })
    }

    fn register<F>(
        &self,
        tool_type: ToolEventType,
        callback: F,
        options: ToolEventOptions,
    ) -> Result<ListenerId>
    where
        F: Fn(ToolEvent) -> Result<()> + Send + Sync + 'static,
    {
        let reporter = self.reporter.clone();
        let click_type = options.click_type;

        let listener = move |event: &MapEventData| -> Result<()> {
            if let (ToolEventType::Click, Some(kind), Some(feature)) =
                (tool_type, click_type, event.feature.as_ref())
            {
                if !matches_click_type(feature, kind) {
                    return Ok(());
                }
            }

            if let Err(error) = callback(to_tool_event(tool_type, event)) {
                reporter.report(
                    &MapError::component(format!("Error in event callback: {}", error))
                        .with_context(json!({ "type": tool_type.as_str() })),
                );
            }
            Ok(())
        };

        self.events.on(
            tool_type.event_type(),
            listener,
            ListenerOptions {
                once: options.once,
                filter: options.filter,
            },
        )
    }

    pub fn remove_event_listener(&self, id: impl AsRef<str>) -> bool {
        self.events.off(id)
    }

    /// Removes the listeners of one type, or all listeners with `None`.
    /// Returns how many were removed.
    pub fn remove_all_event_listeners(&self, event_type: Option<&str>) -> Result<usize> {
        match event_type {
            Some(name) => {
                let tool_type: ToolEventType = name.parse()?;
                Ok(self.events.off_all(tool_type.event_type()))
            }
            None => {
                let count = self.events.listeners_info().len();
                self.events.clear();
                Ok(count)
            }
        }
    }

    pub fn event_listeners_info(&self) -> Vec<ListenerInfo> {
        self.events.listeners_info()
    }

    pub fn event_manager(&self) -> &EventManager {
        &self.events
    }

    /// Feature layers whose name is one of `names`, in surface order
    pub fn layers_by_name<S: AsRef<str>>(&self, names: &[S]) -> Vec<Arc<dyn FeatureLayer>> {
        self.surface
            .feature_layers()
            .into_iter()
            .filter(|layer| {
                layer
                    .name()
                    .map_or(false, |name| names.iter().any(|wanted| wanted.as_ref() == name))
            })
            .collect()
    }

    pub fn destroy(&self) {
        self.events.clear();
        log::debug!("MapTools destroyed");
    }
}
