use crate::{
    core::error_handler::ErrorReporter,
    input::{
        events::{MapEventData, MapEventType},
        registry::{EventCallback, ListenerId, ListenerInfo, ListenerOptions, ListenerRegistry},
    },
    prelude::HashMap,
    surface::{
        HitOptions, NativeEvent, NativeEventName, NativeHandler, NativeTarget, RenderSurface,
        SubscriptionId,
    },
    MapError, Result,
};
use serde::Serialize;
use serde_json::json;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// Record of a logical type currently attached to the render surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NativeSubscription {
    pub event_type: MapEventType,
    pub target: NativeTarget,
    pub native_event: NativeEventName,
    pub is_once: bool,
}

/// One native event on one target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Channel {
    target: NativeTarget,
    event: NativeEventName,
}

/// The single surface subscription backing a channel
#[derive(Debug)]
struct ChannelState {
    subscription: SubscriptionId,
    once: bool,
    /// Logical types fed by this subscription
    attached: Vec<MapEventType>,
}

#[derive(Default)]
struct ManagerState {
    registry: ListenerRegistry,
    native: HashMap<MapEventType, NativeSubscription>,
    channels: HashMap<Channel, ChannelState>,
}

struct Shared {
    surface: Arc<dyn RenderSurface>,
    reporter: Arc<dyn ErrorReporter>,
    state: Mutex<ManagerState>,
}

/// Multiplexes native surface events into logical listener subscriptions.
///
/// Holds at most one native subscription per logical type. The subscription
/// is attached when the first listener of a type registers and detached when
/// the last one leaves. Logical types fed by the same native event (`hover`
/// and `pointermove`) share one surface subscription and one normalized event
/// per firing.
///
/// Cloning yields another handle to the same manager.
#[derive(Clone)]
pub struct EventManager {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for EventManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.state();
        f.debug_struct("EventManager")
            .field("listeners", &state.registry.len())
            .field("native", &state.native.len())
            .field("channels", &state.channels.len())
            .finish()
    }
}

impl Shared {
    fn state(&self) -> MutexGuard<'_, ManagerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Attaches `event_type` to the surface, sharing an existing channel
    fn attach(self: &Arc<Self>, state: &mut ManagerState, event_type: MapEventType) -> Result<()> {
        if state.native.contains_key(&event_type) {
            return Ok(());
        }

        let binding = event_type.binding();
        let channel = Channel {
            target: binding.target,
            event: binding.event,
        };

        match state.channels.get_mut(&channel) {
            Some(channel_state) => channel_state.attached.push(event_type),
            None => {
                let weak: Weak<Shared> = Arc::downgrade(self);
                let handler: NativeHandler = Arc::new(move |native: &NativeEvent| {
                    if let Some(shared) = weak.upgrade() {
                        shared.handle_native(channel, native);
                    }
                });
                let subscription = self
                    .surface
                    .subscribe(binding.target, binding.event, handler, binding.once)?;
                log::debug!(
                    "attached native '{}' for '{}' ({:?})",
                    binding.event,
                    event_type,
                    subscription
                );
                state.channels.insert(
                    channel,
                    ChannelState {
                        subscription,
                        once: binding.once,
                        attached: vec![event_type],
                    },
                );
            }
        }

        state.native.insert(
            event_type,
            NativeSubscription {
                event_type,
                target: binding.target,
                native_event: binding.event,
                is_once: binding.once,
            },
        );
        Ok(())
    }

    fn detach(&self, state: &mut ManagerState, event_type: MapEventType) {
        let Some(native) = state.native.remove(&event_type) else {
            return;
        };
        let channel = Channel {
            target: native.target,
            event: native.native_event,
        };

        let now_unused = match state.channels.get_mut(&channel) {
            Some(channel_state) => {
                channel_state.attached.retain(|attached| *attached != event_type);
                channel_state.attached.is_empty()
            }
            None => false,
        };

        if now_unused {
            if let Some(channel_state) = state.channels.remove(&channel) {
                self.surface.unsubscribe(channel_state.subscription);
                log::debug!("detached native '{}' for '{}'", channel.event, event_type);
            }
        }
    }

    fn remove_listener(self: &Arc<Self>, id: &str) -> bool {
        let mut state = self.state();
        let Some(record) = state.registry.remove(id) else {
            return false;
        };
        if state.registry.count(record.event_type) == 0 {
            self.detach(&mut state, record.event_type);
        }
        true
    }

    fn handle_native(self: &Arc<Self>, channel: Channel, native: &NativeEvent) {
        let (event_types, once) = {
            let mut state = self.state();
            let Some(channel_state) = state.channels.get(&channel) else {
                return;
            };
            let once = channel_state.once;
            let mut event_types = channel_state.attached.clone();
            event_types.sort();

            // The surface has already dropped a one-shot handler
            if once {
                state.channels.remove(&channel);
                for event_type in &event_types {
                    state.native.remove(event_type);
                }
            }
            (event_types, once)
        };

        let event = self.normalize(native);
        for event_type in &event_types {
            self.dispatch(*event_type, &event);
        }

        if once {
            self.rearm(&event_types);
        }
    }

    /// Re-registers one-shot native subscriptions for types that still have
    /// listeners after a firing.
    fn rearm(self: &Arc<Self>, event_types: &[MapEventType]) {
        let mut state = self.state();
        for event_type in event_types {
            if state.registry.count(*event_type) == 0 {
                continue;
            }
            if let Err(error) = self.attach(&mut state, *event_type) {
                self.reporter.report(&error);
            }
        }
    }

    fn normalize(&self, native: &NativeEvent) -> MapEventData {
        let mut event = MapEventData::new(MapEventType::from_native(native.name));
        event.original_event = Some(native.clone());
        event.modifiers = native.modifiers;

        if native.name.is_pointer() {
            event.pixel = native.pixel;
            event.coordinate = native.coordinate;
            if let Some(pixel) = native.pixel {
                event.hits = self.surface.hit_test(pixel, &HitOptions::default());
                event.features = event.hits.iter().map(|hit| hit.feature.clone()).collect();
                event.feature = event.features.first().cloned();
            }
        } else if native.name == NativeEventName::Error {
            event.error = native.message.clone();
        } else {
            let view = self.surface.view();
            event.zoom = view.zoom;
            event.coordinate = view.center;
        }

        event
    }

    fn dispatch(self: &Arc<Self>, event_type: MapEventType, event: &MapEventData) {
        let records = self.state().registry.snapshot(event_type);

        for record in records {
            if !record.accepts(event) {
                continue;
            }

            if let Err(error) = (record.callback)(event) {
                let wrapped = MapError::component(format!("Error in event listener: {}", error))
                    .with_context(json!({
                        "listener": record.id.as_str(),
                        "type": event_type.as_str(),
                    }));
                self.reporter.report(&wrapped);
            }

            if record.once {
                self.remove_listener(record.id.as_str());
            }
        }
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        for (_, channel_state) in state.channels.drain() {
            self.surface.unsubscribe(channel_state.subscription);
        }
    }
}

impl EventManager {
    pub fn new(surface: Arc<dyn RenderSurface>, reporter: Arc<dyn ErrorReporter>) -> Self {
        Self {
            shared: Arc::new(Shared {
                surface,
                reporter,
                state: Mutex::new(ManagerState::default()),
            }),
        }
    }

    /// Register an event listener
    ///
    /// Attaches the native subscription for `event_type` if this is its first
    /// listener. Fails with [`MapError::Map`] if the surface refuses the
    /// subscription, in which case nothing is registered.
    pub fn on<F>(
        &self,
        event_type: MapEventType,
        callback: F,
        options: ListenerOptions,
    ) -> Result<ListenerId>
    where
        F: Fn(&MapEventData) -> Result<()> + Send + Sync + 'static,
    {
        let callback: EventCallback = Arc::new(callback);
        let mut state = self.shared.state();
        let id = state.registry.register(event_type, callback, options);

        if state.registry.count(event_type) == 1 {
            if let Err(error) = self.shared.attach(&mut state, event_type) {
                state.registry.remove(id.as_str());
                return Err(error);
            }
        }
        Ok(id)
    }

    /// Removes one listener. Unknown ids return `false`.
    pub fn off(&self, id: impl AsRef<str>) -> bool {
        self.shared.remove_listener(id.as_ref())
    }

    /// Removes every listener of `event_type`, returning how many were removed
    pub fn off_all(&self, event_type: MapEventType) -> usize {
        let mut state = self.shared.state();
        let removed = state.registry.remove_type(event_type);
        if removed > 0 {
            self.shared.detach(&mut state, event_type);
        }
        removed
    }

    /// Removes all listeners and native subscriptions
    pub fn clear(&self) {
        let mut state = self.shared.state();
        state.registry.clear();
        let attached: Vec<MapEventType> = state.native.keys().copied().collect();
        for event_type in attached {
            self.shared.detach(&mut state, event_type);
        }
    }

    pub fn listener_count(&self, event_type: MapEventType) -> usize {
        self.shared.state().registry.count(event_type)
    }

    pub fn listeners_info(&self) -> Vec<ListenerInfo> {
        self.shared.state().registry.info()
    }

    /// Whether a native subscription currently serves `event_type`
    pub fn is_attached(&self, event_type: MapEventType) -> bool {
        self.shared.state().native.contains_key(&event_type)
    }

    pub fn native_subscriptions(&self) -> Vec<NativeSubscription> {
        let state = self.shared.state();
        let mut subscriptions: Vec<NativeSubscription> = state.native.values().cloned().collect();
        subscriptions.sort_by_key(|subscription| subscription.event_type);
        subscriptions
    }

    pub fn surface(&self) -> &Arc<dyn RenderSurface> {
        &self.shared.surface
    }

    pub fn reporter(&self) -> &Arc<dyn ErrorReporter> {
        &self.shared.reporter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{core::error_handler::NoopReporter, surface::headless::HeadlessSurface};

    fn manager() -> (Arc<HeadlessSurface>, EventManager) {
        let surface = Arc::new(HeadlessSurface::new());
        let manager = EventManager::new(surface.clone(), Arc::new(NoopReporter));
        (surface, manager)
    }

    #[test]
    fn test_attach_on_first_detach_on_last() {
        let (surface, manager) = manager();
        let a = manager.on(MapEventType::Click, |_| Ok(()), ListenerOptions::default()).unwrap();
        let b = manager.on(MapEventType::Click, |_| Ok(()), ListenerOptions::default()).unwrap();
        assert_eq!(surface.subscription_count(NativeEventName::Click), 1);

        assert!(manager.off(&a));
        assert!(manager.is_attached(MapEventType::Click));
        assert!(manager.off(&b));
        assert!(!manager.is_attached(MapEventType::Click));
        assert_eq!(surface.subscription_count(NativeEventName::Click), 0);
    }

    #[test]
    fn test_hover_and_pointermove_share_subscription() {
        let (surface, manager) = manager();
        let hover = manager.on(MapEventType::Hover, |_| Ok(()), ListenerOptions::default()).unwrap();
        manager
            .on(MapEventType::PointerMove, |_| Ok(()), ListenerOptions::default())
            .unwrap();
        assert_eq!(surface.subscription_count(NativeEventName::PointerMove), 1);

        manager.off(&hover);
        assert!(!manager.is_attached(MapEventType::Hover));
        assert!(manager.is_attached(MapEventType::PointerMove));
        assert_eq!(surface.subscription_count(NativeEventName::PointerMove), 1);

        manager.off_all(MapEventType::PointerMove);
        assert_eq!(surface.subscription_count(NativeEventName::PointerMove), 0);
    }

    #[test]
    fn test_drop_releases_native_subscriptions() {
        let (surface, manager) = manager();
        manager.on(MapEventType::MoveEnd, |_| Ok(()), ListenerOptions::default()).unwrap();
        assert_eq!(surface.subscription_count(NativeEventName::MoveEnd), 1);
        drop(manager);
        assert_eq!(surface.subscription_count(NativeEventName::MoveEnd), 0);
    }

    #[test]
    fn test_failed_attach_registers_nothing() {
        let (surface, manager) = manager();
        surface.set_target_attached(false);

        let err = manager
            .on(MapEventType::Click, |_| Ok(()), ListenerOptions::default())
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Map);
        assert_eq!(manager.listener_count(MapEventType::Click), 0);
        assert!(manager.listeners_info().is_empty());
    }
}
