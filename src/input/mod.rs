pub mod events;
pub mod handler;
pub mod registry;

// Re-export the essential types
pub use events::{KeyModifiers, MapEventData, MapEventType, MouseButton, NativeBinding};
pub use handler::{EventManager, NativeSubscription};
pub use registry::{
    EventCallback, EventFilter, ListenerId, ListenerInfo, ListenerOptions, ListenerRegistry,
};
