use crate::{
    input::events::{MapEventData, MapEventType},
    prelude::HashMap,
    Result,
};
use serde::Serialize;
use std::{
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

/// Event listener callback type
pub type EventCallback = Arc<dyn Fn(&MapEventData) -> Result<()> + Send + Sync>;

/// Predicate deciding whether a listener sees an event
pub type EventFilter = Arc<dyn Fn(&MapEventData) -> bool + Send + Sync>;

/// Identifier handed out by [`ListenerRegistry::register`].
///
/// Formatted as `{type}_{sequence}_{timestamp}`; sequences are per type and
/// never reused, so a stale id can't alias a newer listener.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ListenerId(String);

impl ListenerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ListenerId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Registration options for a listener
#[derive(Clone, Default)]
pub struct ListenerOptions {
    pub once: bool,
    pub filter: Option<EventFilter>,
}

impl std::fmt::Debug for ListenerOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerOptions")
            .field("once", &self.once)
            .field("filter", &self.filter.is_some())
            .finish()
    }
}

impl ListenerOptions {
    /// Options for a listener removed after its first invocation
    pub fn once() -> Self {
        Self {
            once: true,
            filter: None,
        }
    }

    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&MapEventData) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(filter));
        self
    }
}

#[derive(Clone)]
pub struct ListenerRecord {
    pub id: ListenerId,
    pub event_type: MapEventType,
    pub callback: EventCallback,
    pub once: bool,
    pub filter: Option<EventFilter>,
}

impl std::fmt::Debug for ListenerRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRecord")
            .field("id", &self.id)
            .field("event_type", &self.event_type)
            .field("once", &self.once)
            .field("filter", &self.filter.is_some())
            .finish()
    }
}

impl ListenerRecord {
    /// Whether the record's filter admits `event`
    pub fn accepts(&self, event: &MapEventData) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }
}

/// Debug view of a registered listener
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListenerInfo {
    pub id: ListenerId,
    #[serde(rename = "type")]
    pub event_type: MapEventType,
    pub has_filter: bool,
    pub is_once: bool,
}

/// Typed listener storage, independent of any native subscription
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    /// Records in registration order
    records: Vec<ListenerRecord>,
    sequences: HashMap<MapEventType, u64>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        event_type: MapEventType,
        callback: EventCallback,
        options: ListenerOptions,
    ) -> ListenerId {
        let id = self.next_id(event_type);
        self.records.push(ListenerRecord {
            id: id.clone(),
            event_type,
            callback,
            once: options.once,
            filter: options.filter,
        });
        id
    }

    fn next_id(&mut self, event_type: MapEventType) -> ListenerId {
        let sequence = self.sequences.entry(event_type).or_insert(0);
        *sequence += 1;
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis())
            .unwrap_or_default();
        ListenerId(format!("{}_{}_{}", event_type, sequence, timestamp))
    }

    pub fn remove(&mut self, id: &str) -> Option<ListenerRecord> {
        let index = self.records.iter().position(|record| record.id.as_str() == id)?;
        Some(self.records.remove(index))
    }

    /// Removes every record of `event_type`, returning how many there were
    pub fn remove_type(&mut self, event_type: MapEventType) -> usize {
        let before = self.records.len();
        self.records.retain(|record| record.event_type != event_type);
        before - self.records.len()
    }

    /// Drops all records. Sequence counters are kept.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.iter().any(|record| record.id.as_str() == id)
    }

    pub fn count(&self, event_type: MapEventType) -> usize {
        self.records
            .iter()
            .filter(|record| record.event_type == event_type)
            .count()
    }

    /// Copies of the records of `event_type`, in registration order
    pub fn snapshot(&self, event_type: MapEventType) -> Vec<ListenerRecord> {
        self.records
            .iter()
            .filter(|record| record.event_type == event_type)
            .cloned()
            .collect()
    }

    pub fn info(&self) -> Vec<ListenerInfo> {
        self.records
            .iter()
            .map(|record| ListenerInfo {
                id: record.id.clone(),
                event_type: record.event_type,
                has_filter: record.filter.is_some(),
                is_once: record.once,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> EventCallback {
        Arc::new(|_| Ok(()))
    }

    #[test]
    fn test_id_format() {
        let mut registry = ListenerRegistry::new();
        let id = registry.register(MapEventType::Click, noop(), ListenerOptions::default());

        let parts: Vec<&str> = id.as_str().split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "click");
        assert_eq!(parts[1], "1");
        assert!(parts[2].parse::<u128>().is_ok());
    }

    #[test]
    fn test_sequences_are_per_type_and_never_reused() {
        let mut registry = ListenerRegistry::new();
        let first = registry.register(MapEventType::Click, noop(), ListenerOptions::default());
        let hover = registry.register(MapEventType::Hover, noop(), ListenerOptions::default());
        assert!(hover.as_str().starts_with("hover_1_"));

        assert!(registry.remove(first.as_str()).is_some());
        registry.clear();

        let second = registry.register(MapEventType::Click, noop(), ListenerOptions::default());
        assert!(second.as_str().starts_with("click_2_"));
        assert_ne!(first, second);
        assert!(!registry.contains(first.as_str()));
    }

    #[test]
    fn test_same_callback_twice_gives_two_records() {
        let mut registry = ListenerRegistry::new();
        let callback = noop();
        let a = registry.register(MapEventType::Click, callback.clone(), ListenerOptions::default());
        let b = registry.register(MapEventType::Click, callback, ListenerOptions::default());

        assert_ne!(a, b);
        assert_eq!(registry.count(MapEventType::Click), 2);
    }

    #[test]
    fn test_snapshot_keeps_registration_order() {
        let mut registry = ListenerRegistry::new();
        let a = registry.register(MapEventType::Click, noop(), ListenerOptions::default());
        registry.register(MapEventType::MoveEnd, noop(), ListenerOptions::default());
        let c = registry.register(MapEventType::Click, noop(), ListenerOptions::once());

        let snapshot = registry.snapshot(MapEventType::Click);
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].id, a);
        assert_eq!(snapshot[1].id, c);
        assert!(snapshot[1].once);
    }

    #[test]
    fn test_remove_type_and_info() {
        let mut registry = ListenerRegistry::new();
        registry.register(
            MapEventType::Click,
            noop(),
            ListenerOptions::default().with_filter(|_| true),
        );
        registry.register(MapEventType::Click, noop(), ListenerOptions::default());
        registry.register(MapEventType::ZoomEnd, noop(), ListenerOptions::once());

        let info = registry.info();
        assert!(info[0].has_filter);
        assert!(!info[1].has_filter);
        assert!(info[2].is_once);

        assert_eq!(registry.remove_type(MapEventType::Click), 2);
        assert_eq!(registry.remove_type(MapEventType::Click), 0);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_filter_accepts() {
        let mut registry = ListenerRegistry::new();
        registry.register(
            MapEventType::Click,
            noop(),
            ListenerOptions::default().with_filter(|event| event.zoom.is_some()),
        );
        let record = &registry.snapshot(MapEventType::Click)[0];

        let mut event = MapEventData::new(MapEventType::Click);
        assert!(!record.accepts(&event));
        event.zoom = Some(3.0);
        assert!(record.accepts(&event));
    }

    #[test]
    fn test_info_serializes_camel_case() {
        let mut registry = ListenerRegistry::new();
        registry.register(MapEventType::Hover, noop(), ListenerOptions::once());
        let json = serde_json::to_value(registry.info()).unwrap();
        assert_eq!(json[0]["type"], "hover");
        assert_eq!(json[0]["isOnce"], true);
        assert_eq!(json[0]["hasFilter"], false);
    }
}
