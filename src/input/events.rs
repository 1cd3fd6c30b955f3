use crate::{
    core::geo::{Coordinate, Pixel},
    surface::{FeatureRef, HitResult, NativeEvent, NativeEventName, NativeTarget},
    MapError, Result,
};
use serde::{Deserialize, Serialize};

/// Keyboard modifiers held during a pointer event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct KeyModifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl KeyModifiers {
    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::default()
        }
    }

    /// Ctrl (or Cmd) pressed with no other modifier
    pub fn platform_modifier_only(&self) -> bool {
        (self.ctrl || self.meta) && !self.shift && !self.alt
    }
}

/// Mouse button types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

/// Logical event types consumers subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapEventType {
    Click,
    DblClick,
    Hover,
    PointerMove,
    MoveEnd,
    ZoomEnd,
    RenderComplete,
    Error,
}

/// Where a logical type is sourced from on the render surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeBinding {
    pub target: NativeTarget,
    pub event: NativeEventName,
    /// Registered as a native one-shot
    pub once: bool,
}

const fn bind(target: NativeTarget, event: NativeEventName, once: bool) -> NativeBinding {
    NativeBinding {
        target,
        event,
        once,
    }
}

/// Logical type to native event mapping. Types sharing a binding share one
/// native subscription and one normalized event per firing.
const NATIVE_BINDINGS: [(MapEventType, NativeBinding); 8] = [
    (MapEventType::Click, bind(NativeTarget::Map, NativeEventName::Click, false)),
    (MapEventType::DblClick, bind(NativeTarget::Map, NativeEventName::DblClick, false)),
    (MapEventType::Hover, bind(NativeTarget::Map, NativeEventName::PointerMove, false)),
    (MapEventType::PointerMove, bind(NativeTarget::Map, NativeEventName::PointerMove, false)),
    (MapEventType::MoveEnd, bind(NativeTarget::Map, NativeEventName::MoveEnd, false)),
    (MapEventType::ZoomEnd, bind(NativeTarget::View, NativeEventName::ChangeResolution, false)),
    (MapEventType::RenderComplete, bind(NativeTarget::Map, NativeEventName::RenderComplete, true)),
    (MapEventType::Error, bind(NativeTarget::Map, NativeEventName::Error, false)),
];

impl MapEventType {
    /// Every logical type in dispatch enumeration order
    pub const ALL: [MapEventType; 8] = [
        MapEventType::Click,
        MapEventType::DblClick,
        MapEventType::Hover,
        MapEventType::PointerMove,
        MapEventType::MoveEnd,
        MapEventType::ZoomEnd,
        MapEventType::RenderComplete,
        MapEventType::Error,
    ];

    pub fn binding(self) -> NativeBinding {
        NATIVE_BINDINGS
            .iter()
            .find(|(event_type, _)| *event_type == self)
            .map(|(_, binding)| *binding)
            .unwrap_or_else(|| unreachable!("every MapEventType has a native binding"))
    }

    /// Logical types fed by the given native event, in enumeration order
    pub fn fed_by(target: NativeTarget, event: NativeEventName) -> Vec<MapEventType> {
        NATIVE_BINDINGS
            .iter()
            .filter(|(_, binding)| binding.target == target && binding.event == event)
            .map(|(event_type, _)| *event_type)
            .collect()
    }

    /// The type stamped on a normalized event built from `event`
    pub fn from_native(event: NativeEventName) -> MapEventType {
        match event {
            NativeEventName::Click => MapEventType::Click,
            NativeEventName::DblClick => MapEventType::DblClick,
            NativeEventName::PointerMove => MapEventType::PointerMove,
            NativeEventName::MoveEnd => MapEventType::MoveEnd,
            NativeEventName::ChangeResolution => MapEventType::ZoomEnd,
            NativeEventName::RenderComplete => MapEventType::RenderComplete,
            NativeEventName::Error => MapEventType::Error,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MapEventType::Click => "click",
            MapEventType::DblClick => "dblclick",
            MapEventType::Hover => "hover",
            MapEventType::PointerMove => "pointermove",
            MapEventType::MoveEnd => "moveend",
            MapEventType::ZoomEnd => "zoomend",
            MapEventType::RenderComplete => "rendercomplete",
            MapEventType::Error => "error",
        }
    }
}

impl std::fmt::Display for MapEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MapEventType {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().is_empty() {
            return Err(MapError::validation("Event type is required"));
        }
        MapEventType::ALL
            .iter()
            .copied()
            .find(|event_type| event_type.as_str() == s)
            .ok_or_else(|| {
                MapError::validation(format!("Unknown event type '{}'", s))
                    .with_context(serde_json::json!({ "type": s }))
            })
    }
}

/// Normalized event handed to every matching listener.
///
/// Built once per native firing and shared by reference across all logical
/// types fed by that firing.
#[derive(Debug, Clone)]
pub struct MapEventData {
    pub event_type: MapEventType,
    pub original_event: Option<NativeEvent>,
    pub coordinate: Option<Coordinate>,
    pub pixel: Option<Pixel>,
    /// Features under the pixel, topmost first
    pub features: Vec<FeatureRef>,
    /// Zero-tolerance hit test behind `features`, with layer names
    pub hits: Vec<HitResult>,
    /// Topmost feature under the pixel
    pub feature: Option<FeatureRef>,
    pub zoom: Option<f64>,
    pub modifiers: KeyModifiers,
    /// Message carried by `error` events
    pub error: Option<String>,
}

impl MapEventData {
    pub fn new(event_type: MapEventType) -> Self {
        Self {
            event_type,
            original_event: None,
            coordinate: None,
            pixel: None,
            features: Vec::new(),
            hits: Vec::new(),
            feature: None,
            zoom: None,
            modifiers: KeyModifiers::default(),
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_type_has_binding() {
        for event_type in MapEventType::ALL {
            let binding = event_type.binding();
            assert!(MapEventType::fed_by(binding.target, binding.event).contains(&event_type));
        }
    }

    #[test]
    fn test_hover_and_pointermove_share_native_event() {
        assert_eq!(
            MapEventType::Hover.binding(),
            MapEventType::PointerMove.binding()
        );
        assert_eq!(
            MapEventType::fed_by(NativeTarget::Map, NativeEventName::PointerMove),
            vec![MapEventType::Hover, MapEventType::PointerMove]
        );
    }

    #[test]
    fn test_zoomend_listens_on_view() {
        let binding = MapEventType::ZoomEnd.binding();
        assert_eq!(binding.target, NativeTarget::View);
        assert_eq!(binding.event.as_str(), "change:resolution");
        assert!(MapEventType::RenderComplete.binding().once);
        assert!(!MapEventType::Click.binding().once);
    }

    #[test]
    fn test_parse_event_type() {
        assert_eq!("hover".parse::<MapEventType>().unwrap(), MapEventType::Hover);
        assert_eq!(
            "rendercomplete".parse::<MapEventType>().unwrap(),
            MapEventType::RenderComplete
        );
        assert_eq!(
            "".parse::<MapEventType>().unwrap_err().kind(),
            crate::ErrorKind::Validation
        );
        assert!("wheel".parse::<MapEventType>().is_err());
    }

    #[test]
    fn test_platform_modifier_only() {
        assert!(KeyModifiers::ctrl().platform_modifier_only());
        assert!(KeyModifiers {
            meta: true,
            ..Default::default()
        }
        .platform_modifier_only());
        assert!(!KeyModifiers {
            ctrl: true,
            shift: true,
            ..Default::default()
        }
        .platform_modifier_only());
        assert!(!KeyModifiers::default().platform_modifier_only());
    }
}
