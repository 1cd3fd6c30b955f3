use crate::{
    prelude::HashMap,
    surface::{Feature, FeatureLayer, FeatureRef},
};
use geo_types::{Geometry, Point as GeoPoint};
use serde_json::Value;
use std::sync::Arc;

/// A feature with an optional id, free-form properties and a geometry
#[derive(Debug, Clone, Default)]
pub struct SimpleFeature {
    id: Option<String>,
    properties: HashMap<String, Value>,
    geometry: Option<Geometry<f64>>,
}

impl SimpleFeature {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point feature at `(x, y)` in map units
    pub fn point(id: impl Into<String>, x: f64, y: f64) -> Self {
        Self::new()
            .with_id(id)
            .with_geometry(GeoPoint::new(x, y))
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add a property to this feature
    pub fn with_property<V: Into<Value>>(mut self, key: impl Into<String>, value: V) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_geometry(mut self, geometry: impl Into<Geometry<f64>>) -> Self {
        self.geometry = Some(geometry.into());
        self
    }

    pub fn set_property<V: Into<Value>>(&mut self, key: impl Into<String>, value: V) {
        self.properties.insert(key.into(), value.into());
    }

    pub fn properties(&self) -> &HashMap<String, Value> {
        &self.properties
    }

    /// Wraps the feature in a shared handle
    pub fn into_ref(self) -> FeatureRef {
        Arc::new(self)
    }
}

impl Feature for SimpleFeature {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn get(&self, key: &str) -> Option<Value> {
        self.properties.get(key).cloned()
    }

    fn geometry(&self) -> Option<&Geometry<f64>> {
        self.geometry.as_ref()
    }
}

/// Named, ordered collection of features
#[derive(Debug, Clone, Default)]
pub struct VectorLayer {
    name: Option<String>,
    features: Vec<FeatureRef>,
}

impl VectorLayer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            features: Vec::new(),
        }
    }

    /// A layer without a name. Never matched by a layer filter.
    pub fn unnamed() -> Self {
        Self::default()
    }

    pub fn with_feature(mut self, feature: impl Feature + 'static) -> Self {
        self.features.push(Arc::new(feature));
        self
    }

    /// Adds an existing handle, keeping its identity
    pub fn add_feature(&mut self, feature: FeatureRef) {
        self.features.push(feature);
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl FeatureLayer for VectorLayer {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn features(&self) -> Vec<FeatureRef> {
        self.features.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bounds::Bounds;
    use geo_types::polygon;

    #[test]
    fn test_feature_accessors() {
        let feature = SimpleFeature::point("a", 1.0, 2.0).with_property("kind", "well");
        assert_eq!(feature.id(), Some("a"));
        assert_eq!(feature.get("kind"), Some(Value::from("well")));
        assert_eq!(feature.get("missing"), None);
        assert_eq!(feature.extent(), Some(Bounds::from_coords(1.0, 2.0, 1.0, 2.0)));
    }

    #[test]
    fn test_extent_of_polygon_and_missing_geometry() {
        let feature = SimpleFeature::new().with_geometry(polygon![
            (x: 0.0, y: 0.0),
            (x: 4.0, y: 0.0),
            (x: 4.0, y: 3.0)
        ]);
        assert_eq!(feature.extent(), Some(Bounds::from_coords(0.0, 0.0, 4.0, 3.0)));
        assert_eq!(SimpleFeature::new().extent(), None);
    }

    #[test]
    fn test_layer_lookup_by_id() {
        let layer = VectorLayer::new("wells")
            .with_feature(SimpleFeature::point("a", 0.0, 0.0))
            .with_feature(SimpleFeature::point("b", 1.0, 1.0));

        assert_eq!(layer.name(), Some("wells"));
        assert_eq!(layer.len(), 2);
        let found = layer.feature_by_id("b").unwrap();
        assert_eq!(found.id(), Some("b"));
        assert!(layer.feature_by_id("c").is_none());
        assert_eq!(VectorLayer::unnamed().name(), None);
    }
}
