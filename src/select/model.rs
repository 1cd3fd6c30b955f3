use crate::{
    prelude::HashSet,
    surface::{feature_key, FeatureKey, FeatureRef},
};

/// Features added and removed by one selection change
#[derive(Debug, Clone, Default)]
pub struct SelectionDiff {
    pub added: Vec<FeatureRef>,
    pub removed: Vec<FeatureRef>,
}

impl SelectionDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Ordered set of selected features keyed by handle identity.
///
/// Pure data; painting the selection is the highlight renderer's job.
#[derive(Debug, Default)]
pub struct SelectionModel {
    features: Vec<FeatureRef>,
    keys: HashSet<FeatureKey>,
}

impl SelectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, feature: &FeatureRef) -> bool {
        self.keys.contains(&feature_key(feature))
    }

    /// Replaces the selection with `features` (duplicates dropped, first
    /// occurrence wins). Features in both the old and new selection appear in
    /// neither side of the diff.
    pub fn replace_with(&mut self, features: Vec<FeatureRef>) -> SelectionDiff {
        let mut next = Vec::with_capacity(features.len());
        let mut next_keys = HashSet::default();
        for feature in features {
            if next_keys.insert(feature_key(&feature)) {
                next.push(feature);
            }
        }

        let removed = self
            .features
            .iter()
            .filter(|feature| !next_keys.contains(&feature_key(feature)))
            .cloned()
            .collect();
        let added = next
            .iter()
            .filter(|feature| !self.keys.contains(&feature_key(feature)))
            .cloned()
            .collect();

        self.features = next;
        self.keys = next_keys;
        SelectionDiff { added, removed }
    }

    /// Appends `feature` unless already selected
    pub fn add(&mut self, feature: FeatureRef) -> SelectionDiff {
        if !self.keys.insert(feature_key(&feature)) {
            return SelectionDiff::default();
        }
        self.features.push(feature.clone());
        SelectionDiff {
            added: vec![feature],
            removed: Vec::new(),
        }
    }

    pub fn remove(&mut self, feature: &FeatureRef) -> SelectionDiff {
        let key = feature_key(feature);
        if !self.keys.remove(&key) {
            return SelectionDiff::default();
        }
        let mut removed = Vec::new();
        self.features.retain(|selected| {
            if feature_key(selected) == key {
                removed.push(selected.clone());
                false
            } else {
                true
            }
        });
        SelectionDiff {
            added: Vec::new(),
            removed,
        }
    }

    pub fn clear(&mut self) -> SelectionDiff {
        self.keys.clear();
        SelectionDiff {
            added: Vec::new(),
            removed: std::mem::take(&mut self.features),
        }
    }

    /// Selected features in selection order
    pub fn features(&self) -> Vec<FeatureRef> {
        self.features.clone()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::feature::SimpleFeature;
    use std::sync::Arc;

    fn ids(features: &[FeatureRef]) -> Vec<Option<&str>> {
        features.iter().map(|feature| feature.id()).collect()
    }

    #[test]
    fn test_identity_not_equality() {
        let a = SimpleFeature::point("same", 0.0, 0.0).into_ref();
        let b = SimpleFeature::point("same", 0.0, 0.0).into_ref();
        let mut model = SelectionModel::new();

        assert_eq!(model.add(a.clone()).added.len(), 1);
        assert!(model.add(a.clone()).is_empty());
        assert_eq!(model.add(b.clone()).added.len(), 1);
        assert_eq!(model.len(), 2);
        assert!(model.contains(&Arc::clone(&a)));
    }

    #[test]
    fn test_replace_with_diff() {
        let a = SimpleFeature::point("a", 0.0, 0.0).into_ref();
        let b = SimpleFeature::point("b", 0.0, 0.0).into_ref();
        let c = SimpleFeature::point("c", 0.0, 0.0).into_ref();
        let mut model = SelectionModel::new();
        model.replace_with(vec![a.clone(), b.clone()]);

        let diff = model.replace_with(vec![b.clone(), c.clone(), c.clone()]);
        assert_eq!(ids(&diff.added), vec![Some("c")]);
        assert_eq!(ids(&diff.removed), vec![Some("a")]);
        assert_eq!(ids(&model.features()), vec![Some("b"), Some("c")]);
    }

    #[test]
    fn test_remove_and_clear() {
        let a = SimpleFeature::point("a", 0.0, 0.0).into_ref();
        let b = SimpleFeature::point("b", 0.0, 0.0).into_ref();
        let mut model = SelectionModel::new();
        model.add(a.clone());
        model.add(b.clone());

        assert_eq!(ids(&model.remove(&a).removed), vec![Some("a")]);
        assert!(model.remove(&a).is_empty());

        let diff = model.clear();
        assert_eq!(ids(&diff.removed), vec![Some("b")]);
        assert!(model.is_empty());
        assert!(model.clear().is_empty());
    }
}
