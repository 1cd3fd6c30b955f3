#![allow(dead_code)]

use geo_types::{line_string, polygon};
use maplet_interact::{
    ErrorKind, ErrorReporter, Feature, FeatureRef, HeadlessSurface, MapError, SimpleFeature,
    VectorLayer,
};
use std::sync::{Arc, Mutex};

/// Reporter that keeps every reported error for inspection
#[derive(Default)]
pub struct CollectingReporter {
    errors: Mutex<Vec<(ErrorKind, String)>>,
}

impl CollectingReporter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn errors(&self) -> Vec<(ErrorKind, String)> {
        self.errors.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.errors.lock().unwrap().len()
    }
}

impl ErrorReporter for CollectingReporter {
    fn report(&self, error: &MapError) {
        self.errors
            .lock()
            .unwrap()
            .push((error.kind(), error.message()));
    }
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Surface with three named layers:
///
/// - `wells`: points `w1` (10, 10), `w2` (20, 20), `w3` (30, 30) with a
///   `status` property
/// - `pipes`: line `p1` from (0, 50) to (40, 50)
/// - `parcels`: polygon `z1` covering (60, 60)..(80, 80)
pub fn fixture_surface() -> Arc<HeadlessSurface> {
    init_logger();

    let wells = VectorLayer::new("wells")
        .with_feature(
            SimpleFeature::point("w1", 10.0, 10.0)
                .with_property("status", "active")
                .with_property("depth", 2),
        )
        .with_feature(
            SimpleFeature::point("w2", 20.0, 20.0)
                .with_property("status", "active")
                .with_property("depth", 2.0),
        )
        .with_feature(
            SimpleFeature::point("w3", 30.0, 30.0)
                .with_property("status", "closed")
                .with_property("depth", 5),
        );

    let pipes = VectorLayer::new("pipes").with_feature(
        SimpleFeature::new()
            .with_id("p1")
            .with_geometry(line_string![(x: 0.0, y: 50.0), (x: 40.0, y: 50.0)]),
    );

    let parcels = VectorLayer::new("parcels").with_feature(
        SimpleFeature::new().with_id("z1").with_geometry(polygon![
            (x: 60.0, y: 60.0),
            (x: 80.0, y: 60.0),
            (x: 80.0, y: 80.0),
            (x: 60.0, y: 80.0)
        ]),
    );

    Arc::new(
        HeadlessSurface::new()
            .with_layer(wells)
            .with_layer(pipes)
            .with_layer(parcels),
    )
}

/// Sorted ids of `features`
pub fn ids(features: &[FeatureRef]) -> Vec<String> {
    let mut ids: Vec<String> = features
        .iter()
        .filter_map(|feature| feature.id().map(str::to_owned))
        .collect();
    ids.sort();
    ids
}
