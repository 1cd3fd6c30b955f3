use crate::core::{bounds::Bounds, geo::Point};

use rstar::{RTree, RTreeObject, AABB};

/// An entry in the R-tree: a key, its extent and a payload
#[derive(Debug, Clone)]
pub struct SpatialItem<T> {
    pub id: String,
    pub bounds: Bounds,
    pub data: T,
}

impl<T> SpatialItem<T> {
    pub fn new(id: impl Into<String>, bounds: Bounds, data: T) -> Self {
        Self {
            id: id.into(),
            bounds,
            data,
        }
    }
}

// --- rstar integration -------------------------------------------------------------------------

fn envelope_of(bounds: &Bounds) -> AABB<[f64; 2]> {
    AABB::from_corners([bounds.min.x, bounds.min.y], [bounds.max.x, bounds.max.y])
}

impl<T> RTreeObject for SpatialItem<T> {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        envelope_of(&self.bounds)
    }
}

/// R-tree over feature extents
pub struct SpatialIndex<T> {
    rtree: RTree<SpatialItem<T>>,
}

impl<T> std::fmt::Debug for SpatialIndex<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpatialIndex")
            .field("len", &self.rtree.size())
            .finish()
    }
}

impl<T> SpatialIndex<T> {
    pub fn new() -> Self {
        Self {
            rtree: RTree::new(),
        }
    }

    pub fn insert(&mut self, item: SpatialItem<T>) {
        self.rtree.insert(item);
    }

    /// Items whose extent intersects `bounds`
    pub fn query(&self, bounds: &Bounds) -> Vec<&SpatialItem<T>> {
        self.rtree
            .locate_in_envelope_intersecting(&envelope_of(bounds))
            .collect()
    }

    /// Items whose extent lies within `tolerance` of `point`
    pub fn query_point(&self, point: Point, tolerance: f64) -> Vec<&SpatialItem<T>> {
        self.query(&Bounds::around(point, tolerance.max(0.0)))
    }

    pub fn len(&self) -> usize {
        self.rtree.size()
    }
}

impl<T> Default for SpatialIndex<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point_item(id: &str, x: f64, y: f64, data: i32) -> SpatialItem<i32> {
        SpatialItem::new(id, Bounds::around(Point::new(x, y), 0.0), data)
    }

    #[test]
    fn test_query_point_with_tolerance() {
        let mut index = SpatialIndex::new();
        index.insert(point_item("a", 10.0, 10.0, 1));
        index.insert(SpatialItem::new(
            "b",
            Bounds::from_coords(0.0, 0.0, 4.0, 4.0),
            2,
        ));
        assert_eq!(index.len(), 2);

        let hits: Vec<i32> = index
            .query_point(Point::new(2.0, 2.0), 0.0)
            .iter()
            .map(|item| item.data)
            .collect();
        assert_eq!(hits, vec![2]);

        assert!(index.query_point(Point::new(12.0, 12.0), 1.0).is_empty());
        assert_eq!(index.query_point(Point::new(12.0, 12.0), 2.0).len(), 1);
    }

    #[test]
    fn test_negative_tolerance_is_exact() {
        let mut index = SpatialIndex::new();
        index.insert(point_item("a", 5.0, 5.0, 1));
        assert_eq!(index.query_point(Point::new(5.0, 5.0), -3.0).len(), 1);
        assert!(index.query_point(Point::new(5.5, 5.0), -3.0).is_empty());
    }
}
