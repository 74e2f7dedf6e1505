use geo::{BoundingRect, Coord, MultiPolygon};
use rstar::{RTree, AABB};

use crate::bbox::BoundingBox;

/// Pre-filter producing the polygons that may contain a coordinate.
///
/// Implementations may return false positives (the exact predicate runs on
/// every candidate) but never false negatives: a polygon whose closed
/// boundary contains the coordinate must be among the candidates.
pub trait CandidateIndex: Sync {
    /// Clear `out` and fill it with candidate polygon indices.
    fn candidates(&self, coord: Coord<f64>, out: &mut Vec<usize>);
}

/// Every polygon is a candidate for every coordinate.
#[derive(Debug, Clone, Copy)]
pub struct BruteForce {
    len: usize,
}

impl BruteForce {
    pub fn new(shapes: &[MultiPolygon<f64>]) -> Self {
        Self { len: shapes.len() }
    }
}

impl CandidateIndex for BruteForce {
    fn candidates(&self, _coord: Coord<f64>, out: &mut Vec<usize>) {
        out.clear();
        out.extend(0..self.len);
    }
}

/// Bounding-box R-tree over polygons.
#[derive(Debug, Clone)]
pub struct RTreeIndex {
    rtree: RTree<BoundingBox>,
}

impl RTreeIndex {
    /// Bulk-load an R-tree from polygon bounding rectangles. Polygons without
    /// a bounding rectangle (no coordinates) are never candidates.
    pub fn new(shapes: &[MultiPolygon<f64>]) -> Self {
        Self {
            rtree: RTree::bulk_load(
                shapes.iter().enumerate()
                    .filter_map(|(i, shape)| shape.bounding_rect().map(|rect| BoundingBox::new(i, rect)))
                    .collect()
            ),
        }
    }

    /// Get the number of indexed polygons.
    #[inline] pub fn len(&self) -> usize { self.rtree.size() }

    /// Check if no polygons are indexed.
    #[inline] pub fn is_empty(&self) -> bool { self.rtree.size() == 0 }
}

impl CandidateIndex for RTreeIndex {
    fn candidates(&self, coord: Coord<f64>, out: &mut Vec<usize>) {
        out.clear();
        let envelope = AABB::from_point([coord.x, coord.y]);
        out.extend(self.rtree.locate_in_envelope_intersecting(&envelope).map(BoundingBox::idx));
        out.sort_unstable();
    }
}
