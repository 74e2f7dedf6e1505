use geo::{Coord, Rect};
use rstar::{RTreeObject, AABB};

/// A bounding box in an R-tree, associated with a polygon (or ring edge) by
/// index.
#[derive(Debug, Clone)]
pub struct BoundingBox {
    idx: usize,
    bbox: Rect<f64>,
}

impl BoundingBox {
    pub fn new(idx: usize, bbox: Rect<f64>) -> Self {
        Self { idx, bbox }
    }

    /// Bounding box of the segment from `a` to `b`.
    pub fn of_segment(idx: usize, a: Coord<f64>, b: Coord<f64>) -> Self {
        Self { idx, bbox: Rect::new(a, b) }
    }

    /// Get the index of the corresponding geometry.
    #[inline] pub fn idx(&self) -> usize { self.idx }

    /// Get a reference to the bounding rectangle.
    #[inline] pub fn bbox(&self) -> &Rect<f64> { &self.bbox }

    /// Get the R-tree envelope of this box.
    #[inline] pub fn aabb(&self) -> AABB<[f64; 2]> { self.envelope() }
}

impl RTreeObject for BoundingBox {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.bbox.min().into(), self.bbox.max().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::coord;

    #[test]
    fn segment_box_is_normalized() {
        let bbox = BoundingBox::of_segment(7, coord! { x: 3.0, y: -1.0 }, coord! { x: 1.0, y: 2.0 });
        assert_eq!(bbox.idx(), 7);
        assert_eq!(bbox.bbox().min(), coord! { x: 1.0, y: -1.0 });
        assert_eq!(bbox.bbox().max(), coord! { x: 3.0, y: 2.0 });
        assert_eq!(bbox.aabb().lower(), [1.0, -1.0]);
        assert_eq!(bbox.aabb().upper(), [3.0, 2.0]);
    }
}
