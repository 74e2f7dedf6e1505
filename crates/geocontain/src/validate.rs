//! Ring validation run before containment tests.
//!
//! A ring is rejected when containment against it would be undefined: it
//! has non-finite coordinates, fewer than three distinct vertices, zero
//! area, or two of its edges cross properly or overlap along a stretch of
//! positive length. Edges that only touch at a single point (a vertex
//! visited twice, or a vertex resting on another edge) are accepted: the
//! winding number still classifies every point against such a ring.

use ahash::AHashSet;
use geo::kernels::{Kernel, Orientation, RobustKernel};
use geo::{Coord, LineString, MultiPolygon};
use rstar::RTree;

use crate::bbox::BoundingBox;
use crate::error::{GeometryError, RingDefect};

/// Get the signed area of a closed coordinate list (shoelace).
fn signed_area(pts: &[Coord<f64>]) -> f64 {
    let mut a = 0.0;
    for w in pts.windows(2) {
        a += w[0].x * w[1].y - w[1].x * w[0].y;
    }
    a / 2.0
}

/// Open vertex list of a ring with consecutive duplicates (and the closing
/// vertex) removed.
fn open_vertices(ring: &LineString<f64>) -> Vec<Coord<f64>> {
    let mut verts: Vec<Coord<f64>> = Vec::with_capacity(ring.0.len());
    for &c in &ring.0 {
        if verts.last() != Some(&c) { verts.push(c) }
    }
    while verts.len() > 1 && verts.first() == verts.last() {
        verts.pop();
    }
    verts
}

/// Whether collinear segments `p1`-`p2` and `q1`-`q2` share more than a point.
fn collinear_overlap(p1: Coord<f64>, p2: Coord<f64>, q1: Coord<f64>, q2: Coord<f64>) -> bool {
    let along = |c: Coord<f64>| if (p2.x - p1.x).abs() >= (p2.y - p1.y).abs() { c.x } else { c.y };
    let (p_lo, p_hi) = (along(p1).min(along(p2)), along(p1).max(along(p2)));
    let (q_lo, q_hi) = (along(q1).min(along(q2)), along(q1).max(along(q2)));
    p_hi.min(q_hi) > p_lo.max(q_lo)
}

/// Whether segments `p1`-`p2` and `q1`-`q2` cross at an interior point of
/// both, or overlap along a stretch of positive length.
fn segments_cross(p1: Coord<f64>, p2: Coord<f64>, q1: Coord<f64>, q2: Coord<f64>) -> bool {
    let o1 = RobustKernel::orient2d(p1, p2, q1);
    let o2 = RobustKernel::orient2d(p1, p2, q2);
    let o3 = RobustKernel::orient2d(q1, q2, p1);
    let o4 = RobustKernel::orient2d(q1, q2, p2);

    if o1 == Orientation::Collinear && o2 == Orientation::Collinear {
        return collinear_overlap(p1, p2, q1, q2);
    }
    // A single collinear triple means an endpoint touches the other segment.
    [o1, o2, o3, o4].iter().all(|&o| o != Orientation::Collinear) && o1 != o2 && o3 != o4
}

/// Whether consecutive edges `a`-`b` and `b`-`c` fold back onto each other.
fn is_spike(a: Coord<f64>, b: Coord<f64>, c: Coord<f64>) -> bool {
    RobustKernel::orient2d(a, b, c) == Orientation::Collinear
        && (a.x - b.x) * (c.x - b.x) + (a.y - b.y) * (c.y - b.y) > 0.0
}

/// Validate a single ring.
pub fn validate_ring(ring: &LineString<f64>) -> Result<(), RingDefect> {
    if ring.0.iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
        return Err(RingDefect::NonFinite);
    }

    let verts = open_vertices(ring);
    let distinct = verts.iter()
        .map(|c| (c.x.to_bits(), c.y.to_bits()))
        .collect::<AHashSet<_>>()
        .len();
    if distinct < 3 { return Err(RingDefect::TooFewVertices(distinct)) }

    let mut closed = verts.clone();
    closed.push(verts[0]);
    if signed_area(&closed) == 0.0 { return Err(RingDefect::ZeroArea) }

    let k = verts.len();
    let edge = |i: usize| (verts[i], verts[(i + 1) % k]);

    for i in 0..k {
        let (a, b) = edge(i);
        let (_, c) = edge((i + 1) % k);
        if is_spike(a, b, c) {
            return Err(RingDefect::SelfIntersection(i, (i + 1) % k));
        }
    }

    let rtree = RTree::bulk_load(
        (0..k).map(|i| { let (a, b) = edge(i); BoundingBox::of_segment(i, a, b) }).collect()
    );

    for i in 0..k {
        let (a, b) = edge(i);
        let search = BoundingBox::of_segment(i, a, b).aabb();
        for cand in rtree.locate_in_envelope_intersecting(&search) {
            let j = cand.idx();
            if j <= i { continue }
            // Consecutive edges share a vertex by construction.
            if j == i + 1 || (i == 0 && j == k - 1) { continue }

            let (c, d) = edge(j);
            if segments_cross(a, b, c, d) {
                return Err(RingDefect::SelfIntersection(i, j));
            }
        }
    }

    Ok(())
}

/// Validate every ring of every polygon, reporting the first defect found.
pub fn validate_polygons(shapes: &[MultiPolygon<f64>]) -> Result<(), GeometryError> {
    for (polygon, shape) in shapes.iter().enumerate() {
        if shape.0.is_empty() {
            return Err(GeometryError::EmptyPolygon { polygon });
        }
        for (part, poly) in shape.0.iter().enumerate() {
            let rings = std::iter::once(poly.exterior()).chain(poly.interiors());
            for (ring, line_string) in rings.enumerate() {
                validate_ring(line_string)
                    .map_err(|defect| GeometryError::InvalidRing { polygon, part, ring, defect })?;
            }
        }
    }
    Ok(())
}
