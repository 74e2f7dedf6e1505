//! Exact point-in-polygon classification.
//!
//! Classification uses the winding number of each ring around the query
//! coordinate. Every orientation decision goes through the robust
//! `orient2d` predicate, so a given coordinate is classified identically on
//! every run and on every thread, including coordinates lying exactly on a
//! vertex or an edge.

use geo::kernels::{Kernel, Orientation, RobustKernel};
use geo::{Coord, LineString, MultiPolygon, Polygon};

/// Where a coordinate lies relative to a ring or polygon.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Location {
    Inside,
    Boundary,
    Outside,
}

/// How coordinates on a polygon boundary (outer ring or hole ring, edge or
/// vertex) are treated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BoundaryPolicy {
    /// Boundary coordinates count as contained.
    #[default]
    Inclusive,
    /// Only strictly interior coordinates count as contained.
    Exclusive,
}

impl BoundaryPolicy {
    /// Resolve a location to a containment decision.
    #[inline]
    pub fn contains(self, location: Location) -> bool {
        match location {
            Location::Inside => true,
            Location::Boundary => self == BoundaryPolicy::Inclusive,
            Location::Outside => false,
        }
    }
}

/// Whether `p` lies within the closed bounding box of segment `a`-`b`.
/// Only meaningful once `p` is known to be collinear with the segment.
#[inline]
fn within_span(p: Coord<f64>, a: Coord<f64>, b: Coord<f64>) -> bool {
    a.x.min(b.x) <= p.x && p.x <= a.x.max(b.x) && a.y.min(b.y) <= p.y && p.y <= a.y.max(b.y)
}

/// Classify `coord` against a single closed ring.
pub fn locate_in_ring(coord: Coord<f64>, ring: &LineString<f64>) -> Location {
    let mut winding: i64 = 0;

    for line in ring.lines() {
        let (a, b) = (line.start, line.end);
        if a == b { continue }

        let orientation = RobustKernel::orient2d(a, b, coord);
        if orientation == Orientation::Collinear && within_span(coord, a, b) {
            return Location::Boundary;
        }

        if a.y <= coord.y {
            // Upward crossing with the coordinate strictly left of the edge.
            if b.y > coord.y && orientation == Orientation::CounterClockwise {
                winding += 1;
            }
        } else if b.y <= coord.y && orientation == Orientation::Clockwise {
            // Downward crossing with the coordinate strictly right of the edge.
            winding -= 1;
        }
    }

    if winding != 0 { Location::Inside } else { Location::Outside }
}

/// Classify `coord` against a polygon: its exterior ring minus its holes.
/// A coordinate on a hole's boundary is on the polygon's boundary.
pub fn locate_in_polygon(coord: Coord<f64>, polygon: &Polygon<f64>) -> Location {
    match locate_in_ring(coord, polygon.exterior()) {
        Location::Inside => {},
        other => return other,
    }

    for hole in polygon.interiors() {
        match locate_in_ring(coord, hole) {
            Location::Inside => return Location::Outside,
            Location::Boundary => return Location::Boundary,
            Location::Outside => {},
        }
    }
    Location::Inside
}

/// Classify `coord` against a multipolygon. Interior of any part wins over
/// the boundary of another part.
pub fn locate(coord: Coord<f64>, shape: &MultiPolygon<f64>) -> Location {
    let mut location = Location::Outside;
    for polygon in &shape.0 {
        match locate_in_polygon(coord, polygon) {
            Location::Inside => return Location::Inside,
            Location::Boundary => location = Location::Boundary,
            Location::Outside => {},
        }
    }
    location
}
