use thiserror::Error;

use crate::crs::Crs;

/// Errors raised by [`crate::intersects`] and its derived operations.
#[derive(Debug, Error)]
pub enum IntersectError {
    /// The point and polygon sets are not in the same reference system.
    #[error("coordinate reference systems differ: points are {points}, polygons are {polygons}")]
    CrsMismatch { points: Crs, polygons: Crs },

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// A polygon whose containment is undefined, or a containment result that
/// cannot be resolved under the requested policy.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("polygon {polygon} has no parts")]
    EmptyPolygon { polygon: usize },

    /// Ring `0` is the exterior of a part; rings `1..` are its holes.
    #[error("polygon {polygon}, part {part}, ring {ring}: {defect}")]
    InvalidRing { polygon: usize, part: usize, ring: usize, defect: RingDefect },

    #[error("point {point} lies in {} polygons: {polygons:?}", polygons.len())]
    AmbiguousContainment { point: usize, polygons: Vec<u32> },
}

/// Why a single ring was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RingDefect {
    #[error("non-finite coordinate")]
    NonFinite,

    #[error("only {0} distinct vertices (at least 3 required)")]
    TooFewVertices(usize),

    #[error("ring encloses zero area")]
    ZeroArea,

    #[error("edges {0} and {1} intersect")]
    SelfIntersection(usize, usize),
}
