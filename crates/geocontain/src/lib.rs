//! Point-in-polygon intersection engine.
//!
//! Given a set of points and a set of (multi)polygons expressed in the same
//! planar coordinate reference system, [`intersects`] computes the sparse
//! [`IntersectionMatrix`] relating every point to the polygons that contain
//! it. [`clip`] and [`assign`] are the two derived views used by spatial
//! joins: the order-preserving subsequence of points inside any polygon, and
//! the per-point list of containing polygons.

pub mod bbox;
pub mod crs;
pub mod engine;
pub mod error;
pub mod index;
pub mod matrix;
pub mod predicate;
pub mod set;
pub mod validate;

pub use crs::Crs;
pub use engine::{assign, clip, intersects, intersects_with, IndexKind, IntersectOptions};
pub use error::{GeometryError, IntersectError, RingDefect};
pub use index::{BruteForce, CandidateIndex, RTreeIndex};
pub use matrix::{Assignment, IntersectionMatrix, MultiMatch, PolygonHits};
pub use predicate::{locate, BoundaryPolicy, Location};
pub use set::{PointSet, PolygonSet};
pub use validate::{validate_polygons, validate_ring};
