//! GeoJoin public API.
//!
//! Counts points per polygon and joins tabular data onto polygons by name.
//! The point-in-polygon engine lives in the `geocontain` crate; this crate
//! adds attribute tables, layers, file formats, reprojection and the
//! command-line pipeline.

pub mod cli;
pub mod commands;
pub mod error;
pub mod io;
pub mod layer;
pub mod pipeline;
pub mod proj;
pub mod spatial;
pub mod table;

#[doc(inline)]
pub use error::{Error, Result};

#[doc(inline)]
pub use layer::{PointLayer, PolygonLayer};

#[doc(inline)]
pub use spatial::{assign, clip, clip_to_shapes, count_points, intersects, spatial_join, tally, SpatialOptions};

#[doc(inline)]
pub use table::{
    check_key_coverage, group_aggregate, left_join, reconcile_key, unmatched_keys,
    Aggregate, DuplicatePolicy, JoinOptions, Key, Relation, Value,
};

#[doc(inline)]
pub use geocontain::{Assignment, BoundaryPolicy, Crs, GeometryError, IntersectOptions, IntersectionMatrix, MultiMatch};
