//! Keyed table join and aggregation over in-memory relations.

mod aggregate;
mod join;
mod reconcile;
mod relation;
mod value;

pub use aggregate::{group_aggregate, Aggregate};
pub use join::{left_join, DuplicatePolicy, JoinOptions};
pub use reconcile::{check_key_coverage, reconcile_key, unmatched_keys};
pub use relation::Relation;
pub use value::{Key, Value};
