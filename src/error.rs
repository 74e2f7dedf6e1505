use geocontain::{GeometryError, IntersectError};
use thiserror::Error;

use crate::table::{Key, Value};

/// Errors raised by the join, aggregation and spatial operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Mismatched CRS, missing column, or an invalid option.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("geometry error: {0}")]
    Geometry(#[from] GeometryError),

    /// Key values of one relation with no counterpart in the other.
    #[error("{} key(s) in column {column:?} have no counterpart: {}", .keys.len(), display_keys(.keys))]
    KeyMismatch { column: String, keys: Vec<Key> },

    /// The right side of a join holds a key more than once.
    #[error("key {key} appears {count} times in column {column:?} of the right relation")]
    AmbiguousJoin { column: String, key: Key, count: usize },

    /// Summation over a non-numeric value.
    #[error("cannot sum column {column:?}: found non-numeric value {found:?}")]
    Type { column: String, found: Value },

    #[error("polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("projection error: {0}")]
    Projection(String),
}

impl From<IntersectError> for Error {
    fn from(err: IntersectError) -> Self {
        match err {
            IntersectError::Geometry(err) => Error::Geometry(err),
            err @ IntersectError::CrsMismatch { .. } => Error::Configuration(err.to_string()),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Render at most ten keys, quoted, for error messages.
fn display_keys(keys: &[Key]) -> String {
    const SHOWN: usize = 10;
    let mut out = keys.iter().take(SHOWN)
        .map(|key| format!("{key:?}"))
        .collect::<Vec<_>>()
        .join(", ");
    if keys.len() > SHOWN {
        out.push_str(&format!(", ... ({} more)", keys.len() - SHOWN));
    }
    out
}
