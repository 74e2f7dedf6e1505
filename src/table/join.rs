use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use super::{reconcile::check_key_coverage, relation::Relation, value::{Key, Value}};

/// How [`left_join`] treats a key held by more than one right-side row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Fail with [`Error::AmbiguousJoin`] if any right-side key repeats.
    #[default]
    Error,
    /// Use the first matching right-side row.
    First,
    /// Emit one output row per matching right-side row.
    FanOut,
}

/// Options for [`left_join`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JoinOptions {
    pub duplicates: DuplicatePolicy,
    /// Fail with [`Error::KeyMismatch`] if a right-side key has no left-side
    /// counterpart. When off, such right rows are silently dropped.
    pub strict_keys: bool,
    /// Appended to right-side column names that collide with left-side
    /// names. Without a suffix, a collision is a configuration error.
    pub suffix: Option<String>,
}

impl Default for JoinOptions {
    fn default() -> Self {
        Self { duplicates: DuplicatePolicy::default(), strict_keys: true, suffix: None }
    }
}

/// Left outer join of `left` and `right` on the column `key`, present in
/// both. Output columns are the left columns followed by the right non-key
/// columns; left rows without a match get nulls. Left row order is kept.
pub fn left_join(left: &Relation, right: &Relation, key: &str, options: &JoinOptions) -> Result<Relation> {
    let left_key = left.column_index(key)?;
    let right_key = right.column_index(key)?;

    if options.strict_keys {
        check_key_coverage(left, right, key)?;
    }

    // Right-side rows per key, in first-seen key order.
    let mut order: Vec<Key> = Vec::new();
    let mut lookup: AHashMap<Key, Vec<usize>> = AHashMap::new();
    for (i, row) in right.rows().enumerate() {
        let Some(k) = row[right_key].key() else { continue };
        lookup.entry(k.clone())
            .or_insert_with(|| { order.push(k); Vec::new() })
            .push(i);
    }

    if options.duplicates == DuplicatePolicy::Error {
        if let Some((k, rows)) = order.iter().map(|k| (k, &lookup[k])).find(|(_, rows)| rows.len() > 1) {
            return Err(Error::AmbiguousJoin { column: key.to_string(), key: k.clone(), count: rows.len() });
        }
    }

    let right_cols: Vec<usize> = (0..right.width()).filter(|&c| c != right_key).collect();
    let mut columns: Vec<String> = left.columns().to_vec();
    for &c in &right_cols {
        let name = &right.columns()[c];
        if !left.has_column(name) {
            columns.push(name.clone());
            continue;
        }
        match &options.suffix {
            Some(suffix) => columns.push(format!("{name}{suffix}")),
            None => return Err(Error::Configuration(format!(
                "column {name:?} exists on both sides of the join; set a suffix to disambiguate"
            ))),
        }
    }

    let nulls = vec![Value::Null; right_cols.len()];
    let extend = |left_row: &[Value], right_row: Option<&[Value]>| -> Vec<Value> {
        let mut row = Vec::with_capacity(left_row.len() + right_cols.len());
        row.extend_from_slice(left_row);
        match right_row {
            Some(r) => row.extend(right_cols.iter().map(|&c| r[c].clone())),
            None => row.extend_from_slice(&nulls),
        }
        row
    };

    let mut rows = Vec::with_capacity(left.len());
    let mut unmatched = 0usize;
    for left_row in left.rows() {
        let matches = left_row[left_key].key().and_then(|k| lookup.get(&k));
        match (matches, options.duplicates) {
            (None, _) => {
                unmatched += 1;
                rows.push(extend(left_row, None));
            },
            (Some(matches), DuplicatePolicy::FanOut) => {
                rows.extend(matches.iter().map(|&i| extend(left_row, Some(right.row(i)))));
            },
            (Some(matches), _) => rows.push(extend(left_row, Some(right.row(matches[0])))),
        }
    }

    debug!(key, left = left.len(), right = right.len(), output = rows.len(), unmatched, "left join");
    Relation::from_rows(columns, rows)
}
