use ahash::{AHashMap, AHashSet};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use super::{relation::Relation, value::{Key, Value}};

/// Rewrite every cell of `column` equal to an old label with its new label.
///
/// Each cell is rewritten at most once; mappings are not chained. Old labels
/// that occur nowhere in the column are reported with a warning, since they
/// usually indicate a typo in the correction itself.
pub fn reconcile_key<O, N>(
    relation: &Relation,
    column: &str,
    mapping: impl IntoIterator<Item = (O, N)>,
) -> Result<Relation>
where
    O: Into<Value>,
    N: Into<Value>,
{
    let col = relation.column_index(column)?;

    let mapping = mapping.into_iter()
        .map(|(old, new)| {
            let old = old.into();
            let key = old.key().ok_or_else(|| Error::Configuration(format!(
                "cannot reconcile {} label in column {column:?}", old.type_name()
            )))?;
            Ok((key, new.into()))
        })
        .collect::<Result<AHashMap<Key, Value>>>()?;

    let mut used = AHashSet::new();
    let rows = relation.rows()
        .map(|row| {
            let mut row = row.to_vec();
            if let Some((key, new)) = row[col].key().and_then(|key| mapping.get_key_value(&key)) {
                used.insert(key.clone());
                row[col] = new.clone();
            }
            row
        })
        .collect();

    for key in mapping.keys().filter(|key| !used.contains(*key)) {
        warn!(column, label = ?key, "reconciliation label not present in relation");
    }
    debug!(column, labels = mapping.len(), rewritten = used.len(), "reconciled key column");

    Relation::from_rows(relation.columns().iter().cloned(), rows)
}

/// Distinct keys of `source`'s `column` (in first-seen order) that do not
/// occur in `target`'s `column`. Null keys are ignored.
pub fn unmatched_keys(target: &Relation, source: &Relation, column: &str) -> Result<Vec<Key>> {
    let domain: AHashSet<Key> = target.column_values(column)?
        .filter_map(Value::key)
        .collect();

    let mut seen = AHashSet::new();
    Ok(source.column_values(column)?
        .filter_map(Value::key)
        .filter(|key| !domain.contains(key) && seen.insert(key.clone()))
        .collect())
}

/// Fail with [`Error::KeyMismatch`] unless every key of `source` has a
/// counterpart in `target`.
pub fn check_key_coverage(target: &Relation, source: &Relation, column: &str) -> Result<()> {
    let keys = unmatched_keys(target, source, column)?;
    if keys.is_empty() {
        Ok(())
    } else {
        Err(Error::KeyMismatch { column: column.to_string(), keys })
    }
}
