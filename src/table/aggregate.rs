use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use super::{relation::Relation, value::{Key, Value}};

/// Reduction applied to each group by [`group_aggregate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregate {
    /// Sum of the non-null values; non-numeric values are a type error.
    Sum,
    /// Number of rows in the group, whatever their values.
    Count,
}

/// Running sum that stays integral until a float is seen.
#[derive(Clone, Copy, Debug)]
enum Accumulator {
    Int(i128),
    Float(f64),
}

impl Accumulator {
    fn add(self, value: &Value) -> Option<Self> {
        Some(match (self, value) {
            (acc, Value::Null) => acc,
            (Accumulator::Int(a), Value::Int(b)) => Accumulator::Int(a + i128::from(*b)),
            (Accumulator::Int(a), Value::Float(b)) => Accumulator::Float(a as f64 + b),
            (Accumulator::Float(a), Value::Int(b)) => Accumulator::Float(a + *b as f64),
            (Accumulator::Float(a), Value::Float(b)) => Accumulator::Float(a + b),
            _ => return None,
        })
    }

    fn finish(self) -> Value {
        match self {
            Accumulator::Int(i) => i64::try_from(i).map_or(Value::Float(i as f64), Value::Int),
            Accumulator::Float(f) => Value::Float(f),
        }
    }
}

impl Aggregate {
    /// Lowercase name, as used in configs.
    pub fn name(self) -> &'static str {
        match self {
            Aggregate::Sum => "sum",
            Aggregate::Count => "count",
        }
    }
}

/// Partition rows by `group_by`, reduce `value_column` within each
/// partition, and emit one `[group_by, value_column]` row per distinct key
/// in first-seen order. Rows with a null group key form their own group.
///
/// A column may be aggregated by itself (counting rows per name, say); the
/// result column is then named `{value_column}_{func}`, e.g. `name_count`.
pub fn group_aggregate(relation: &Relation, group_by: &str, value_column: &str, func: Aggregate) -> Result<Relation> {
    let key_col = relation.column_index(group_by)?;
    let value_col = relation.column_index(value_column)?;
    let output_column = if key_col == value_col {
        format!("{value_column}_{}", func.name())
    } else {
        value_column.to_string()
    };

    // Group representatives, row counts and sums, in first-seen order.
    let mut groups: Vec<(Value, usize, Accumulator)> = Vec::new();
    let mut lookup: AHashMap<Option<Key>, usize> = AHashMap::new();

    for row in relation.rows() {
        let group = *lookup.entry(row[key_col].key())
            .or_insert_with(|| {
                groups.push((row[key_col].clone(), 0, Accumulator::Int(0)));
                groups.len() - 1
            });

        let (_, count, sum) = &mut groups[group];
        *count += 1;
        if func == Aggregate::Sum {
            *sum = sum.add(&row[value_col]).ok_or_else(|| Error::Type {
                column: value_column.to_string(),
                found: row[value_col].clone(),
            })?;
        }
    }

    debug!(group_by, value_column, ?func, rows = relation.len(), groups = groups.len(), "grouped aggregate");
    Relation::from_rows(
        [group_by, output_column.as_str()],
        groups.into_iter()
            .map(|(key, count, sum)| match func {
                Aggregate::Sum => vec![key, sum.finish()],
                Aggregate::Count => vec![key, Value::Int(count as i64)],
            })
            .collect(),
    )
}
