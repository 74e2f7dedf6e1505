//! Conversion between polars DataFrames and relations.

use polars::prelude::{Column, DataFrame, DataType};

use crate::error::Result;
use crate::table::{Relation, Value};

/// Convert a DataFrame into a relation, column by column.
///
/// Boolean, integer and float columns map to the matching [`Value`]
/// variants; every other type is rendered as text.
pub fn relation_from_frame(df: &DataFrame) -> Result<Relation> {
    let columns = df.get_columns().iter()
        .map(column_values)
        .collect::<Result<Vec<_>>>()?;

    let rows = (0..df.height())
        .map(|i| columns.iter().map(|values| values[i].clone()).collect())
        .collect();
    Relation::from_rows(df.get_columns().iter().map(|c| c.name().to_string()), rows)
}

fn column_values(column: &Column) -> Result<Vec<Value>> {
    let dtype = column.dtype();
    Ok(if dtype.is_bool() {
        column.bool()?.into_iter().map(Value::from).collect()
    } else if dtype.is_integer() {
        column.cast(&DataType::Int64)?.i64()?.into_iter().map(Value::from).collect()
    } else if dtype.is_float() {
        column.cast(&DataType::Float64)?.f64()?.into_iter().map(Value::from).collect()
    } else {
        column.cast(&DataType::String)?.str()?.into_iter().map(Value::from).collect()
    })
}

/// Column type wide enough for every non-null value seen so far.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Kind { Bool, Int, Float, Str }

impl Kind {
    fn of(value: &Value) -> Option<Kind> {
        match value {
            Value::Null => None,
            Value::Bool(_) => Some(Kind::Bool),
            Value::Int(_) => Some(Kind::Int),
            Value::Float(_) => Some(Kind::Float),
            Value::Str(_) => Some(Kind::Str),
        }
    }

    fn widen(self, other: Kind) -> Kind {
        match (self, other) {
            (a, b) if a == b => a,
            (Kind::Int, Kind::Float) | (Kind::Float, Kind::Int) => Kind::Float,
            _ => Kind::Str,
        }
    }
}

/// Convert a relation into a DataFrame, inferring one dtype per column.
///
/// Integer columns containing any float become float columns; any other mix
/// of types becomes a string column. All-null columns are strings.
pub fn relation_to_frame(relation: &Relation) -> Result<DataFrame> {
    let columns = relation.columns().iter().enumerate()
        .map(|(c, name)| {
            let values = || relation.rows().map(move |row| &row[c]);
            let kind = values().filter_map(Kind::of).reduce(Kind::widen);
            match kind {
                Some(Kind::Bool) => Column::new(name.as_str().into(), values()
                    .map(|v| match v { Value::Bool(b) => Some(*b), _ => None })
                    .collect::<Vec<_>>()),
                Some(Kind::Int) => Column::new(name.as_str().into(), values()
                    .map(|v| match v { Value::Int(i) => Some(*i), _ => None })
                    .collect::<Vec<_>>()),
                Some(Kind::Float) => Column::new(name.as_str().into(), values()
                    .map(Value::as_f64)
                    .collect::<Vec<_>>()),
                Some(Kind::Str) | None => Column::new(name.as_str().into(), values()
                    .map(|v| (!v.is_null()).then(|| v.to_string()))
                    .collect::<Vec<_>>()),
            }
        })
        .collect::<Vec<_>>();

    Ok(DataFrame::new(columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_types_are_inferred_and_restored() {
        let relation = Relation::from_rows(["name", "count", "rate", "mixed", "flag", "empty"], vec![
            vec!["Camden".into(), Value::Int(2), Value::Int(1), Value::Int(1), Value::Bool(true), Value::Null],
            vec!["Barnet".into(), Value::Null, Value::Float(0.5), "x".into(), Value::Null, Value::Null],
        ]).unwrap();

        let df = relation_to_frame(&relation).unwrap();
        let dtypes: Vec<_> = df.get_columns().iter().map(|c| c.dtype().clone()).collect();
        assert_eq!(dtypes, vec![
            DataType::String, DataType::Int64, DataType::Float64, DataType::String, DataType::Boolean, DataType::String,
        ]);

        let back = relation_from_frame(&df).unwrap();
        assert_eq!(back.columns(), relation.columns());
        assert_eq!(back.row(0), &[
            "Camden".into(), Value::Int(2), Value::Float(1.0), "1".into(), Value::Bool(true), Value::Null,
        ]);
        assert_eq!(back.row(1)[1], Value::Null);
    }
}
