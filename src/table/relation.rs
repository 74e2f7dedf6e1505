use crate::error::{Error, Result};
use super::value::Value;

/// An ordered sequence of rows over an ordered list of named columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Relation {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Relation {
    /// Construct an empty relation with the given column names.
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Result<Self> {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        for (i, name) in columns.iter().enumerate() {
            if columns[..i].contains(name) {
                return Err(Error::Configuration(format!("duplicate column name {name:?}")));
            }
        }
        Ok(Self { columns, rows: Vec::new() })
    }

    /// Construct a relation from column names and rows, checking row widths.
    pub fn from_rows<S: Into<String>>(columns: impl IntoIterator<Item = S>, rows: Vec<Vec<Value>>) -> Result<Self> {
        let mut relation = Self::new(columns)?;
        relation.rows.reserve(rows.len());
        for row in rows { relation.push_row(row)? }
        Ok(relation)
    }

    /// A relation with `len` rows and no columns.
    pub fn with_len(len: usize) -> Self {
        Self { columns: Vec::new(), rows: vec![Vec::new(); len] }
    }

    /// Get the column names in order.
    #[inline] pub fn columns(&self) -> &[String] { &self.columns }

    /// Get the number of columns.
    #[inline] pub fn width(&self) -> usize { self.columns.len() }

    /// Get the number of rows.
    #[inline] pub fn len(&self) -> usize { self.rows.len() }

    /// Check if there are no rows.
    #[inline] pub fn is_empty(&self) -> bool { self.rows.is_empty() }

    /// Check if a column exists.
    #[inline] pub fn has_column(&self, name: &str) -> bool { self.columns.iter().any(|c| c == name) }

    /// Get the position of a column, or a configuration error naming it.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns.iter()
            .position(|c| c == name)
            .ok_or_else(|| Error::Configuration(format!(
                "no column named {name:?} (columns: {})", self.columns.join(", ")
            )))
    }

    /// Get a row by index.
    #[inline] pub fn row(&self, row: usize) -> &[Value] { &self.rows[row] }

    /// Iterate over rows in order.
    #[inline] pub fn rows(&self) -> impl Iterator<Item = &[Value]> + '_ { self.rows.iter().map(Vec::as_slice) }

    /// Get a single cell, if the row and column exist.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let col = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row).map(|r| &r[col])
    }

    /// Iterate over the values of one column.
    pub fn column_values(&self, name: &str) -> Result<impl Iterator<Item = &Value> + '_> {
        let col = self.column_index(name)?;
        Ok(self.rows.iter().map(move |row| &row[col]))
    }

    /// Append a row, which must have one value per column.
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.width() {
            return Err(Error::Configuration(format!(
                "row {} has {} values, expected {}", self.rows.len(), row.len(), self.width()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Rename a column.
    pub fn rename_column(&self, from: &str, to: &str) -> Result<Relation> {
        let col = self.column_index(from)?;
        if from != to && self.has_column(to) {
            return Err(Error::Configuration(format!("column {to:?} already exists")));
        }
        let mut out = self.clone();
        out.columns[col] = to.to_string();
        Ok(out)
    }

    /// Project onto the named columns, in the given order.
    pub fn select(&self, names: &[&str]) -> Result<Relation> {
        let cols = names.iter().map(|name| self.column_index(name)).collect::<Result<Vec<_>>>()?;
        Relation::from_rows(
            names.iter().copied(),
            self.rows.iter().map(|row| cols.iter().map(|&c| row[c].clone()).collect()).collect(),
        )
    }

    /// Keep the rows at `indices`, in that order.
    pub fn take(&self, indices: &[usize]) -> Relation {
        Relation {
            columns: self.columns.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
        }
    }

    /// Append a column with one value per row.
    pub fn with_column(&self, name: &str, values: Vec<Value>) -> Result<Relation> {
        if self.has_column(name) {
            return Err(Error::Configuration(format!("column {name:?} already exists")));
        }
        if values.len() != self.len() {
            return Err(Error::Configuration(format!(
                "column {name:?} has {} values, expected {}", values.len(), self.len()
            )));
        }
        let mut out = self.clone();
        out.columns.push(name.to_string());
        for (row, value) in out.rows.iter_mut().zip(values) { row.push(value) }
        Ok(out)
    }

    /// Replace the values of column `name`, or append it if absent.
    pub fn set_column(&self, name: &str, values: Vec<Value>) -> Result<Relation> {
        let Some(col) = self.columns.iter().position(|c| c == name) else {
            return self.with_column(name, values);
        };
        if values.len() != self.len() {
            return Err(Error::Configuration(format!(
                "column {name:?} has {} values, expected {}", values.len(), self.len()
            )));
        }
        let mut out = self.clone();
        for (row, value) in out.rows.iter_mut().zip(values) { row[col] = value }
        Ok(out)
    }

    /// Replace nulls in one column with `value`.
    pub fn fill_null(&self, column: &str, value: Value) -> Result<Relation> {
        let col = self.column_index(column)?;
        let mut out = self.clone();
        for row in out.rows.iter_mut().filter(|row| row[col].is_null()) {
            row[col] = value.clone();
        }
        Ok(out)
    }

    /// Number of null cells in one column.
    pub fn null_count(&self, column: &str) -> Result<usize> {
        Ok(self.column_values(column)?.filter(|v| v.is_null()).count())
    }
}
