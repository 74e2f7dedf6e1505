//! CSV writing operations.

use std::{fs::File, path::Path};

use anyhow::{Context, Result};
use polars::{frame::DataFrame, io::SerWriter, prelude::CsvWriter};
use tracing::debug;

use crate::io::frame::relation_to_frame;
use crate::table::Relation;

/// Write a relation to a CSV file. Nulls are written as empty fields.
pub fn write_relation(relation: &Relation, path: &Path) -> Result<()> {
    let mut df = relation_to_frame(relation)
        .with_context(|| format!("[io::csv::write] Failed to convert relation for {:?}", path))?;
    write_csv(&mut df, path)?;
    debug!(path = %path.display(), rows = relation.len(), "wrote CSV");
    Ok(())
}

/// Write a DataFrame to a CSV file.
pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("[io::csv::write] Failed to create CSV file: {}", path.display()))?;
    CsvWriter::new(file)
        .finish(df)
        .with_context(|| format!("[io::csv::write] Failed to write CSV to {:?}", path))
}

/// Write a relation to a CSV string.
pub fn write_relation_string(relation: &Relation) -> Result<String> {
    let mut df = relation_to_frame(relation).context("[io::csv::write] Failed to convert relation")?;
    let mut buffer = Vec::new();
    CsvWriter::new(&mut buffer)
        .finish(&mut df)
        .context("[io::csv::write] Failed to write CSV to string")?;
    String::from_utf8(buffer)
        .context("[io::csv::write] CSV output is not valid UTF-8")
}
