//! CSV reading operations.

use std::{fs, io::Cursor, path::Path, sync::Arc};

use anyhow::{Context, Result, ensure};
use polars::{frame::DataFrame, io::SerReader, prelude::{CsvEncoding, CsvReadOptions, CsvReader, DataType, Field, Schema}};
use tracing::debug;

use crate::io::frame::relation_from_frame;
use crate::table::Relation;

use super::{CsvOptions, Encoding};

/// Reads a CSV file from `path` into a relation.
pub fn read_relation(path: &Path, options: &CsvOptions) -> Result<Relation> {
    let df = read_csv(path, options)?;
    let relation = relation_from_frame(&df)
        .with_context(|| format!("[io::csv::read] Failed to convert CSV from {:?}", path))?;
    debug!(path = %path.display(), rows = relation.len(), columns = relation.width(), "read CSV");
    Ok(relation)
}

/// Reads a CSV file from `path` into a Polars DataFrame.
pub fn read_csv(path: &Path, options: &CsvOptions) -> Result<DataFrame> {
    let bytes = fs::read(path)
        .with_context(|| format!("[io::csv::read] Failed to open CSV file: {}", path.display()))?;
    read_csv_bytes(bytes, options)
        .with_context(|| format!("[io::csv::read] Failed to read CSV from {:?}", path))
}

/// Reads CSV bytes into a Polars DataFrame.
pub fn read_csv_bytes(bytes: Vec<u8>, options: &CsvOptions) -> Result<DataFrame> {
    ensure!(options.separator.is_ascii(), "[io::csv::read] Separator {:?} is not an ASCII character", options.separator);
    let separator = options.separator as u8;

    let (bytes, encoding) = match options.encoding {
        Encoding::Utf8 => (bytes, CsvEncoding::Utf8),
        Encoding::LossyUtf8 => (bytes, CsvEncoding::LossyUtf8),
        Encoding::Latin1 => (latin1_to_utf8(&bytes).into_bytes(), CsvEncoding::Utf8),
    };

    let mut read_options = CsvReadOptions::default()
        .with_has_header(options.has_header)
        .map_parse_options(|po| po.with_separator(separator).with_encoding(encoding));
    if !options.string_columns.is_empty() {
        let schema = Schema::from_iter(
            options.string_columns.iter().map(|name| Field::new(name.as_str().into(), DataType::String)),
        );
        read_options = read_options.with_schema_overwrite(Some(Arc::new(schema)));
    }

    CsvReader::new(Cursor::new(bytes))
        .with_options(read_options)
        .finish()
        .context("[io::csv::read] Failed to parse CSV")
}

/// Every ISO-8859-1 byte is the Unicode code point of the same value.
fn latin1_to_utf8(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Value;

    #[test]
    fn latin1_is_transcoded() {
        assert_eq!(latin1_to_utf8(b"Caf\xe9"), "Café");
        assert_eq!(latin1_to_utf8(b"plain"), "plain");
    }

    #[test]
    fn semicolon_separated_with_string_codes() {
        let options = CsvOptions {
            separator: ';',
            string_columns: vec!["code".into()],
            ..Default::default()
        };
        let df = read_csv_bytes(b"code;count\n007;3\n010;4\n".to_vec(), &options).unwrap();
        let relation = relation_from_frame(&df).unwrap();
        assert_eq!(relation.columns(), &["code", "count"]);
        assert_eq!(relation.row(0), &[Value::from("007"), Value::Int(3)]);
    }

    #[test]
    fn non_ascii_separator_is_rejected() {
        let options = CsvOptions { separator: '§', ..Default::default() };
        assert!(read_csv_bytes(b"a\n1\n".to_vec(), &options).is_err());
    }
}
