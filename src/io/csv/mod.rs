//! CSV reading and writing for relations.

mod read;
mod write;

pub use read::*;
pub use write::*;

use serde::{Deserialize, Serialize};

/// Text encoding of a CSV file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    /// Strict UTF-8; invalid bytes are an error.
    #[default]
    Utf8,
    /// UTF-8 with invalid sequences replaced.
    LossyUtf8,
    /// ISO-8859-1, transcoded to UTF-8 before parsing.
    Latin1,
}

/// Options for reading a CSV file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvOptions {
    pub separator: char,
    pub has_header: bool,
    pub encoding: Encoding,
    /// Columns read as text regardless of their content, e.g. codes with
    /// leading zeros.
    pub string_columns: Vec<String>,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self { separator: ',', has_header: true, encoding: Encoding::default(), string_columns: Vec::new() }
    }
}
