//! Error types for maincode shortening.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while rewriting a CSV stream.
#[derive(Debug, Error)]
pub enum ShortenError {
    /// A data record does not reach the target column.
    #[error("line {line}: record has {fields} field(s), column {column} is out of range")]
    MissingColumn {
        line: u64,
        column: usize,
        fields: usize,
        record: String,
    },

    /// The target field is empty, so it has no first character.
    #[error("line {line}: column {column} is empty")]
    EmptyField {
        line: u64,
        column: usize,
        record: String,
    },

    /// The input has no header record.
    #[error("input is empty, expected a header row")]
    MissingHeader,

    /// The input file could not be opened.
    #[error("cannot open '{}': {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Malformed CSV or invalid UTF-8.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ShortenError {
    /// The offending record as a CSV line, for short-record failures.
    pub fn offending_record(&self) -> Option<&str> {
        match self {
            Self::MissingColumn { record, .. } | Self::EmptyField { record, .. } => Some(record),
            _ => None,
        }
    }
}
