//! Error handling for instrument data conversion.
//!
//! Provides the error taxonomy shared by the text ingester, the spreadsheet
//! readers, the archive dispatcher and the dataset bundle writer.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Bundle manifest error: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("Unexpected format for '{file}': {reason}")]
    InvalidFormat { file: String, reason: String },

    #[error("the input file has {found} columns instead of {expected}")]
    ColumnCount { found: usize, expected: usize },

    #[error("extension \"{extension}\" not recognized")]
    UnsupportedFormat { extension: String },

    #[error("column \"{column}\" was not recognized")]
    UnknownColumnUnit { column: String },

    #[error("Dataset '{name}' already exists in the container")]
    DatasetExists { name: String },

    #[error("Worksheet '{name}' not found in workbook '{file}'")]
    MissingWorksheet { file: String, name: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error(
        "Output {} was already written from {}, not converting {}",
        output.display(),
        first.display(),
        second.display()
    )]
    OutputCollision {
        output: PathBuf,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("Input not found: {path}")]
    InputNotFound { path: PathBuf },

    #[error("Directory traversal error: {0}")]
    DirectoryTraversal(#[from] walkdir::Error),

    #[error("Invalid input pattern: {0}")]
    InvalidPattern(#[from] glob::PatternError),
}

impl ConversionError {
    /// Create an invalid-format error for the named source
    pub fn invalid_format(file: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFormat {
            file: file.into(),
            reason: reason.into(),
        }
    }

    /// Attach the name of the file being converted to a format error
    pub fn in_file(self, file: &str) -> Self {
        match self {
            Self::InvalidFormat { reason, .. } => Self::InvalidFormat {
                file: file.to_string(),
                reason,
            },
            other => other,
        }
    }

    /// True for every malformed-input condition (bad labels, column counts, empty tables)
    pub fn is_format_error(&self) -> bool {
        matches!(self, Self::InvalidFormat { .. } | Self::ColumnCount { .. })
    }
}

pub type Result<T> = std::result::Result<T, ConversionError>;
