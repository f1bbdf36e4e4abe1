//! Lab data converter library
//!
//! Converts laboratory instrument output into self-describing dataset
//! bundles.
//!
//! This library provides tools for:
//! - Reading Keithley spreadsheet exports (data table and settings sheet)
//! - Folding repeated column blocks into 2-D record arrays and detecting
//!   the stepped bias column
//! - Dispatching the members of a ZIP archive onto canonical dataset names
//! - Ingesting 13-column radiometer text logs with a synthesized time axis
//! - Writing and reading dataset bundles (Parquet datasets plus a JSON
//!   manifest in one ZIP file)

pub mod config;
pub mod constants;
pub mod container;
pub mod error;
pub mod models;
pub mod processor;
pub mod reshape;
pub mod spreadsheet;

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use config::{CompressionAlgorithm, ConverterConfig};
pub use container::{Container, Dataset, RecordArray};
pub use error::{ConversionError, Result};
pub use models::{ArchiveReport, ConversionOutcome, ConversionStats, DatasetSummary};
pub use processor::{BatchConverter, InputKind, convert_data_file};
