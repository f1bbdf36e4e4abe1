//! Conversion entry points.
//!
//! Routes an input to the text ingester, the archive dispatcher or the
//! byte-for-byte passthrough based on its file extension, and writes the
//! resulting container as a dataset bundle.

pub mod archive;
pub mod batch;
pub mod discovery;
pub mod excel;
pub mod text;

#[cfg(test)]
pub mod tests;

pub use archive::{convert_zip_file, dataset_name_for};
pub use batch::BatchConverter;
pub use excel::convert_excel_file;
pub use text::convert_text_file;

use crate::config::ConverterConfig;
use crate::constants::{ARCHIVE_EXTENSION, PASSTHROUGH_EXTENSIONS, TEXT_EXTENSION};
use crate::container::{Container, bundle};
use crate::error::{ConversionError, Result};
use crate::models::ConversionOutcome;

use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// How an input file is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Archive,
    Passthrough,
}

impl InputKind {
    /// Classify a file by the (case-insensitive) extension of its base name
    pub fn from_file_name(file_name: &str) -> Result<Self> {
        let extension = Path::new(file_name)
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
            .unwrap_or_default();

        match extension.as_str() {
            TEXT_EXTENSION => Ok(InputKind::Text),
            ARCHIVE_EXTENSION => Ok(InputKind::Archive),
            ext if PASSTHROUGH_EXTENSIONS.contains(&ext) => Ok(InputKind::Passthrough),
            _ => Err(ConversionError::UnsupportedFormat { extension }),
        }
    }
}

/// Convert one data file and write the result to `output`.
///
/// `file_name` is only used to pick the conversion from its extension; it
/// does not need to name a real file. The whole input is read into memory
/// before conversion starts, and `output` is only replaced once the result
/// is complete.
pub fn convert_data_file<R: Read>(
    file_name: &str,
    mut input: R,
    output: &Path,
    config: &ConverterConfig,
) -> Result<ConversionOutcome> {
    let kind = InputKind::from_file_name(file_name)?;

    let mut bytes = Vec::new();
    input.read_to_end(&mut bytes)?;

    match kind {
        InputKind::Text => {
            debug!("file \"{}\" is a text file", file_name);
            let mut container = Container::new();
            let summary = text::convert_text_file(&bytes, &mut container)?;
            bundle::save(&container, output, config)?;
            Ok(ConversionOutcome::Text(summary))
        }
        InputKind::Archive => {
            debug!("file \"{}\" is a ZIP file", file_name);
            let mut container = Container::new();
            let report = archive::convert_zip_file(bytes, &mut container)?;
            bundle::save(&container, output, config)?;
            Ok(ConversionOutcome::Archive(report))
        }
        InputKind::Passthrough => {
            debug!(
                "file \"{}\" is already a container, no conversion is necessary",
                file_name
            );
            let written = copy_verbatim(&bytes, output)?;
            Ok(ConversionOutcome::Passthrough { bytes: written })
        }
    }
}

fn copy_verbatim(bytes: &[u8], output: &Path) -> Result<u64> {
    let directory = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut staging = NamedTempFile::new_in(directory)?;
    staging.write_all(bytes)?;
    staging.flush()?;
    staging
        .persist(output)
        .map_err(|e| ConversionError::Io(e.error))?;

    Ok(bytes.len() as u64)
}
