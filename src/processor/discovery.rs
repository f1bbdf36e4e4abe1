//! Input discovery for batch conversion.
//!
//! Arguments may name files, directories (searched recursively for
//! supported extensions) or glob patterns.

use crate::constants::supported_extensions;
use crate::error::{ConversionError, Result};

use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .is_some_and(|ext| supported_extensions().any(|supported| supported == ext))
}

/// Supported files below a directory, sorted by path
pub fn discover_directory(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry?;
        if entry.file_type().is_file() && has_supported_extension(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    debug!("Found {} input files in {}", files.len(), root.display());
    Ok(files)
}

/// Expand command line inputs into a de-duplicated list of files.
///
/// Explicit file paths are kept whatever their extension, so unsupported
/// inputs are reported by the conversion instead of silently dropped.
pub fn discover_inputs<S: AsRef<str>>(inputs: &[S]) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = Vec::new();

    for input in inputs {
        let input = input.as_ref();
        let path = Path::new(input);

        if path.is_dir() {
            files.extend(discover_directory(path)?);
        } else if path.is_file() {
            files.push(path.to_path_buf());
        } else {
            let mut matched = 0;
            for entry in glob::glob(input)? {
                let entry = entry.map_err(|e| ConversionError::Io(e.into()))?;
                if entry.is_file() {
                    files.push(entry);
                    matched += 1;
                }
            }
            if matched == 0 {
                return Err(ConversionError::InputNotFound {
                    path: path.to_path_buf(),
                });
            }
        }
    }

    let mut seen = std::collections::HashSet::new();
    files.retain(|f| seen.insert(f.clone()));
    Ok(files)
}
