//! ZIP archive dispatch.
//!
//! Every spreadsheet member of an archive is matched against the ordered
//! pattern table and converted into its canonical dataset. Unmatched
//! members and members without data rows are skipped; any other failure
//! aborts the whole archive.

use super::excel::convert_excel_file;
use crate::constants::{DATASET_NAME_PATTERNS, EXCLUDED_SPREADSHEET_SUFFIX, SPREADSHEET_SUFFIX};
use crate::container::Container;
use crate::error::Result;
use crate::models::ArchiveReport;

use std::io::{Cursor, Read};
use tracing::debug;
use zip::ZipArchive;

/// Whether an archive member is a spreadsheet export worth opening
pub fn is_spreadsheet_member(name: &str) -> bool {
    name.ends_with(SPREADSHEET_SUFFIX) && !name.ends_with(EXCLUDED_SPREADSHEET_SUFFIX)
}

/// Canonical dataset for an archive member; the first matching pattern wins
pub fn dataset_name_for(member: &str) -> Option<&'static str> {
    DATASET_NAME_PATTERNS
        .iter()
        .find(|(pattern, _)| member.contains(pattern))
        .map(|(_, dataset)| *dataset)
}

/// Convert every recognised spreadsheet of a ZIP archive into `container`
pub fn convert_zip_file(bytes: Vec<u8>, container: &mut Container) -> Result<ArchiveReport> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut report = ArchiveReport::default();

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let member = entry.name().to_string();

        if entry.is_dir() || !is_spreadsheet_member(&member) {
            continue;
        }

        let Some(dataset_name) = dataset_name_for(&member) else {
            debug!("No dataset matches '{}', skipping", member);
            report.skipped_unmatched.push(member);
            continue;
        };

        // The declared size comes from the archive and is not trusted
        let mut contents = Vec::new();
        entry.read_to_end(&mut contents)?;
        drop(entry);

        match convert_excel_file(contents, &member, container, dataset_name)? {
            Some(summary) => report.datasets.push(summary),
            None => report.skipped_empty.push(member),
        }
    }

    debug!(
        "Archive converted: {} datasets, {} unmatched, {} empty",
        report.datasets.len(),
        report.skipped_unmatched.len(),
        report.skipped_empty.len()
    );

    Ok(report)
}
