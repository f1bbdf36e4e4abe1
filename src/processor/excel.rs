//! Keithley spreadsheet conversion.

use crate::container::Container;
use crate::error::Result;
use crate::models::DatasetSummary;
use crate::reshape::{Reshaped, reshape};
use crate::spreadsheet::{Workbook, sanitize_attribute_name};

use tracing::{debug, info};

/// Convert one spreadsheet export into the dataset `dataset_name`.
///
/// Returns `Ok(None)` when the export holds no data rows; such files are
/// produced by the newer Keithley firmware next to the real measurements.
pub fn convert_excel_file(
    bytes: Vec<u8>,
    file_name: &str,
    container: &mut Container,
    dataset_name: &str,
) -> Result<Option<DatasetSummary>> {
    let mut workbook = Workbook::from_bytes(file_name, bytes)?;
    let settings = workbook.settings()?;
    let Some(table) = workbook.data_table()? else {
        debug!("'{}' holds no data rows, skipping", file_name);
        return Ok(None);
    };

    let Reshaped {
        layout,
        data,
        fixed,
    } = reshape(&table).map_err(|e| e.in_file(file_name))?;

    debug!(
        "'{}': block {:?} repeated {} times, {} samples per column",
        file_name, layout.base_names, layout.number_of_blocks, layout.samples_per_column
    );

    let dataset = container.create_dataset(dataset_name, data)?;

    if let Some(fixed) = &fixed {
        fixed.write_attributes(&mut dataset.attributes);
    }

    for (key, value) in settings.text_entries() {
        dataset
            .attributes
            .set(sanitize_attribute_name(key), value.to_string());
    }

    info!(
        "Converted '{}' into dataset {} {:?}",
        file_name,
        dataset_name,
        dataset.data.shape()
    );

    Ok(Some(DatasetSummary {
        name: dataset_name.to_string(),
        shape: dataset.data.shape().to_vec(),
        fields: layout.base_names,
        fixed_column: fixed.map(|f| f.name),
    }))
}
