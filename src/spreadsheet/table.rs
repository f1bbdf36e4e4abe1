//! Data table reader for the first worksheet of a Keithley export.

use super::CellGrid;
use crate::constants::DATA_TABLE_END_MARKER;
use crate::error::{ConversionError, Result};
use crate::models::ColumnTable;

/// Read the numeric columns left of the `START...` marker column.
///
/// Row 0 holds the labels, every following row is a sample. Empty cells
/// read as NaN. Returns `None` when no column holds a single data row:
/// the newer Keithley firmware writes such files next to the real ones,
/// under the same names.
pub fn read_worksheet_table(grid: &CellGrid, file: &str) -> Result<Option<ColumnTable>> {
    let width = (0..grid.width())
        .position(|col| grid.cell(0, col).to_string().starts_with(DATA_TABLE_END_MARKER))
        .unwrap_or(grid.width());

    // Bookkeeping columns right of the marker may run longer than the data
    let height = (1..grid.height())
        .rev()
        .find(|&row| (0..width).any(|col| !grid.cell(row, col).is_empty()))
        .map_or(1, |row| row + 1);

    let mut table = ColumnTable::new();
    for col in 0..width {
        let label = grid.cell(0, col).to_string();
        let values = (1..height)
            .map(|row| {
                let cell = grid.cell(row, col);
                if cell.is_empty() {
                    return Ok(f64::NAN);
                }
                cell.as_number().ok_or_else(|| {
                    ConversionError::invalid_format(
                        file,
                        format!(
                            "non-numeric value \"{}\" in column \"{}\", row {}",
                            cell,
                            label,
                            row + 1
                        ),
                    )
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        table.insert(label, values);
    }

    if table.max_rows() == 0 {
        Ok(None)
    } else {
        Ok(Some(table))
    }
}
