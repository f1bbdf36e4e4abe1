//! Reader for the `Settings` worksheet and attribute key sanitizing.

use super::CellGrid;
use crate::constants::{ATTRIBUTE_KEY_MAX_LEN, ATTRIBUTE_KEY_STRIPPED, SETTINGS_END_MARKER};
use crate::models::{Cell, SettingValue, Settings};

/// Read `label, value, value, ...` rows until the `Formulas` row.
///
/// Rows with a blank label are skipped. Values stop at the first empty cell
/// of a row. A single value becomes a scalar setting, anything else a list.
pub fn read_worksheet_settings(grid: &CellGrid) -> Settings {
    let mut settings = Settings::new();

    for row in 0..grid.height() {
        let key = grid.cell(row, 0).to_string();
        if key.is_empty() {
            continue;
        }
        if key == SETTINGS_END_MARKER {
            break;
        }

        let values: Vec<Cell> = (1..grid.width())
            .map(|col| grid.cell(row, col))
            .take_while(|cell| !cell.is_empty())
            .cloned()
            .collect();

        settings.insert(key, SettingValue::from_cells(values));
    }

    settings
}

/// Turn a setting name into a dataset attribute key.
///
/// Uppercased, without spaces, `+`, `-` and parentheses, and clipped to
/// eight characters.
pub fn sanitize_attribute_name(name: &str) -> String {
    name.to_uppercase()
        .chars()
        .filter(|ch| !ATTRIBUTE_KEY_STRIPPED.contains(ch))
        .take(ATTRIBUTE_KEY_MAX_LEN)
        .collect()
}
