//! Core data structures for instrument data conversion.
//!
//! Defines spreadsheet cells, the column table read from a worksheet, the
//! tagged settings values, and the statistics reported by conversions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A single spreadsheet cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(text) => text.is_empty(),
            _ => false,
        }
    }

    /// Numeric view of the cell; empty cells read as NaN, text has no value
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Empty => Some(f64::NAN),
            Cell::Number(value) => Some(*value),
            Cell::Bool(value) => Some(if *value { 1.0 } else { 0.0 }),
            Cell::Text(_) => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Number(value) => write!(f, "{:?}", value),
            Cell::Text(text) => f.write_str(text),
            Cell::Bool(value) => write!(f, "{}", u8::from(*value)),
        }
    }
}

/// One labelled column of numeric samples
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub label: String,
    pub values: Vec<f64>,
}

/// Ordered mapping from column label to numeric samples
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnTable {
    columns: Vec<Column>,
}

impl ColumnTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a column; an existing label keeps its position and gets the new values
    pub fn insert(&mut self, label: impl Into<String>, values: Vec<f64>) {
        let label = label.into();
        match self.columns.iter_mut().find(|c| c.label == label) {
            Some(column) => column.values = values,
            None => self.columns.push(Column { label, values }),
        }
    }

    pub fn get(&self, label: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|c| c.label == label)
            .map(|c| c.values.as_slice())
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.label.as_str())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Length of the longest column
    pub fn max_rows(&self) -> usize {
        self.columns.iter().map(|c| c.values.len()).max().unwrap_or(0)
    }
}

impl<L: Into<String>> FromIterator<(L, Vec<f64>)> for ColumnTable {
    fn from_iter<I: IntoIterator<Item = (L, Vec<f64>)>>(iter: I) -> Self {
        let mut table = ColumnTable::new();
        for (label, values) in iter {
            table.insert(label, values);
        }
        table
    }
}

/// Value of one row of the settings worksheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SettingValue {
    Number(f64),
    Text(String),
    List(Vec<Cell>),
}

impl SettingValue {
    /// Build a setting from the non-empty cells following its label
    pub fn from_cells(mut cells: Vec<Cell>) -> Self {
        if cells.len() == 1 {
            match cells.remove(0) {
                Cell::Text(text) => SettingValue::Text(text),
                Cell::Number(value) => SettingValue::Number(value),
                Cell::Bool(value) => SettingValue::Number(if value { 1.0 } else { 0.0 }),
                Cell::Empty => SettingValue::List(Vec::new()),
            }
        } else {
            SettingValue::List(cells)
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            SettingValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// Ordered mapping from setting name to value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    entries: Vec<(String, SettingValue)>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a setting; a repeated name replaces the earlier value in place
    pub fn insert(&mut self, name: impl Into<String>, value: SettingValue) {
        let name = name.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&SettingValue> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SettingValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Settings carrying a textual value, in table order
    pub fn text_entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter()
            .filter_map(|(key, value)| value.as_text().map(|text| (key, text)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Summary of one dataset written into a container
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSummary {
    pub name: String,
    pub shape: Vec<usize>,
    pub fields: Vec<String>,
    pub fixed_column: Option<String>,
}

/// Outcome of converting one ZIP archive
#[derive(Debug, Clone, Default)]
pub struct ArchiveReport {
    /// Datasets written, in archive order
    pub datasets: Vec<DatasetSummary>,
    /// Spreadsheet members whose name matched no dataset pattern
    pub skipped_unmatched: Vec<String>,
    /// Spreadsheet members holding no data rows
    pub skipped_empty: Vec<String>,
}

/// What a single conversion call did
#[derive(Debug, Clone)]
pub enum ConversionOutcome {
    /// A text log became one dataset
    Text(DatasetSummary),
    /// An archive became zero or more datasets
    Archive(ArchiveReport),
    /// The input was already a container and was copied
    Passthrough { bytes: u64 },
}

impl ConversionOutcome {
    pub fn dataset_count(&self) -> usize {
        match self {
            ConversionOutcome::Text(_) => 1,
            ConversionOutcome::Archive(report) => report.datasets.len(),
            ConversionOutcome::Passthrough { .. } => 0,
        }
    }
}

/// Statistics of a batch conversion
#[derive(Debug, Default)]
pub struct ConversionStats {
    pub files_converted: usize,
    pub files_failed: usize,
    pub files_skipped: usize,
    pub datasets_written: usize,
    pub outputs: Vec<PathBuf>,
    pub processing_time_ms: u128,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_table_keeps_first_position_on_reinsert() {
        let mut table = ColumnTable::new();
        table.insert("GateV(1)", vec![1.0]);
        table.insert("DrainI(1)", vec![2.0]);
        table.insert("GateV(1)", vec![3.0]);

        let labels: Vec<_> = table.labels().collect();
        assert_eq!(labels, vec!["GateV(1)", "DrainI(1)"]);
        assert_eq!(table.get("GateV(1)"), Some(&[3.0][..]));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_setting_value_from_cells() {
        assert_eq!(
            SettingValue::from_cells(vec![Cell::Text("Keithley".into())]),
            SettingValue::Text("Keithley".into())
        );
        assert_eq!(
            SettingValue::from_cells(vec![Cell::Number(2.5)]),
            SettingValue::Number(2.5)
        );
        assert_eq!(
            SettingValue::from_cells(vec![Cell::Number(1.0), Cell::Number(2.0)]),
            SettingValue::List(vec![Cell::Number(1.0), Cell::Number(2.0)])
        );
        assert_eq!(SettingValue::from_cells(vec![]), SettingValue::List(vec![]));
    }

    #[test]
    fn test_only_text_settings_are_exposed_as_text() {
        let mut settings = Settings::new();
        settings.insert("Test Name", SettingValue::Text("idvd".into()));
        settings.insert("Points", SettingValue::Number(11.0));
        settings.insert("Bias", SettingValue::List(vec![Cell::Number(0.1)]));

        let text: Vec<_> = settings.text_entries().collect();
        assert_eq!(text, vec![("Test Name", "idvd")]);
    }

    #[test]
    fn test_cell_display_matches_spreadsheet_text() {
        assert_eq!(Cell::Number(1.0).to_string(), "1.0");
        assert_eq!(Cell::Empty.to_string(), "");
        assert!(Cell::Text(String::new()).is_empty());
        assert!(Cell::Empty.as_number().unwrap().is_nan());
        assert_eq!(Cell::Text("x".into()).as_number(), None);
    }
}
