//! Keithley spreadsheet access.
//!
//! Workbooks are opened from memory with calamine (format detected from the
//! content, so legacy `.xls` and newer `.xlsx` exports both work) and each
//! worksheet is copied into a dense [`CellGrid`] anchored at `A1`. The table
//! and settings readers only ever see the grid.

pub mod settings;
pub mod table;
pub mod units;

pub use settings::{read_worksheet_settings, sanitize_attribute_name};
pub use table::read_worksheet_table;
pub use units::unit_for_column;

use crate::constants::SETTINGS_SHEET_NAME;
use crate::error::{ConversionError, Result};
use crate::models::{Cell, ColumnTable, Settings};

use calamine::{Data, Range, Reader, Sheets, open_workbook_auto_from_rs};
use std::io::Cursor;
use tracing::debug;

static EMPTY: Cell = Cell::Empty;

/// Dense, zero-anchored copy of a worksheet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellGrid {
    rows: Vec<Vec<Cell>>,
    width: usize,
}

impl CellGrid {
    /// Build a grid from rows of cells; short rows are padded with empty cells
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Cell::Empty);
                row
            })
            .collect();
        Self { rows, width }
    }

    fn from_range(range: &Range<Data>) -> Self {
        let (Some((start_row, start_col)), Some((end_row, end_col))) =
            (range.start(), range.end())
        else {
            return Self::default();
        };

        let height = end_row as usize + 1;
        let width = end_col as usize + 1;
        let mut rows = vec![vec![Cell::Empty; width]; height];
        for (row, col, value) in range.used_cells() {
            rows[start_row as usize + row][start_col as usize + col] = cell_from_data(value);
        }
        Self { rows, width }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Cell at `(row, col)`; positions outside the grid read as empty
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::Float(value) => Cell::Number(*value),
        Data::Int(value) => Cell::Number(*value as f64),
        Data::Bool(value) => Cell::Bool(*value),
        Data::String(text) => Cell::Text(text.clone()),
        Data::DateTime(value) => Cell::Number(value.as_f64()),
        other => Cell::Text(other.to_string()),
    }
}

/// An in-memory workbook
pub struct Workbook {
    name: String,
    sheets: Sheets<Cursor<Vec<u8>>>,
}

impl Workbook {
    /// Open a workbook from its raw bytes; `name` is only used in messages
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        let name = name.into();
        let sheets = open_workbook_auto_from_rs(Cursor::new(bytes))?;
        debug!("Opened workbook '{}' with sheets {:?}", name, sheets.sheet_names());
        Ok(Self { name, sheets })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.sheet_names()
    }

    /// The first worksheet, which holds the data table
    pub fn first_sheet(&mut self) -> Result<CellGrid> {
        match self.sheets.worksheet_range_at(0) {
            Some(range) => Ok(CellGrid::from_range(&range?)),
            None => Err(ConversionError::invalid_format(
                &self.name,
                "workbook has no worksheets",
            )),
        }
    }

    /// A worksheet looked up by its exact name
    pub fn sheet(&mut self, sheet_name: &str) -> Result<CellGrid> {
        if !self.sheet_names().iter().any(|n| n == sheet_name) {
            return Err(ConversionError::MissingWorksheet {
                file: self.name.clone(),
                name: sheet_name.to_string(),
            });
        }
        let range = self.sheets.worksheet_range(sheet_name)?;
        Ok(CellGrid::from_range(&range))
    }

    /// Settings from the `Settings` worksheet
    pub fn settings(&mut self) -> Result<Settings> {
        let grid = self.sheet(SETTINGS_SHEET_NAME)?;
        Ok(read_worksheet_settings(&grid))
    }

    /// Data table from the first worksheet; `None` when it holds no rows
    pub fn data_table(&mut self) -> Result<Option<ColumnTable>> {
        let grid = self.first_sheet()?;
        read_worksheet_table(&grid, &self.name)
    }
}
