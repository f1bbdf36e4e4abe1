//! Integration tests for the processor module
//!
//! Builds real Keithley-style workbooks with rust_xlsxwriter, packs them
//! into ZIP archives and runs them through the conversion pipeline.

pub mod batch_conversion;

use rust_xlsxwriter::Workbook;
use std::io::{Cursor, Write};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// A Keithley export: data columns followed by the `START` block, plus settings
pub struct KeithleyExport<'a> {
    pub columns: Vec<(&'a str, Vec<f64>)>,
    pub settings: Vec<(&'a str, Vec<SettingCell<'a>>)>,
}

pub enum SettingCell<'a> {
    Text(&'a str),
    Number(f64),
}

impl<'a> KeithleyExport<'a> {
    pub fn new(columns: Vec<(&'a str, Vec<f64>)>) -> Self {
        Self {
            columns,
            settings: vec![
                ("Test Name", vec![SettingCell::Text("Id_vs_Vd")]),
                ("Number of Points", vec![SettingCell::Number(3.0)]),
            ],
        }
    }

    pub fn with_settings(mut self, settings: Vec<(&'a str, Vec<SettingCell<'a>>)>) -> Self {
        self.settings = settings;
        self
    }

    /// Workbook bytes with a data sheet first and a `Settings` sheet second
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut workbook = Workbook::new();

        let data = workbook.add_worksheet();
        data.set_name("Run1").unwrap();
        for (col, (label, values)) in self.columns.iter().enumerate() {
            let col = col as u16;
            data.write_string(0, col, *label).unwrap();
            for (row, value) in values.iter().enumerate() {
                data.write_number(row as u32 + 1, col, *value).unwrap();
            }
        }
        let marker = self.columns.len() as u16;
        data.write_string(0, marker, "START(1)").unwrap();
        data.write_string(1, marker, "instrument bookkeeping").unwrap();

        let settings = workbook.add_worksheet();
        settings.set_name("Settings").unwrap();
        let mut row = 0;
        for (label, cells) in &self.settings {
            settings.write_string(row, 0, *label).unwrap();
            for (col, cell) in cells.iter().enumerate() {
                let col = col as u16 + 1;
                match cell {
                    SettingCell::Text(text) => settings.write_string(row, col, *text).unwrap(),
                    SettingCell::Number(value) => {
                        settings.write_number(row, col, *value).unwrap()
                    }
                };
            }
            row += 1;
        }
        settings.write_string(row, 0, "Formulas").unwrap();
        settings.write_string(row + 1, 0, "After Formulas").unwrap();
        settings.write_string(row + 1, 1, "never read").unwrap();

        workbook.save_to_buffer().unwrap()
    }
}

/// A sweep with three repetitions of (GateV, DrainV, DrainI); GateV is stepped
pub fn idvd_sweep() -> KeithleyExport<'static> {
    KeithleyExport::new(vec![
        ("GateV(1)", vec![-1.0, -1.0, -1.0]),
        ("DrainV(1)", vec![0.0, 0.5, 1.0]),
        ("DrainI(1)", vec![0.0, 0.001, 0.002]),
        ("GateV(2)", vec![0.0, 0.0, 0.0]),
        ("DrainV(2)", vec![0.0, 0.5, 1.0]),
        ("DrainI(2)", vec![0.0, 0.002, 0.004]),
        ("GateV(3)", vec![1.0, 1.0, 1.0]),
        ("DrainV(3)", vec![0.0, 0.5, 1.0]),
        ("DrainI(3)", vec![0.0, 0.003, 0.006]),
    ])
}

/// An export with headers but no data rows
pub fn empty_export() -> KeithleyExport<'static> {
    KeithleyExport::new(vec![
        ("GateV(1)", vec![]),
        ("DrainV(1)", vec![]),
        ("DrainI(1)", vec![]),
    ])
}

/// ZIP archive bytes holding the given members in order
pub fn zip_archive(members: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, contents) in members {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(contents).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

/// A radiometer log with a header line and `rows` rows of 13 columns
pub fn text_log(rows: usize) -> String {
    let mut log = String::from(
        "# pctime phb record dem_Q1 dem_U1 dem_U2 dem_Q2 pwr_Q1 pwr_U1 pwr_U2 pwr_Q2 rfpower freq\n",
    );
    for row in 0..rows {
        log.push_str(&format!(
            "{:.3} {} {}  {} {} {} {}\t{} {} {} {} -{}.5 {}e9\n",
            1000.0 + row as f64 * 0.04,
            row % 2,
            row % 100,
            row,
            row + 1,
            row + 2,
            row + 3,
            row * 10,
            row * 10 + 1,
            row * 10 + 2,
            row * 10 + 3,
            row % 30,
            40 + row % 3
        ));
    }
    log
}
