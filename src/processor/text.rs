//! Radiometer text log ingestion.
//!
//! A log is one header line followed by rows of 13 whitespace-separated
//! numbers. The acquisition clock column is not trusted: the dataset gets a
//! synthesized `time_s` column at the nominal sampling frequency instead.

use crate::constants::{
    SAMPLING_FREQUENCY, TEXT_COLUMN_NAMES, TEXT_DATASET_NAME, TEXT_HEADER_LINES,
    TEXT_INT8_COLUMNS, TEXT_TIME_COLUMN,
};
use crate::container::{Container, Field, FieldData, RecordArray};
use crate::error::{ConversionError, Result};
use crate::models::DatasetSummary;

use std::io::{BufRead, Cursor, ErrorKind};
use tracing::debug;

const FILE_LABEL: &str = "text log";

/// Parse the rows of a text log into one vector per column
fn read_text_columns(bytes: &[u8]) -> Result<Vec<Vec<f64>>> {
    let expected = TEXT_COLUMN_NAMES.len();
    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); expected];

    for (line_num, line) in Cursor::new(bytes)
        .lines()
        .enumerate()
        .skip(TEXT_HEADER_LINES)
    {
        let line = line.map_err(|e| match e.kind() {
            ErrorKind::InvalidData => ConversionError::invalid_format(
                FILE_LABEL,
                format!("line {} is not valid UTF-8", line_num + 1),
            ),
            _ => ConversionError::Io(e),
        })?;
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != expected {
            return Err(ConversionError::ColumnCount {
                found: fields.len(),
                expected,
            });
        }

        for (column, field) in columns.iter_mut().zip(&fields) {
            let value = field.parse::<f64>().map_err(|_| {
                ConversionError::invalid_format(
                    FILE_LABEL,
                    format!("invalid number \"{}\" on line {}", field, line_num + 1),
                )
            })?;
            column.push(value);
        }
    }

    Ok(columns)
}

/// Convert a text log into the `time_series` dataset of `container`
pub fn convert_text_file(bytes: &[u8], container: &mut Container) -> Result<DatasetSummary> {
    debug!("going to load the text file");
    let columns = read_text_columns(bytes)?;
    let rows = columns.first().map_or(0, Vec::len);
    debug!("text file read successfully: {} rows", rows);

    let time: Vec<f32> = (0..rows)
        .map(|index| (index as f64 / SAMPLING_FREQUENCY) as f32)
        .collect();

    let mut fields = Vec::with_capacity(columns.len() + 1);
    fields.push(Field {
        name: TEXT_TIME_COLUMN.to_string(),
        data: FieldData::Float32(time),
    });

    for (name, values) in TEXT_COLUMN_NAMES.iter().zip(columns) {
        let data = if TEXT_INT8_COLUMNS.contains(name) {
            FieldData::Int8(values.into_iter().map(|v| v as i8).collect())
        } else {
            FieldData::Float32(values.into_iter().map(|v| v as f32).collect())
        };
        fields.push(Field {
            name: name.to_string(),
            data,
        });
    }

    let data = RecordArray::from_fields(vec![rows], fields)?;
    let summary = DatasetSummary {
        name: TEXT_DATASET_NAME.to_string(),
        shape: data.shape().to_vec(),
        fields: data.field_names().map(str::to_string).collect(),
        fixed_column: None,
    };

    container.create_dataset(TEXT_DATASET_NAME, data)?;
    debug!("columns have been written in the container");

    Ok(summary)
}
