//! Measurement units of Keithley data columns.

use crate::error::{ConversionError, Result};

const COLUMN_UNITS: &[(&str, &str)] = &[
    ("DrainI", "A"),
    ("GateI", "A"),
    ("AnodeI", "A"),
    ("BaseI", "A"),
    ("EmitterI", "A"),
    ("DrainV", "V"),
    ("GateV", "V"),
    ("AnodeV", "V"),
    ("BaseV", "V"),
    ("EmitterV", "V"),
];

/// Unit of a column, inferred from the quantity named in its label
pub fn unit_for_column(name: &str) -> Result<&'static str> {
    COLUMN_UNITS
        .iter()
        .find(|(quantity, _)| name.contains(quantity))
        .map(|(_, unit)| *unit)
        .ok_or_else(|| ConversionError::UnknownColumnUnit {
            column: name.to_string(),
        })
}
