//! Block-structure inference and reshaping of Keithley data tables.
//!
//! A Keithley export spells out one column family per sweep repetition:
//!
//! ```text
//! GateI(1) GateV(1) DrainI(1)  GateI(2) GateV(2) DrainI(2)  ...
//! ```
//!
//! The tuple `(GateI, GateV, DrainI)` is a *block*. [`reshape`] discovers
//! the block from the column labels and folds the flat table into a 2-D
//! record array of shape `(samples, blocks)` with one `f32` field per base
//! name. It also flags the first column that stays constant within a
//! repetition (the "fixed" column, usually the stepped bias).

use crate::constants::{BASE_NAME_PATTERN, FIXED_COLUMN_TOLERANCE, attributes};
use crate::container::{Attributes, FieldData, FieldType, RecordArray};
use crate::error::{ConversionError, Result};
use crate::models::ColumnTable;

use regex::Regex;
use std::sync::LazyLock;

static BASE_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(BASE_NAME_PATTERN).expect("base name pattern is a valid regex")
});

/// Leading alphabetic prefix of a column label (`"DrainV(2)"` -> `"DrainV"`)
pub fn base_name(label: &str) -> Option<&str> {
    BASE_NAME_RE.find(label).map(|m| m.as_str())
}

/// Repeating group of base names and how often it repeats
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockLayout {
    pub base_names: Vec<String>,
    pub samples_per_column: usize,
    pub number_of_blocks: usize,
}

impl BlockLayout {
    /// Infer the block from the labels of a column table
    pub fn infer(columns: &ColumnTable) -> Result<Self> {
        let first = columns
            .columns()
            .first()
            .ok_or_else(|| ConversionError::invalid_format("data table", "no columns of data"))?;
        let samples_per_column = first.values.len();

        let mut base_names: Vec<String> = Vec::new();
        for label in columns.labels() {
            let name = base_name(label).ok_or_else(|| {
                ConversionError::invalid_format(
                    "data table",
                    format!("unable to understand column \"{}\"", label),
                )
            })?;
            if base_names.iter().any(|n| n == name) {
                // e.g. "DrainI(2)" after "DrainI(1)": the first block is complete
                break;
            }
            base_names.push(name.to_string());
        }

        if columns.len() % base_names.len() != 0 {
            return Err(ConversionError::invalid_format(
                "data table",
                format!(
                    "{} data columns cannot be split into blocks of {} ({})",
                    columns.len(),
                    base_names.len(),
                    base_names.join(", ")
                ),
            ));
        }

        Ok(Self {
            number_of_blocks: columns.len() / base_names.len(),
            base_names,
            samples_per_column,
        })
    }

    /// Label of the source column holding `base` for the given 0-based block
    pub fn column_label(&self, base: &str, block: usize) -> String {
        if self.number_of_blocks > 1 {
            format!("{}({})", base, block + 1)
        } else {
            base.to_string()
        }
    }

    pub fn shape(&self) -> Vec<usize> {
        vec![self.samples_per_column, self.number_of_blocks]
    }
}

/// Summary of the column that does not vary within a repetition
#[derive(Debug, Clone, PartialEq)]
pub struct FixedColumnSummary {
    pub name: String,
    pub min: f64,
    pub max: f64,
    pub delta: f64,
}

impl FixedColumnSummary {
    /// Store the summary as dataset attributes
    pub fn write_attributes(&self, attrs: &mut Attributes) {
        attrs.set(attributes::FIXED_VALUE, self.name.as_str());
        attrs.set(attributes::FIXED_MIN, self.min);
        attrs.set(attributes::FIXED_MAX, self.max);
        attrs.set(attributes::FIXED_DELTA, self.delta);
    }
}

/// Fold over repetitions that locks onto the first constant column.
///
/// While `Searching`, every repetition is tested; the first one whose spread
/// is below tolerance locks the tracker onto its base name. Once locked, only
/// that base name is looked at, and only its first sample is used.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FixedColumnTracker {
    #[default]
    Searching,
    LockedOn { name: String, min: f64, max: f64 },
}

impl FixedColumnTracker {
    pub fn observe(&mut self, name: &str, values: &[f64]) {
        match self {
            FixedColumnTracker::Searching => {
                if is_constant(values) {
                    *self = FixedColumnTracker::LockedOn {
                        name: name.to_string(),
                        min: values[0],
                        max: values[0],
                    };
                }
            }
            FixedColumnTracker::LockedOn {
                name: locked,
                min,
                max,
            } => {
                if locked.as_str() == name {
                    if let Some(&first) = values.first() {
                        *min = min.min(first);
                        *max = max.max(first);
                    }
                }
            }
        }
    }

    pub fn finish(self, number_of_blocks: usize) -> Option<FixedColumnSummary> {
        match self {
            FixedColumnTracker::Searching => None,
            FixedColumnTracker::LockedOn { name, min, max } => Some(FixedColumnSummary {
                name,
                min,
                max,
                delta: (max - min) / number_of_blocks as f64,
            }),
        }
    }
}

fn is_constant(values: &[f64]) -> bool {
    if values.is_empty() || values.iter().any(|v| v.is_nan()) {
        return false;
    }
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    max - min < FIXED_COLUMN_TOLERANCE
}

/// Result of reshaping a column table
#[derive(Debug, Clone, PartialEq)]
pub struct Reshaped {
    pub layout: BlockLayout,
    pub data: RecordArray,
    pub fixed: Option<FixedColumnSummary>,
}

/// Fold a flat column table into a `(samples, blocks)` record array
pub fn reshape(columns: &ColumnTable) -> Result<Reshaped> {
    let layout = BlockLayout::infer(columns)?;
    let field_layout: Vec<(String, FieldType)> = layout
        .base_names
        .iter()
        .map(|name| (name.clone(), FieldType::Float32))
        .collect();
    let mut data = RecordArray::zeroed(layout.shape(), &field_layout);

    let samples = layout.samples_per_column;
    let blocks = layout.number_of_blocks;
    let mut tracker = FixedColumnTracker::default();

    for block in 0..blocks {
        for name in &layout.base_names {
            let label = layout.column_label(name, block);
            let values = columns.get(&label).ok_or_else(|| {
                ConversionError::invalid_format(
                    "data table",
                    format!("missing column \"{}\" for block {}", label, block + 1),
                )
            })?;
            if values.len() != samples {
                return Err(ConversionError::invalid_format(
                    "data table",
                    format!(
                        "column \"{}\" has {} samples instead of {}",
                        label,
                        values.len(),
                        samples
                    ),
                ));
            }

            if let Some(FieldData::Float32(target)) = data.field_mut(name) {
                for (sample, &value) in values.iter().enumerate() {
                    target[sample * blocks + block] = value as f32;
                }
            }

            tracker.observe(name, values);
        }
    }

    Ok(Reshaped {
        fixed: tracker.finish(blocks),
        layout,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[(&str, &[f64])]) -> ColumnTable {
        columns
            .iter()
            .map(|(label, values)| (*label, values.to_vec()))
            .collect()
    }

    #[test]
    fn test_base_name_extraction() {
        assert_eq!(base_name("DrainV(2)"), Some("DrainV"));
        assert_eq!(base_name("GateI"), Some("GateI"));
        assert_eq!(base_name("(1)GateI"), None);
        assert_eq!(base_name("1V"), None);
    }

    #[test]
    fn test_multi_block_reshape() {
        let columns = table(&[
            ("GateV(1)", &[1.0, 1.0, 1.0]),
            ("DrainV(1)", &[0.0, 0.5, 1.0]),
            ("DrainI(1)", &[0.0, 0.1, 0.2]),
            ("GateV(2)", &[2.0, 2.0, 2.0]),
            ("DrainV(2)", &[0.0, 0.5, 1.0]),
            ("DrainI(2)", &[0.0, 0.3, 0.6]),
        ]);

        let reshaped = reshape(&columns).unwrap();
        assert_eq!(reshaped.layout.base_names, vec!["GateV", "DrainV", "DrainI"]);
        assert_eq!(reshaped.data.shape(), &[3, 2]);

        for block in 0..2 {
            for sample in 0..3 {
                for name in ["GateV", "DrainV", "DrainI"] {
                    let label = format!("{}({})", name, block + 1);
                    let expected = columns.get(&label).unwrap()[sample] as f32;
                    assert_eq!(
                        reshaped.data.get_f32(name, &[sample, block]),
                        Some(expected)
                    );
                }
            }
        }
    }

    #[test]
    fn test_single_block_uses_bare_labels() {
        let columns = table(&[("AnodeV", &[0.0, 0.25]), ("AnodeI", &[0.5, 0.75])]);

        let reshaped = reshape(&columns).unwrap();
        assert_eq!(reshaped.layout.number_of_blocks, 1);
        assert_eq!(reshaped.data.shape(), &[2, 1]);
        assert_eq!(reshaped.data.get_f32("AnodeV", &[1, 0]), Some(0.25));
        assert_eq!(reshaped.data.get_f32("AnodeI", &[0, 0]), Some(0.5));
    }

    #[test]
    fn test_uneven_column_count_is_format_error() {
        let columns = table(&[
            ("GateV(1)", &[1.0]),
            ("DrainI(1)", &[0.1]),
            ("GateV(2)", &[2.0]),
        ]);

        let err = reshape(&columns).unwrap_err();
        assert!(err.is_format_error());
    }

    #[test]
    fn test_empty_table_is_format_error() {
        let err = reshape(&ColumnTable::new()).unwrap_err();
        assert!(err.is_format_error());
    }

    #[test]
    fn test_unrecognized_label_is_format_error() {
        let columns = table(&[("GateV(1)", &[1.0]), ("#comment", &[0.0])]);
        let err = reshape(&columns).unwrap_err();
        assert!(err.is_format_error());
        assert!(err.to_string().contains("#comment"));
    }

    #[test]
    fn test_missing_repetition_column_is_format_error() {
        let columns = table(&[
            ("GateV(1)", &[1.0]),
            ("DrainI(1)", &[0.1]),
            ("GateV(3)", &[2.0]),
            ("DrainI(3)", &[0.2]),
        ]);
        let err = reshape(&columns).unwrap_err();
        assert!(err.to_string().contains("GateV(2)"));
    }

    #[test]
    fn test_fixed_column_summary() {
        let columns = table(&[
            ("DrainV(1)", &[0.0, 0.5, 1.0]),
            ("GateV(1)", &[1.0, 1.0, 1.0]),
            ("DrainV(2)", &[0.0, 0.5, 1.0]),
            ("GateV(2)", &[1.0, 1.0, 1.0]),
            ("DrainV(3)", &[0.0, 0.5, 1.0]),
            ("GateV(3)", &[1.0, 1.0, 1.0]),
        ]);

        let fixed = reshape(&columns).unwrap().fixed.unwrap();
        assert_eq!(fixed.name, "GateV");
        assert_eq!(fixed.min, 1.0);
        assert_eq!(fixed.max, 1.0);
        assert_eq!(fixed.delta, 0.0);
    }

    #[test]
    fn test_fixed_column_statistics_across_blocks() {
        let columns = table(&[
            ("GateV(1)", &[-1.0, -1.0]),
            ("DrainI(1)", &[0.0, 0.1]),
            ("GateV(2)", &[0.0, 0.0]),
            ("DrainI(2)", &[0.0, 0.2]),
            ("GateV(3)", &[1.0, 1.0]),
            ("DrainI(3)", &[0.0, 0.3]),
            ("GateV(4)", &[2.0, 2.0]),
            ("DrainI(4)", &[0.0, 0.4]),
        ]);

        let fixed = reshape(&columns).unwrap().fixed.unwrap();
        assert_eq!(fixed.name, "GateV");
        assert_eq!(fixed.min, -1.0);
        assert_eq!(fixed.max, 2.0);
        assert_eq!(fixed.delta, 0.75);
    }

    #[test]
    fn test_first_fixed_column_wins() {
        // BaseV is constant too, and with a smaller spread, but GateV comes first
        let columns = table(&[
            ("GateV(1)", &[3.0, 3.0]),
            ("BaseV(1)", &[0.5, 0.5]),
            ("GateV(2)", &[4.0, 4.0]),
            ("BaseV(2)", &[0.5, 0.5]),
        ]);

        let fixed = reshape(&columns).unwrap().fixed.unwrap();
        assert_eq!(fixed.name, "GateV");
        assert_eq!(fixed.delta, 0.5);
    }

    #[test]
    fn test_fixed_column_found_in_later_block() {
        let columns = table(&[
            ("GateV(1)", &[0.0, 1.0]),
            ("DrainI(1)", &[0.0, 0.1]),
            ("GateV(2)", &[2.0, 2.0]),
            ("DrainI(2)", &[0.0, 0.2]),
            ("GateV(3)", &[5.0, 6.0]),
            ("DrainI(3)", &[0.0, 0.3]),
        ]);

        // Locked at block 2; block 3 still contributes its first sample
        let fixed = reshape(&columns).unwrap().fixed.unwrap();
        assert_eq!(fixed.name, "GateV");
        assert_eq!(fixed.min, 2.0);
        assert_eq!(fixed.max, 5.0);
        assert_eq!(fixed.delta, 1.0);
    }

    #[test]
    fn test_tolerance_is_absolute() {
        let mut tracker = FixedColumnTracker::default();
        tracker.observe("GateV", &[1.0, 1.0 + 1e-9]);
        assert_eq!(tracker, FixedColumnTracker::Searching);

        tracker.observe("GateV", &[1.0, 1.0 + 1e-11]);
        assert!(matches!(tracker, FixedColumnTracker::LockedOn { .. }));
    }

    #[test]
    fn test_locked_tracker_ignores_other_columns() {
        let mut tracker = FixedColumnTracker::default();
        tracker.observe("GateV", &[1.0, 1.0]);
        tracker.observe("BaseV", &[9.0, 9.0]);

        let summary = tracker.finish(1).unwrap();
        assert_eq!(summary.name, "GateV");
        assert_eq!(summary.max, 1.0);
    }

    #[test]
    fn test_no_fixed_column() {
        let columns = table(&[("DrainV", &[0.0, 1.0]), ("DrainI", &[0.0, 0.5])]);
        assert!(reshape(&columns).unwrap().fixed.is_none());
    }

    #[test]
    fn test_nan_repetition_never_qualifies() {
        let mut tracker = FixedColumnTracker::default();
        tracker.observe("GateV", &[f64::NAN, f64::NAN]);
        tracker.observe("GateV", &[]);
        assert_eq!(tracker, FixedColumnTracker::Searching);
    }
}
