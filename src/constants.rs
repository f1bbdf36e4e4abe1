//! Application constants for the instrument data converter
//!
//! Fixed numeric constants, sentinel labels, the radiometer text layout and
//! the archive member naming table live here.

// =============================================================================
// Numeric Constants
// =============================================================================

/// Sampling frequency of the radiometer acquisition chain (Hz)
pub const SAMPLING_FREQUENCY: f64 = 25.0;

/// Absolute spread below which a repetition counts as a fixed column
pub const FIXED_COLUMN_TOLERANCE: f64 = 1e-10;

/// Maximum length of a dataset attribute key
pub const ATTRIBUTE_KEY_MAX_LEN: usize = 8;

/// Characters removed from setting names before they become attribute keys
pub const ATTRIBUTE_KEY_STRIPPED: &[char] = &[' ', '+', '-', '(', ')'];

// =============================================================================
// Spreadsheet Layout
// =============================================================================

/// Header prefix of the first column after the useful data table
pub const DATA_TABLE_END_MARKER: &str = "START";

/// Name of the worksheet holding instrument settings
pub const SETTINGS_SHEET_NAME: &str = "Settings";

/// Row label terminating the settings table
pub const SETTINGS_END_MARKER: &str = "Formulas";

/// Leading alphabetic prefix of a data column label
pub const BASE_NAME_PATTERN: &str = "^[a-zA-Z]+";

// =============================================================================
// Dataset Attribute Names
// =============================================================================

pub mod attributes {
    pub const FIXED_VALUE: &str = "fixed_value";
    pub const FIXED_MIN: &str = "fixed_min";
    pub const FIXED_MAX: &str = "fixed_max";
    pub const FIXED_DELTA: &str = "fixed_delta";
}

// =============================================================================
// Radiometer Text Logs
// =============================================================================

/// Column order of a radiometer text log (after the skipped header line)
pub const TEXT_COLUMN_NAMES: [&str; 13] = [
    "pctime",
    "phb",
    "record",
    "dem_Q1_ADU",
    "dem_U1_ADU",
    "dem_U2_ADU",
    "dem_Q2_ADU",
    "pwr_Q1_ADU",
    "pwr_U1_ADU",
    "pwr_U2_ADU",
    "pwr_Q2_ADU",
    "rfpower_dB",
    "freq_Hz",
];

/// Header lines skipped at the top of a text log
pub const TEXT_HEADER_LINES: usize = 1;

/// Columns of a text log stored as 8-bit integers
pub const TEXT_INT8_COLUMNS: &[&str] = &["phb", "record"];

/// Synthesized time column of the text dataset
pub const TEXT_TIME_COLUMN: &str = "time_s";

/// Dataset name used for text logs
pub const TEXT_DATASET_NAME: &str = "time_series";

// =============================================================================
// Archive Members
// =============================================================================

/// Suffix of archive members holding spreadsheet exports
pub const SPREADSHEET_SUFFIX: &str = ".xls";

/// Suffix of spreadsheet-like members that are not data exports
pub const EXCLUDED_SPREADSHEET_SUFFIX: &str = ".mr.xls";

/// Ordered (substring, dataset) pairs used to name archive members.
///
/// Each destination is listed twice: first under the legacy folder naming,
/// then under the naming of the current Keithley firmware. The first
/// matching pattern wins.
pub const DATASET_NAME_PATTERNS: &[(&str, &str)] = &[
    // HEMT tests (Idrain vs Vdrain)
    ("Q1/tests/data/Id_vs_Vd", "HA1/IDVD"),
    ("Id_vs_Vd_H0", "HA1/IDVD"),
    ("Q2/tests/data/Id_vs_Vd", "HA2/IDVD"),
    ("Id_vs_Vd_H2", "HA2/IDVD"),
    ("Q3/tests/data/Id_vs_Vd", "HA3/IDVD"),
    ("Id_vs_Vd_H4", "HA3/IDVD"),
    ("Q6/tests/data/Id_vs_Vd", "HB1/IDVD"),
    ("Id_vs_Vd_H1", "HB1/IDVD"),
    ("Q5/tests/data/Id_vs_Vd", "HB2/IDVD"),
    ("Id_vs_Vd_H3", "HB2/IDVD"),
    ("Q4/tests/data/Id_vs_Vd", "HB3/IDVD"),
    ("Id_vs_Vd_H5", "HB3/IDVD"),
    // HEMT tests (Idrain vs Vgate)
    ("Q1/tests/data/Id_vs_Vg", "HA1/IDVG"),
    ("Id_vs_Vg_H0", "HA1/IDVG"),
    ("Q2/tests/data/Id_vs_Vg", "HA2/IDVG"),
    ("Id_vs_Vg_H2", "HA2/IDVG"),
    ("Q3/tests/data/Id_vs_Vg", "HA3/IDVG"),
    ("Id_vs_Vg_H4", "HA3/IDVG"),
    ("Q6/tests/data/Id_vs_Vg", "HB1/IDVG"),
    ("Id_vs_Vg_H1", "HB1/IDVG"),
    ("Q5/tests/data/Id_vs_Vg", "HB2/IDVG"),
    ("Id_vs_Vg_H3", "HB2/IDVG"),
    ("Q4/tests/data/Id_vs_Vg", "HB3/IDVG"),
    ("Id_vs_Vg_H5", "HB3/IDVG"),
    // Detector tests
    ("DET1/tests/data/If_vs_Vf", "Q1/IFVF"),
    ("If_vs_Vf_Det1", "Q1/IFVF"),
    ("DET4/tests/data/If_vs_Vf", "Q2/IFVF"),
    ("If_vs_Vf_Det4", "Q2/IFVF"),
    ("DET2/tests/data/If_vs_Vf", "U1/IFVF"),
    ("If_vs_Vf_Det2", "U1/IFVF"),
    ("DET3/tests/data/If_vs_Vf", "U2/IFVF"),
    ("If_vs_Vf_Det3", "U2/IFVF"),
    // Phase switch tests (forward)
    ("V1_PS1/tests/data/If_vs_Vf", "PSA1/IFVF"),
    ("If_vs_Vfd_V1_PS1", "PSA1/IFVF"),
    ("V2_PS1/tests/data/If_vs_Vf", "PSA2/IFVF"),
    ("If_vs_Vfd_V2_PS1", "PSA2/IFVF"),
    ("V1_PS2/tests/data/If_vs_Vf", "PSB1/IFVF"),
    ("If_vs_Vfd_V1_PS2", "PSB1/IFVF"),
    ("V2_PS2/tests/data/If_vs_Vf", "PSB2/IFVF"),
    ("If_vs_Vfd_V2_PS2", "PSB2/IFVF"),
    // Phase switch tests (reverse)
    ("V1_PS1/tests/data/Ir_vs_Vr", "PSA1/IRVR"),
    ("Ir_vs_Vr_V1_PS1", "PSA1/IRVR"),
    ("V2_PS1/tests/data/Ir_vs_Vr", "PSA2/IRVR"),
    ("Ir_vs_Vr_V2_PS1", "PSA2/IRVR"),
    ("V1_PS2/tests/data/Ir_vs_Vr", "PSB1/IRVR"),
    ("Ir_vs_Vr_V1_PS2", "PSB1/IRVR"),
    ("V2_PS2/tests/data/Ir_vs_Vr", "PSB2/IRVR"),
    ("Ir_vs_Vr_V2_PS2", "PSB2/IRVR"),
];

// =============================================================================
// Input Routing and Output Bundles
// =============================================================================

/// Input extensions accepted by the converter (lowercase, with dot)
pub const TEXT_EXTENSION: &str = ".txt";
pub const ARCHIVE_EXTENSION: &str = ".zip";
pub const PASSTHROUGH_EXTENSIONS: &[&str] = &[".h5", ".hdf5"];

/// Default extension of written dataset bundles
pub const DEFAULT_BUNDLE_EXTENSION: &str = "dsz";

/// Manifest member inside a dataset bundle
pub const BUNDLE_MANIFEST_NAME: &str = "manifest.json";

/// Bundle format version written to the manifest
pub const BUNDLE_FORMAT_VERSION: u32 = 1;

/// Index columns prepended to flattened 2-D datasets
pub const SAMPLE_INDEX_COLUMN: &str = "sample";
pub const BLOCK_INDEX_COLUMN: &str = "block";

/// All input extensions recognised during directory discovery
pub fn supported_extensions() -> impl Iterator<Item = &'static str> {
    [TEXT_EXTENSION, ARCHIVE_EXTENSION]
        .into_iter()
        .chain(PASSTHROUGH_EXTENSIONS.iter().copied())
}
