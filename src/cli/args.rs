//! Command-line argument definitions for the lab data converter
//!
//! Defines the CLI interface with the clap derive API.

use crate::config::{CompressionAlgorithm, ConverterConfig};
use crate::constants::DEFAULT_BUNDLE_EXTENSION;
use crate::error::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for the lab data converter
///
/// Converts radiometer text logs and ZIP archives of Keithley spreadsheet
/// exports into dataset bundles.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "labconv",
    version,
    about = "Convert radiometer logs and Keithley test archives into dataset bundles",
    long_about = "Converts whitespace-delimited radiometer logs (.txt) and ZIP archives of \
                  Keithley spreadsheet exports (.zip) into dataset bundles. Spreadsheet \
                  repetitions are folded into 2-D record arrays, the stepped bias column is \
                  summarised and instrument settings are kept as dataset attributes. \
                  Existing containers (.h5, .hdf5) are copied unchanged."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Convert input files into dataset bundles
    Convert(ConvertArgs),
    /// Show the layout of a spreadsheet export or the contents of a bundle
    Inspect(InspectArgs),
}

/// Arguments for the convert command
#[derive(Debug, Clone, Parser)]
pub struct ConvertArgs {
    /// Files, directories or glob patterns to convert
    ///
    /// Directories are searched recursively for .txt, .zip, .h5 and .hdf5 files.
    #[arg(value_name = "INPUT", required = true)]
    pub inputs: Vec<String>,

    /// Output directory for converted files
    ///
    /// Will be created if it doesn't exist. Defaults to the current directory.
    #[arg(
        short = 'o',
        long = "output",
        value_name = "DIR",
        help = "Output directory for converted files"
    )]
    pub output_dir: Option<PathBuf>,

    /// Parquet compression inside written bundles (snappy, zstd, lz4, none)
    #[arg(long, value_name = "ALG", default_value = "zstd")]
    pub compression: String,

    /// Extension given to written bundles
    #[arg(long = "extension", value_name = "EXT", default_value = DEFAULT_BUNDLE_EXTENSION)]
    pub output_extension: String,

    /// Replace outputs that already exist
    #[arg(long)]
    pub overwrite: bool,

    /// Increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only report errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl ConvertArgs {
    /// Converter configuration built from the command line
    pub fn to_config(&self) -> Result<ConverterConfig> {
        let compression: CompressionAlgorithm = self.compression.parse()?;
        let mut config = ConverterConfig::default()
            .with_compression(compression)
            .with_output_extension(self.output_extension.as_str());
        if self.overwrite {
            config = config.with_overwrite();
        }
        config.validate()?;
        Ok(config)
    }

    pub fn get_output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Progress bars are drawn unless running quietly
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }
}

/// Arguments for the inspect command
#[derive(Debug, Clone, Parser)]
pub struct InspectArgs {
    /// Spreadsheet export (.xls, .xlsx) or dataset bundle to inspect
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl InspectArgs {
    pub fn get_log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
