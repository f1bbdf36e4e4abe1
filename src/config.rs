//! Configuration management.
//!
//! Provides the converter configuration: bundle compression, output naming
//! and the overwrite policy used by the batch driver.

use crate::constants::DEFAULT_BUNDLE_EXTENSION;
use crate::error::{ConversionError, Result};
use polars::prelude::ParquetCompression;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported compression algorithms for bundle datasets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionAlgorithm {
    /// Snappy compression - good balance of speed and compression
    Snappy,
    /// ZSTD compression - better compression ratio, slower
    Zstd,
    /// LZ4 compression - fastest, lower compression ratio
    Lz4,
    /// No compression
    Uncompressed,
}

impl CompressionAlgorithm {
    /// Convert to polars ParquetCompression type
    pub fn to_polars_compression(&self) -> ParquetCompression {
        match self {
            CompressionAlgorithm::Snappy => ParquetCompression::Snappy,
            CompressionAlgorithm::Zstd => ParquetCompression::Zstd(None),
            CompressionAlgorithm::Lz4 => ParquetCompression::Lz4Raw,
            CompressionAlgorithm::Uncompressed => ParquetCompression::Uncompressed,
        }
    }
}

impl fmt::Display for CompressionAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CompressionAlgorithm::Snappy => "snappy",
            CompressionAlgorithm::Zstd => "zstd",
            CompressionAlgorithm::Lz4 => "lz4",
            CompressionAlgorithm::Uncompressed => "none",
        };
        f.write_str(name)
    }
}

impl FromStr for CompressionAlgorithm {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "snappy" => Ok(CompressionAlgorithm::Snappy),
            "zstd" => Ok(CompressionAlgorithm::Zstd),
            "lz4" => Ok(CompressionAlgorithm::Lz4),
            "none" | "uncompressed" => Ok(CompressionAlgorithm::Uncompressed),
            other => Err(ConversionError::Configuration {
                message: format!(
                    "unknown compression '{}' (expected snappy, zstd, lz4 or none)",
                    other
                ),
            }),
        }
    }
}

/// Global configuration for instrument data conversion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Compression applied to every dataset in a written bundle
    pub compression: CompressionAlgorithm,

    /// Replace outputs that already exist instead of skipping the input
    pub overwrite: bool,

    /// File extension (without dot) of written bundles
    pub output_extension: String,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            compression: CompressionAlgorithm::Zstd,
            overwrite: false,
            output_extension: DEFAULT_BUNDLE_EXTENSION.to_string(),
        }
    }
}

impl ConverterConfig {
    /// Use a different bundle compression
    pub fn with_compression(mut self, compression: CompressionAlgorithm) -> Self {
        self.compression = compression;
        self
    }

    /// Allow existing outputs to be replaced
    pub fn with_overwrite(mut self) -> Self {
        self.overwrite = true;
        self
    }

    /// Use a different bundle extension
    pub fn with_output_extension(mut self, extension: impl Into<String>) -> Self {
        self.output_extension = extension.into().trim_start_matches('.').to_string();
        self
    }

    /// Check that the configuration can produce usable file names
    pub fn validate(&self) -> Result<()> {
        if self.output_extension.is_empty() {
            return Err(ConversionError::Configuration {
                message: "output extension must not be empty".to_string(),
            });
        }
        if self.output_extension.contains(['/', '\\']) {
            return Err(ConversionError::Configuration {
                message: format!(
                    "output extension '{}' contains a path separator",
                    self.output_extension
                ),
            });
        }
        Ok(())
    }
}
