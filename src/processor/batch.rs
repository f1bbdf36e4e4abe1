//! Batch conversion of many inputs into one output directory.

use super::{InputKind, convert_data_file};
use crate::config::ConverterConfig;
use crate::error::{ConversionError, Result};
use crate::models::ConversionStats;

use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Converts a list of inputs, one output per input
#[derive(Debug)]
pub struct BatchConverter {
    output_dir: PathBuf,
    config: ConverterConfig,
    show_progress: bool,
    cancelled: Arc<AtomicBool>,
}

impl BatchConverter {
    pub fn new(output_dir: PathBuf, config: ConverterConfig) -> Self {
        Self {
            output_dir,
            config,
            show_progress: false,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Draw a progress bar on stderr while converting
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Share a cancellation flag owned by the caller
    pub fn with_cancellation(mut self, cancelled: Arc<AtomicBool>) -> Self {
        self.cancelled = cancelled;
        self
    }

    /// Flag that stops the batch before the next file when set
    pub fn cancellation_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    /// Output file for an input: passthrough keeps its name, conversions get the bundle extension
    pub fn output_path_for(&self, input: &Path) -> Result<PathBuf> {
        let file_name = input
            .file_name()
            .ok_or_else(|| ConversionError::InputNotFound {
                path: input.to_path_buf(),
            })?
            .to_string_lossy();

        let output_name = match InputKind::from_file_name(&file_name)? {
            InputKind::Passthrough => file_name.to_string(),
            InputKind::Text | InputKind::Archive => {
                let stem = input
                    .file_stem()
                    .map(|s| s.to_string_lossy().to_string())
                    .unwrap_or_else(|| file_name.to_string());
                format!("{}.{}", stem, self.config.output_extension)
            }
        };

        Ok(self.output_dir.join(output_name))
    }

    /// `written` maps each output produced earlier in this batch to its input
    fn convert_one(
        &self,
        input: &Path,
        written: &HashMap<PathBuf, PathBuf>,
    ) -> Result<Option<(PathBuf, usize)>> {
        let output = self.output_path_for(input)?;
        if let Some(first) = written.get(&output) {
            return Err(ConversionError::OutputCollision {
                output,
                first: first.clone(),
                second: input.to_path_buf(),
            });
        }
        if output.exists() && !self.config.overwrite {
            warn!(
                "Output {} already exists, skipping {} (use --overwrite to replace)",
                output.display(),
                input.display()
            );
            return Ok(None);
        }

        let file_name = input.to_string_lossy();
        let reader = File::open(input)?;
        let outcome = convert_data_file(&file_name, reader, &output, &self.config)?;
        Ok(Some((output, outcome.dataset_count())))
    }

    /// Convert every input; failures are logged and counted, not fatal to the batch
    pub fn run(&self, inputs: &[PathBuf]) -> Result<ConversionStats> {
        self.config.validate()?;
        fs::create_dir_all(&self.output_dir)?;

        let start_time = Instant::now();
        let mut stats = ConversionStats::default();
        let mut written = HashMap::new();

        let progress = if self.show_progress {
            let bar = ProgressBar::new(inputs.len() as u64);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:30.cyan/blue}] {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("=> "),
            );
            bar
        } else {
            ProgressBar::hidden()
        };

        for input in inputs {
            if self.cancelled.load(Ordering::Relaxed) {
                warn!("Conversion cancelled, {} inputs left", inputs.len() - stats_done(&stats));
                break;
            }

            progress.set_message(
                input
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default(),
            );

            match self.convert_one(input, &written) {
                Ok(Some((output, datasets))) => {
                    info!(
                        "{} -> {} ({} datasets)",
                        input.display(),
                        output.display(),
                        datasets
                    );
                    stats.files_converted += 1;
                    stats.datasets_written += datasets;
                    stats.outputs.push(output.clone());
                    written.insert(output, input.clone());
                }
                Ok(None) => stats.files_skipped += 1,
                Err(error) => {
                    warn!("Failed to convert {}: {}", input.display(), error);
                    stats.files_failed += 1;
                }
            }
            progress.inc(1);
        }

        progress.finish_and_clear();
        stats.processing_time_ms = start_time.elapsed().as_millis();

        debug!(
            "Batch finished: {} converted, {} skipped, {} failed in {}ms",
            stats.files_converted, stats.files_skipped, stats.files_failed, stats.processing_time_ms
        );
        Ok(stats)
    }
}

fn stats_done(stats: &ConversionStats) -> usize {
    stats.files_converted + stats.files_skipped + stats.files_failed
}
