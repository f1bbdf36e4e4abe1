//! The `convert` command

use super::shared::{format_size, setup_logging};
use crate::cli::args::ConvertArgs;
use crate::models::ConversionStats;
use crate::processor::BatchConverter;
use crate::processor::discovery::discover_inputs;

use anyhow::{Context, bail};
use colored::*;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use tracing::info;

pub async fn run_convert(args: ConvertArgs, cancelled: Arc<AtomicBool>) -> anyhow::Result<()> {
    setup_logging(args.get_log_level(), args.quiet);

    let config = args.to_config().context("Invalid command line options")?;
    let output_dir = args.get_output_dir();
    let inputs = discover_inputs(&args.inputs).context("Failed to collect input files")?;
    info!(
        "Converting {} inputs into {} ({} compression)",
        inputs.len(),
        output_dir.display(),
        config.compression
    );

    if !args.quiet {
        println!("{}", "Starting conversion".bright_green().bold());
        println!(
            "  {} {}",
            "Inputs:".bright_cyan(),
            inputs.len().to_string().bright_white().bold()
        );
        println!("  {} {}", "Output:".bright_cyan(), output_dir.display());
    }

    let converter = BatchConverter::new(output_dir, config)
        .with_progress(args.show_progress())
        .with_cancellation(cancelled);

    let stats = tokio::task::spawn_blocking(move || converter.run(&inputs))
        .await
        .context("Conversion task panicked")??;

    if !args.quiet {
        print_summary(&stats);
    }

    if stats.files_failed > 0 {
        bail!(
            "{} of {} inputs failed to convert",
            stats.files_failed,
            stats.files_converted + stats.files_failed + stats.files_skipped
        );
    }
    Ok(())
}

fn print_summary(stats: &ConversionStats) {
    println!("\n{}", "Conversion Summary".bright_green().bold());
    println!(
        "  {} {}ms",
        "Time elapsed:".bright_cyan(),
        stats.processing_time_ms.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Files converted:".bright_cyan(),
        stats.files_converted.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Datasets written:".bright_cyan(),
        stats.datasets_written.to_string().bright_white().bold()
    );
    if stats.files_skipped > 0 {
        println!(
            "  {} {} (use --overwrite to replace)",
            "Files skipped:".bright_yellow(),
            stats.files_skipped.to_string().bright_yellow()
        );
    }
    if stats.files_failed > 0 {
        println!(
            "  {} {}",
            "Files failed:".bright_red(),
            stats.files_failed.to_string().bright_red().bold()
        );
    }

    for output in &stats.outputs {
        let size = std::fs::metadata(output).map(|m| m.len()).unwrap_or(0);
        println!("    {} ({})", output.display(), format_size(size));
    }
}
