use clap::Parser;
use labconv::cli::{args::Args, commands};
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

fn main() {
    let args = Args::parse();

    let Some(command) = args.command else {
        show_help_and_commands();
        process::exit(0);
    };

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        let cancelled = Arc::new(AtomicBool::new(false));
        let run = commands::run(command, Arc::clone(&cancelled));
        tokio::pin!(run);

        // The batch checks the flag between files, so let the current file finish
        tokio::select! {
            result = &mut run => result,
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    eprintln!("Failed to listen for CTRL+C: {}", e);
                }
                eprintln!("\nReceived CTRL+C, finishing the current file...");
                cancelled.store(true, Ordering::Relaxed);
                run.await.and_then(|()| Err(anyhow::anyhow!("Conversion interrupted by user")))
            }
        }
    });

    match result {
        Ok(()) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("labconv - Lab Instrument Data Converter");
    println!("=======================================");
    println!();
    println!("Convert radiometer text logs and ZIP archives of Keithley spreadsheet");
    println!("exports into dataset bundles.");
    println!();
    println!("USAGE:");
    println!("    labconv <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    convert     Convert .txt logs and .zip archives (copies .h5/.hdf5 unchanged)");
    println!("    inspect     Show a spreadsheet's block layout or a bundle's datasets");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("EXAMPLES:");
    println!("    # Convert a test campaign into ./bundles:");
    println!("    labconv convert campaign/*.zip -o bundles");
    println!();
    println!("    # Look at one Keithley export:");
    println!("    labconv inspect Id_vs_Vd_H0.xls");
    println!();
    println!("For detailed help on any command, use:");
    println!("    labconv <COMMAND> --help");
}
