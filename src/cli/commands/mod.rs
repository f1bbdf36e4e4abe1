//! Command implementations for the labconv CLI
//!
//! Each subcommand lives in its own module; `run` dispatches on the parsed
//! arguments.

pub mod convert;
pub mod inspect;
pub mod shared;

use crate::cli::args::Commands;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// Run the selected subcommand.
///
/// `cancelled` is set by the signal handler; long-running commands stop
/// between files once it is raised.
pub async fn run(command: Commands, cancelled: Arc<AtomicBool>) -> anyhow::Result<()> {
    match command {
        Commands::Convert(convert_args) => convert::run_convert(convert_args, cancelled).await,
        Commands::Inspect(inspect_args) => inspect::run_inspect(inspect_args).await,
    }
}
