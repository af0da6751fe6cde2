use std::path::PathBuf;

use clap::Parser;
use les_core::ExecutionMode;

/// Batch runner for optimization tasks.
///
/// Reads a JSON array of tasks, solves each on the backend named by its
/// solver kind, and prints a JSON report of results and finalized tasks.
#[derive(Parser, Debug)]
#[command(name = "les-run", about = "Run a batch of optimization tasks")]
pub struct CliArgs {
    /// Path to a TOML config file (default: defaults plus LES_* env vars)
    #[arg(long, env = "LES_CONFIG")]
    pub config: Option<PathBuf>,

    /// JSON file holding the task array; `-` reads stdin
    #[arg(long, default_value = "-")]
    pub tasks: String,

    /// Execution mode override: sequential or parallel
    #[arg(long)]
    pub mode: Option<ExecutionMode>,

    /// Worker thread override for parallel mode (0 = available parallelism)
    #[arg(long)]
    pub workers: Option<usize>,

    /// Pretty-print the report
    #[arg(long)]
    pub pretty: bool,
}
