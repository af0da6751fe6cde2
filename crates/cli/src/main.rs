mod cli;

use std::io::Read;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::info;

use les_backend::BackendRegistry;
use les_core::{ExecutionMode, LesConfig, Task, TaskId, TaskResult};
use les_executor::{BatchPipeline, Executor, ParallelExecutor, RunSummary, SequentialExecutor};

use crate::cli::CliArgs;

/// What gets printed on stdout after a run.
#[derive(Serialize)]
struct Report<'a> {
    summary: &'a RunSummary,
    results: &'a [TaskResult],
    finalized: &'a [TaskId],
}

fn main() -> Result<()> {
    les_core::load_dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();

    let mut config = match &args.config {
        Some(path) => LesConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => LesConfig::from_env().context("failed to load config from environment")?,
    };
    if let Some(mode) = args.mode {
        config.executor.mode = mode;
    }
    if let Some(workers) = args.workers {
        config.pool.num_workers = workers;
    }
    config.validate()?;
    config.log_summary();

    let tasks = read_tasks(&args.tasks)?;
    info!(tasks = tasks.len(), source = %args.tasks, "tasks loaded");

    let registry = BackendRegistry::builtin();
    let mut pipeline = BatchPipeline::new(tasks);
    let summary = match config.executor.mode {
        ExecutionMode::Sequential => SequentialExecutor::new(&mut pipeline, registry).run()?,
        ExecutionMode::Parallel => {
            ParallelExecutor::new(&mut pipeline, registry, &config.pool)?.run()?
        }
    };

    let report = Report {
        summary: &summary,
        results: pipeline.results(),
        finalized: pipeline.finalized(),
    };
    let json = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{json}");
    Ok(())
}

fn read_tasks(source: &str) -> Result<Vec<Task>> {
    let raw = if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read tasks from stdin")?;
        buf
    } else {
        std::fs::read_to_string(source)
            .with_context(|| format!("failed to read tasks from {source}"))?
    };
    serde_json::from_str(&raw).with_context(|| format!("malformed task list in {source}"))
}
