//! Drives a pipeline's task stream through the backend registry.
//!
//! Each task is resolved to a backend adapter, loaded and solved. A task
//! whose backend fails is finalized without a result and the batch goes on;
//! a task whose solver kind has no registered backend aborts the run.

pub mod error;
pub mod executor;
pub mod metrics;
pub mod parallel;
pub mod pipeline;
pub mod sequential;

pub use error::ExecutorError;
pub use executor::{execute, solve_with, Executor};
pub use metrics::RunSummary;
pub use parallel::ParallelExecutor;
pub use pipeline::{BatchPipeline, Pipeline};
pub use sequential::SequentialExecutor;
