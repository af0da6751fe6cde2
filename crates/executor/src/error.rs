use les_core::{SolverKind, TaskId};
use les_runtime::PoolError;
use thiserror::Error;

/// Failures that abort a run. Per-task backend failures are not among them:
/// those finalize the task and the run continues.
#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("task {task_id}: no backend registered for solver kind {kind}")]
    UnknownBackend { task_id: TaskId, kind: SolverKind },

    #[error("task {task_id}: backend panicked: {message}")]
    WorkerPanicked { task_id: TaskId, message: String },

    #[error("thread pool error: {0}")]
    Pool(#[from] PoolError),
}
