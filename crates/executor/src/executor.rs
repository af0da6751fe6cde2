use les_backend::{BackendRegistry, BackendSolver, RegistryError};
use les_core::{ModelParams, Solution, SolveError, Task, TaskFailure, TaskResult};
use tracing::{debug, warn};

use crate::error::ExecutorError;
use crate::metrics::RunSummary;

/// Drives a pipeline's task stream to exhaustion.
pub trait Executor {
    /// Consume every task. Per-task failures finalize the task and the run
    /// goes on; [`ExecutorError`] aborts it.
    fn run(&mut self) -> Result<RunSummary, ExecutorError>;
}

/// Load `params` into `solver`, solve, and take the solution.
pub fn solve_with(
    solver: &mut dyn BackendSolver,
    params: &ModelParams,
) -> Result<Solution, TaskFailure> {
    solver.load_model_params(params)?;
    solver.solve()?;
    solver.get_solution().cloned().ok_or_else(|| {
        SolveError::Engine(format!("{} solved without a solution", solver.kind())).into()
    })
}

/// Execute one task on a fresh adapter for its solver kind.
///
/// `Ok(None)` means the backend failed on this task; the failure is logged
/// here. An unregistered solver kind is returned as an error.
pub fn execute(registry: &BackendRegistry, task: &Task) -> Result<Option<TaskResult>, ExecutorError> {
    let mut solver = resolve(registry, task)?;
    Ok(finish(task, solve_with(solver.as_mut(), task.model_params())))
}

pub(crate) fn resolve(
    registry: &BackendRegistry,
    task: &Task,
) -> Result<Box<dyn BackendSolver>, ExecutorError> {
    // get_instance only ever fails with UnknownBackend.
    registry
        .get_instance(task.solver_kind())
        .map_err(|_: RegistryError| ExecutorError::UnknownBackend {
            task_id: task.id(),
            kind: task.solver_kind(),
        })
}

/// Turn a backend outcome into an optional result, logging failures.
pub(crate) fn finish(task: &Task, outcome: Result<Solution, TaskFailure>) -> Option<TaskResult> {
    match outcome {
        Ok(solution) => {
            debug!(
                task_id = %task.id(),
                solver = %task.solver_kind(),
                objective = solution.objective_value,
                "task solved"
            );
            Some(TaskResult::new(task.id(), solution))
        }
        Err(e) => {
            warn!(
                task_id = %task.id(),
                solver = %task.solver_kind(),
                model = %task.model_params().name,
                error = %e,
                "task failed, finalizing without result"
            );
            None
        }
    }
}
