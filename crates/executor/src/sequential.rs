use les_backend::BackendRegistry;
use les_core::{ExecutionMode, Task, TaskResult};
use tracing::info;

use crate::error::ExecutorError;
use crate::executor::{self, Executor};
use crate::metrics::RunSummary;
use crate::pipeline::Pipeline;

/// Runs every task on the calling thread, in pipeline order.
pub struct SequentialExecutor<P> {
    pipeline: P,
    registry: BackendRegistry,
}

impl<P: Pipeline> SequentialExecutor<P> {
    pub fn new(pipeline: P, registry: BackendRegistry) -> Self {
        Self { pipeline, registry }
    }

    pub fn execute(&self, task: &Task) -> Result<Option<TaskResult>, ExecutorError> {
        executor::execute(&self.registry, task)
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub fn into_pipeline(self) -> P {
        self.pipeline
    }
}

impl<P: Pipeline> Executor for SequentialExecutor<P> {
    fn run(&mut self) -> Result<RunSummary, ExecutorError> {
        let mut summary = RunSummary::start(ExecutionMode::Sequential);
        info!(backends = self.registry.len(), "sequential run started");

        while let Some(task) = self.pipeline.next_task() {
            summary.record_seen(task.solver_kind());
            match executor::execute(&self.registry, &task)? {
                Some(result) => {
                    self.pipeline.process_result(result);
                    summary.record_solved();
                }
                None => {
                    self.pipeline.finalize_task(task);
                    summary.record_finalized();
                }
            }
        }

        summary.finish();
        Ok(summary)
    }
}
