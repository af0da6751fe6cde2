use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use les_backend::BackendRegistry;
use les_core::{ExecutionMode, PoolConfig, Solution, Task, TaskFailure, TaskId};
use les_runtime::{PoolError, RequestId, Submit, ThreadPool, WorkFailure, WorkRequest};
use tracing::{error, info, warn};

use crate::error::ExecutorError;
use crate::executor::{self, Executor};
use crate::metrics::RunSummary;
use crate::pipeline::Pipeline;

/// Outcome relayed from a pool callback to the run loop.
enum Outcome {
    Done(TaskId, Result<Solution, TaskFailure>),
    Panicked(TaskId, String),
}

type OutcomeSink = Rc<RefCell<VecDeque<Outcome>>>;

/// Runs tasks on a [`ThreadPool`]. Backends are resolved on the calling
/// thread; load and solve happen on the workers.
///
/// Results reach the pipeline in completion order, not submission order.
pub struct ParallelExecutor<P> {
    pipeline: P,
    registry: BackendRegistry,
    pool: ThreadPool<Solution, TaskFailure>,
    /// Cap on outstanding requests. Set to the result queue capacity so
    /// workers can always hand off their result.
    max_in_flight: Option<usize>,
}

/// Per-run bookkeeping shared by submission and delivery.
struct RunState {
    outcomes: OutcomeSink,
    in_flight: HashMap<TaskId, Task>,
    panicked: Option<(TaskId, String)>,
    summary: RunSummary,
}

impl RunState {
    /// Hand every relayed outcome to the pipeline.
    fn deliver<P: Pipeline>(&mut self, pipeline: &mut P) {
        loop {
            let Some(outcome) = self.outcomes.borrow_mut().pop_front() else {
                return;
            };
            match outcome {
                Outcome::Done(task_id, outcome) => {
                    let Some(task) = self.in_flight.remove(&task_id) else {
                        error!(task_id = %task_id, "outcome for task not in flight");
                        continue;
                    };
                    match executor::finish(&task, outcome) {
                        Some(result) => {
                            pipeline.process_result(result);
                            self.summary.record_solved();
                        }
                        None => {
                            pipeline.finalize_task(task);
                            self.summary.record_finalized();
                        }
                    }
                }
                Outcome::Panicked(task_id, message) => {
                    self.in_flight.remove(&task_id);
                    error!(task_id = %task_id, error = %message, "backend panicked");
                    if self.panicked.is_none() {
                        self.panicked = Some((task_id, message));
                    }
                }
            }
        }
    }
}

impl<P: Pipeline> ParallelExecutor<P> {
    /// Start a pool sized by `config`.
    pub fn new(
        pipeline: P,
        registry: BackendRegistry,
        config: &PoolConfig,
    ) -> Result<Self, ExecutorError> {
        let pool = ThreadPool::new(config)?;
        let max_in_flight = (config.result_queue_size > 0).then_some(config.result_queue_size);
        Ok(Self {
            pipeline,
            registry,
            pool,
            max_in_flight,
        })
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub fn into_pipeline(self) -> P {
        self.pipeline
    }

    pub fn pool(&self) -> &ThreadPool<Solution, TaskFailure> {
        &self.pool
    }

    fn submit(&mut self, task: Task, state: &mut RunState) -> Result<(), ExecutorError> {
        let mut solver = executor::resolve(&self.registry, &task)?;
        let task_id = task.id();
        let params = task.model_params().clone();

        let on_success = {
            let sink = Rc::clone(&state.outcomes);
            move |_: &RequestId, solution: Solution| {
                sink.borrow_mut()
                    .push_back(Outcome::Done(task_id, Ok(solution)));
            }
        };
        let on_failure = {
            let sink = Rc::clone(&state.outcomes);
            move |_: &RequestId, failure: WorkFailure<TaskFailure>| {
                let outcome = match failure {
                    WorkFailure::Failed(e) => Outcome::Done(task_id, Err(e)),
                    WorkFailure::Panicked(message) => Outcome::Panicked(task_id, message),
                };
                sink.borrow_mut().push_back(outcome);
            }
        };
        let request = WorkRequest::new(move || executor::solve_with(solver.as_mut(), &params))
            .with_id(task_id.0)
            .on_success(on_success)
            .on_failure(on_failure);

        self.pool.put_request(request, Submit::Block)?;
        state.in_flight.insert(task_id, task);
        Ok(())
    }

    /// Collect whatever has completed without blocking.
    fn drain_ready(&mut self, state: &mut RunState) -> Result<(), ExecutorError> {
        loop {
            match self.pool.poll(false) {
                Ok(Some(_)) => {}
                Ok(None) | Err(PoolError::NoResultsPending) => break,
                Err(e) => return Err(e.into()),
            }
        }
        state.deliver(&mut self.pipeline);
        Ok(())
    }

    /// Block until every outstanding request has been delivered.
    fn drain_all(&mut self, state: &mut RunState) -> Result<(), ExecutorError> {
        self.pool.wait()?;
        state.deliver(&mut self.pipeline);
        Ok(())
    }

    fn make_room(&mut self, state: &mut RunState) -> Result<(), ExecutorError> {
        let Some(limit) = self.max_in_flight else {
            return Ok(());
        };
        while self.pool.pending_count() >= limit {
            self.pool.poll(true)?;
        }
        state.deliver(&mut self.pipeline);
        Ok(())
    }
}

impl<P: Pipeline> Executor for ParallelExecutor<P> {
    fn run(&mut self) -> Result<RunSummary, ExecutorError> {
        let mut state = RunState {
            outcomes: OutcomeSink::default(),
            in_flight: HashMap::new(),
            panicked: None,
            summary: RunSummary::start(ExecutionMode::Parallel),
        };
        info!(
            workers = self.pool.worker_count(),
            backends = self.registry.len(),
            "parallel run started"
        );

        while state.panicked.is_none() {
            let Some(task) = self.pipeline.next_task() else {
                break;
            };
            state.summary.record_seen(task.solver_kind());
            self.make_room(&mut state)?;
            if let Err(e) = self.submit(task, &mut state) {
                if self.pool.pending_count() > 0 {
                    warn!(
                        outstanding = self.pool.pending_count(),
                        "aborting run, draining outstanding tasks"
                    );
                    self.drain_all(&mut state)?;
                }
                return Err(e);
            }
            self.drain_ready(&mut state)?;
        }

        self.drain_all(&mut state)?;

        if let Some((task_id, message)) = state.panicked {
            return Err(ExecutorError::WorkerPanicked { task_id, message });
        }
        state.summary.finish();
        Ok(state.summary)
    }
}

#[cfg(test)]
mod tests {
    use les_core::{ModelParams, SolverKind};

    use super::*;
    use crate::pipeline::BatchPipeline;

    fn config(workers: usize) -> PoolConfig {
        PoolConfig {
            num_workers: workers,
            poll_timeout_ms: 20,
            ..PoolConfig::default()
        }
    }

    fn params(lower: f64, upper: f64) -> ModelParams {
        ModelParams {
            name: "box".into(),
            maximize: true,
            objective: vec![1.0],
            constraints: vec![],
            lower_bounds: vec![lower],
            upper_bounds: vec![upper],
            integer: vec![],
        }
    }

    #[test]
    fn every_task_gets_exactly_one_outcome() {
        let tasks: Vec<Task> = (0..40)
            .map(|i| {
                // Every fifth task has inverted bounds and fails to load.
                let p = if i % 5 == 0 { params(2.0, 1.0) } else { params(1.0, 2.0) };
                Task::new(i, p, SolverKind::Dummy)
            })
            .collect();
        let mut executor =
            ParallelExecutor::new(BatchPipeline::new(tasks), BackendRegistry::builtin(), &config(4))
                .unwrap();
        let summary = executor.run().unwrap();
        assert_eq!(summary.tasks_seen, 40);
        assert_eq!(summary.solved, 32);
        assert_eq!(summary.finalized, 8);

        let pipeline = executor.into_pipeline();
        let mut finalized: Vec<u64> = pipeline.finalized().iter().map(|id| id.0).collect();
        finalized.sort_unstable();
        assert_eq!(finalized, vec![0, 5, 10, 15, 20, 25, 30, 35]);
        assert_eq!(pipeline.results().len(), 32);
    }

    #[test]
    fn bounded_result_queue_does_not_stall() {
        let tasks: Vec<Task> = (0..25)
            .map(|i| Task::new(i, params(0.0, 1.0), SolverKind::Dummy))
            .collect();
        let config = PoolConfig {
            request_queue_size: 2,
            result_queue_size: 2,
            ..config(3)
        };
        let mut executor =
            ParallelExecutor::new(BatchPipeline::new(tasks), BackendRegistry::builtin(), &config)
                .unwrap();
        let summary = executor.run().unwrap();
        assert_eq!(summary.solved, 25);
        assert_eq!(executor.pool().pending_count(), 0);
    }

    #[test]
    fn unknown_backend_drains_then_fails() {
        let tasks = vec![
            Task::new(1, params(0.0, 1.0), SolverKind::Dummy),
            Task::new(2, params(0.0, 1.0), SolverKind::Dummy),
            Task::new(3, params(0.0, 1.0), SolverKind::Glpk),
            Task::new(4, params(0.0, 1.0), SolverKind::Dummy),
        ];
        let mut pipeline = BatchPipeline::new(tasks);
        let err = ParallelExecutor::new(&mut pipeline, BackendRegistry::builtin(), &config(2))
            .unwrap()
            .run()
            .unwrap_err();

        assert!(matches!(
            err,
            ExecutorError::UnknownBackend { task_id: TaskId(3), kind: SolverKind::Glpk }
        ));
        assert_eq!(pipeline.results().len(), 2);
        assert!(pipeline.finalized().is_empty());
        assert_eq!(pipeline.remaining(), 1);
    }
}
