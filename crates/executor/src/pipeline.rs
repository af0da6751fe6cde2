use std::collections::VecDeque;

use les_core::{Task, TaskId, TaskResult};

/// Source of tasks and sink of their outcomes.
///
/// Tasks are pulled once, in order. Every task handed out is answered with
/// exactly one of `process_result` or `finalize_task`, unless the run aborts.
pub trait Pipeline {
    /// Next task to execute, `None` once the stream is exhausted.
    fn next_task(&mut self) -> Option<Task>;

    /// The task is done but produced nothing.
    fn finalize_task(&mut self, task: Task);

    /// The task produced a result.
    fn process_result(&mut self, result: TaskResult);
}

/// Blanket implementation so `&mut P` can be handed to an executor directly.
impl<P: Pipeline + ?Sized> Pipeline for &mut P {
    fn next_task(&mut self) -> Option<Task> {
        (**self).next_task()
    }

    fn finalize_task(&mut self, task: Task) {
        (**self).finalize_task(task)
    }

    fn process_result(&mut self, result: TaskResult) {
        (**self).process_result(result)
    }
}

/// In-memory pipeline over a fixed list of tasks, recording every outcome.
#[derive(Debug, Default)]
pub struct BatchPipeline {
    queue: VecDeque<Task>,
    results: Vec<TaskResult>,
    finalized: Vec<TaskId>,
}

impl BatchPipeline {
    pub fn new(tasks: impl IntoIterator<Item = Task>) -> Self {
        Self {
            queue: tasks.into_iter().collect(),
            results: Vec::new(),
            finalized: Vec::new(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    pub fn results(&self) -> &[TaskResult] {
        &self.results
    }

    /// Ids of tasks finalized without a result, in finalization order.
    pub fn finalized(&self) -> &[TaskId] {
        &self.finalized
    }
}

impl Pipeline for BatchPipeline {
    fn next_task(&mut self) -> Option<Task> {
        self.queue.pop_front()
    }

    fn finalize_task(&mut self, task: Task) {
        self.finalized.push(task.id());
    }

    fn process_result(&mut self, result: TaskResult) {
        self.results.push(result);
    }
}
