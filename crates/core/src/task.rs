use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{ModelParams, Solution};
use crate::solver_kind::SolverKind;

/// Identifier of a task, unique within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TaskId {
    fn from(id: u64) -> Self {
        TaskId(id)
    }
}

/// A unit of optimization work. Created by a pipeline, consumed once by an
/// executor, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    model_params: ModelParams,
    solver_kind: SolverKind,
}

impl Task {
    pub fn new(id: impl Into<TaskId>, model_params: ModelParams, solver_kind: SolverKind) -> Self {
        Self {
            id: id.into(),
            model_params,
            solver_kind,
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn model_params(&self) -> &ModelParams {
        &self.model_params
    }

    pub fn solver_kind(&self) -> SolverKind {
        self.solver_kind
    }
}

/// Outcome of successfully executing a [`Task`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    pub task_id: TaskId,
    pub solution: Solution,
}

impl TaskResult {
    pub fn new(task_id: TaskId, solution: Solution) -> Self {
        Self { task_id, solution }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_envelope_deserializes_from_json() {
        let json = r#"{
            "id": 7,
            "model_params": {
                "objective": [1.0],
                "lower_bounds": [0.0],
                "upper_bounds": [1.0]
            },
            "solver_kind": 1
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.id(), TaskId(7));
        assert_eq!(task.solver_kind(), SolverKind::Dummy);
        assert_eq!(task.model_params().num_vars(), 1);
    }
}
