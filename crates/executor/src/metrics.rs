use std::collections::BTreeMap;
use std::time::Instant;

use chrono::{DateTime, Utc};
use les_core::{ExecutionMode, SolverKind};
use serde::Serialize;
use tracing::info;

/// Counters for one `run()`.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub mode: ExecutionMode,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub elapsed_ms: u64,
    /// Tasks pulled from the pipeline.
    pub tasks_seen: u64,
    /// Tasks that produced a result.
    pub solved: u64,
    /// Tasks finalized without a result.
    pub finalized: u64,
    /// Tasks seen, by solver kind name.
    pub tasks_by_solver: BTreeMap<String, u64>,
    #[serde(skip)]
    clock: Instant,
}

impl RunSummary {
    pub fn start(mode: ExecutionMode) -> Self {
        Self {
            mode,
            started_at: Utc::now(),
            finished_at: None,
            elapsed_ms: 0,
            tasks_seen: 0,
            solved: 0,
            finalized: 0,
            tasks_by_solver: BTreeMap::new(),
            clock: Instant::now(),
        }
    }

    pub fn record_seen(&mut self, kind: SolverKind) {
        self.tasks_seen += 1;
        *self.tasks_by_solver.entry(kind.as_str().to_string()).or_default() += 1;
    }

    pub fn record_solved(&mut self) {
        self.solved += 1;
    }

    pub fn record_finalized(&mut self) {
        self.finalized += 1;
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
        self.elapsed_ms = self.clock.elapsed().as_millis() as u64;
        info!(
            mode = %self.mode,
            tasks = self.tasks_seen,
            solved = self.solved,
            finalized = self.finalized,
            elapsed_ms = self.elapsed_ms,
            "run complete"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_by_solver() {
        let mut summary = RunSummary::start(ExecutionMode::Sequential);
        summary.record_seen(SolverKind::Dummy);
        summary.record_seen(SolverKind::Dummy);
        summary.record_seen(SolverKind::FractionalKnapsack);
        summary.record_solved();
        summary.record_finalized();
        summary.finish();

        assert_eq!(summary.tasks_seen, 3);
        assert_eq!(summary.tasks_by_solver["DUMMY"], 2);
        assert_eq!(summary.tasks_by_solver["FRACTIONAL_KNAPSACK"], 1);
        assert!(summary.finished_at.is_some());
    }

    #[test]
    fn serializes_without_clock() {
        let mut summary = RunSummary::start(ExecutionMode::Parallel);
        summary.finish();
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["mode"], "parallel");
        assert!(json.get("clock").is_none());
    }
}
