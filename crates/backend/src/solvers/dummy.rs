use les_core::{ModelLoadError, ModelParams, Solution, SolutionStatus, SolveError, SolverKind};
use tracing::debug;

use crate::adapter::BackendSolver;

/// Placeholder backend: validates the model and answers with the point
/// closest to the origin within the variable bounds. Constraints are not
/// checked.
#[derive(Debug, Default)]
pub struct DummySolver {
    model: Option<ModelParams>,
    solution: Option<Solution>,
}

impl DummySolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn boxed() -> Box<dyn BackendSolver> {
        Box::new(Self::new())
    }
}

impl BackendSolver for DummySolver {
    fn kind(&self) -> SolverKind {
        SolverKind::Dummy
    }

    fn load_model_params(&mut self, params: &ModelParams) -> Result<(), ModelLoadError> {
        params.validate()?;
        self.model = Some(params.clone());
        self.solution = None;
        Ok(())
    }

    fn solve(&mut self) -> Result<(), SolveError> {
        let model = self.model.as_ref().ok_or(SolveError::NoModel)?;
        let values: Vec<f64> = model
            .lower_bounds
            .iter()
            .zip(&model.upper_bounds)
            .map(|(&lo, &up)| 0.0_f64.clamp(lo, up))
            .collect();
        let objective_value = model.objective_value(&values);
        debug!(model = %model.name, objective_value, "dummy solve");
        self.solution = Some(Solution {
            status: SolutionStatus::Feasible,
            objective_value,
            variable_values: values,
        });
        Ok(())
    }

    fn get_solution(&self) -> Option<&Solution> {
        self.solution.as_ref()
    }
}
