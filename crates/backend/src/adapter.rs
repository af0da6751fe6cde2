use les_core::{ModelLoadError, ModelParams, Solution, SolveError, SolverKind};

/// Integration point of a solving engine.
///
/// An adapter instance serves exactly one task: load the model, solve it,
/// hand back the solution. Instances are never shared between threads, but
/// they may be moved to a worker, hence the `Send` bound.
pub trait BackendSolver: Send {
    /// Which registry entry this adapter implements.
    fn kind(&self) -> SolverKind;

    /// Load the model to be solved. Fails on malformed or unsupported input.
    fn load_model_params(&mut self, params: &ModelParams) -> Result<(), ModelLoadError>;

    /// Solve the loaded model. Fails on infeasibility or numerical trouble.
    fn solve(&mut self) -> Result<(), SolveError>;

    /// The solution of the last successful [`solve`](Self::solve), `None` before that.
    fn get_solution(&self) -> Option<&Solution>;
}
