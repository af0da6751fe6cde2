use thiserror::Error;

/// Raised by an adapter's `load_model_params` when the model cannot be loaded.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelLoadError {
    #[error("model has no variables")]
    Empty,

    #[error("{field} has {actual} entries, expected {expected}")]
    DimensionMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("constraint {row} references variable {column}, model has {num_vars}")]
    ColumnOutOfRange {
        row: usize,
        column: usize,
        num_vars: usize,
    },

    #[error("variable {0} has lower bound above upper bound")]
    InvertedBounds(usize),

    #[error("non-finite coefficient in {0}")]
    NonFinite(&'static str),

    #[error("model not supported by this backend: {0}")]
    Unsupported(String),
}

/// Raised by an adapter's `solve` when no solution could be produced.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolveError {
    #[error("no model loaded")]
    NoModel,

    #[error("model is infeasible")]
    Infeasible,

    #[error("model is unbounded")]
    Unbounded,

    #[error("numerical failure: {0}")]
    Numerical(String),

    #[error("backend engine error: {0}")]
    Engine(String),
}

/// The declared category of per-task failures.
///
/// An executor recovers from these locally: the task is finalized without a
/// result and the batch continues.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TaskFailure {
    #[error("cannot load model: {0}")]
    ModelLoad(#[from] ModelLoadError),

    #[error("cannot solve model: {0}")]
    Solve(#[from] SolveError),
}

/// A solver-kind ordinal outside the closed set.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("unknown solver kind ordinal: {0}")]
pub struct UnknownSolverKind(pub u8);

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
