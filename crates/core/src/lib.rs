pub mod config;
pub mod error;
pub mod model;
pub mod solver_kind;
pub mod task;

pub use config::{load_dotenv, ExecutorConfig, ExecutionMode, LesConfig, PoolConfig};
pub use error::*;
pub use model::{Constraint, ModelParams, Sense, Solution, SolutionStatus};
pub use solver_kind::SolverKind;
pub use task::{Task, TaskId, TaskResult};
