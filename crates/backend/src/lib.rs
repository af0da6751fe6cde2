pub mod adapter;
pub mod registry;
pub mod solvers;

pub use adapter::BackendSolver;
pub use registry::{BackendRegistry, RegistryError, SolverFactory};
pub use solvers::{DummySolver, FractionalKnapsackSolver};
