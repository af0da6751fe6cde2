//! Backends implemented in-process. External engines plug in through
//! [`BackendRegistry::register`](crate::BackendRegistry::register).

pub mod dummy;
pub mod fractional_knapsack;

pub use dummy::DummySolver;
pub use fractional_knapsack::FractionalKnapsackSolver;
