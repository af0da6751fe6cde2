use std::collections::BTreeMap;
use std::sync::Arc;

use les_core::SolverKind;

use crate::adapter::BackendSolver;
use crate::solvers::{DummySolver, FractionalKnapsackSolver};

/// Produces a fresh adapter per call.
pub type SolverFactory = Arc<dyn Fn() -> Box<dyn BackendSolver> + Send + Sync>;

/// Adapters that ship with the crate. Adding a backend is an edit here.
const BUILTIN: &[(SolverKind, fn() -> Box<dyn BackendSolver>)] = &[
    (SolverKind::Dummy, DummySolver::boxed),
    (SolverKind::FractionalKnapsack, FractionalKnapsackSolver::boxed),
];

/// Maps a solver kind to the factory of its adapter.
#[derive(Clone)]
pub struct BackendRegistry {
    factories: BTreeMap<SolverKind, SolverFactory>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Registry holding every in-process adapter.
    pub fn builtin() -> Self {
        let factories = BUILTIN
            .iter()
            .map(|&(kind, factory)| (kind, Arc::new(factory) as SolverFactory))
            .collect();
        Self { factories }
    }

    /// Register a factory for a kind. Returns error if the kind is taken.
    pub fn register<F>(&mut self, kind: SolverKind, factory: F) -> Result<(), RegistryError>
    where
        F: Fn() -> Box<dyn BackendSolver> + Send + Sync + 'static,
    {
        if self.factories.contains_key(&kind) {
            return Err(RegistryError::DuplicateKind(kind));
        }
        self.factories.insert(kind, Arc::new(factory));
        Ok(())
    }

    /// Instantiate a fresh adapter for `kind`.
    pub fn get_instance(&self, kind: SolverKind) -> Result<Box<dyn BackendSolver>, RegistryError> {
        self.factories
            .get(&kind)
            .map(|factory| factory())
            .ok_or(RegistryError::UnknownBackend(kind))
    }

    pub fn contains(&self, kind: SolverKind) -> bool {
        self.factories.contains_key(&kind)
    }

    /// Registered kinds, in ordinal order.
    pub fn kinds(&self) -> Vec<SolverKind> {
        self.factories.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    #[error("no backend registered for solver kind {0}")]
    UnknownBackend(SolverKind),

    #[error("backend for solver kind {0} is already registered")]
    DuplicateKind(SolverKind),
}
