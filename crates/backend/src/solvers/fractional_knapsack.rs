use std::cmp::Ordering;

use les_core::{
    ModelLoadError, ModelParams, Sense, Solution, SolutionStatus, SolveError, SolverKind,
};
use tracing::debug;

use crate::adapter::BackendSolver;

/// Greedy solver for the LP relaxation of a 0/1 knapsack:
///
/// maximize `sum(v[i] * x[i])` subject to `sum(w[i] * x[i]) <= capacity`,
/// `0 <= x[i] <= 1`, with non-negative values and weights.
#[derive(Debug, Default)]
pub struct FractionalKnapsackSolver {
    items: Vec<Item>,
    capacity: f64,
    loaded: bool,
    solution: Option<Solution>,
}

#[derive(Debug, Clone, Copy)]
struct Item {
    index: usize,
    value: f64,
    weight: f64,
}

impl Item {
    fn ratio(&self) -> f64 {
        if self.weight == 0.0 {
            f64::INFINITY
        } else {
            self.value / self.weight
        }
    }
}

impl FractionalKnapsackSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn boxed() -> Box<dyn BackendSolver> {
        Box::new(Self::new())
    }
}

fn unsupported(reason: &str) -> ModelLoadError {
    ModelLoadError::Unsupported(format!("fractional knapsack: {reason}"))
}

impl BackendSolver for FractionalKnapsackSolver {
    fn kind(&self) -> SolverKind {
        SolverKind::FractionalKnapsack
    }

    fn load_model_params(&mut self, params: &ModelParams) -> Result<(), ModelLoadError> {
        params.validate()?;
        if !params.maximize {
            return Err(unsupported("objective must be maximized"));
        }
        let [constraint] = params.constraints.as_slice() else {
            return Err(unsupported("exactly one constraint required"));
        };
        if constraint.sense != Sense::LessEqual {
            return Err(unsupported("capacity constraint must be <="));
        }
        if params.lower_bounds.iter().any(|&lo| lo != 0.0)
            || params.upper_bounds.iter().any(|&up| up != 1.0)
        {
            return Err(unsupported("variable bounds must be [0, 1]"));
        }

        let mut weights = vec![0.0; params.num_vars()];
        for &(col, coef) in &constraint.coefficients {
            weights[col] += coef;
        }
        if weights.iter().any(|&w| w < 0.0) || params.objective.iter().any(|&v| v < 0.0) {
            return Err(unsupported("values and weights must be non-negative"));
        }

        self.items = params
            .objective
            .iter()
            .zip(weights)
            .enumerate()
            .map(|(index, (&value, weight))| Item {
                index,
                value,
                weight,
            })
            .collect();
        self.capacity = constraint.rhs;
        self.loaded = true;
        self.solution = None;
        Ok(())
    }

    fn solve(&mut self) -> Result<(), SolveError> {
        if !self.loaded {
            return Err(SolveError::NoModel);
        }
        if self.capacity < 0.0 {
            return Err(SolveError::Infeasible);
        }

        let mut order: Vec<Item> = self.items.iter().copied().filter(|i| i.value > 0.0).collect();
        order.sort_by(|a, b| b.ratio().partial_cmp(&a.ratio()).unwrap_or(Ordering::Equal));

        let mut values = vec![0.0; self.items.len()];
        let mut remaining = self.capacity;
        let mut objective_value = 0.0;
        for item in order {
            let take = if item.weight <= remaining {
                1.0
            } else {
                remaining / item.weight
            };
            if take <= 0.0 {
                break;
            }
            values[item.index] = take;
            remaining -= take * item.weight;
            objective_value += take * item.value;
        }

        debug!(items = self.items.len(), objective_value, "fractional knapsack solved");
        self.solution = Some(Solution {
            status: SolutionStatus::Optimal,
            objective_value,
            variable_values: values,
        });
        Ok(())
    }

    fn get_solution(&self) -> Option<&Solution> {
        self.solution.as_ref()
    }
}
