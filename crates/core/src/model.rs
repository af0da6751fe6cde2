//! Model parameters handed to a backend, and the solution it returns.
//!
//! The executor treats both as opaque payloads; only backend adapters look
//! inside.

use serde::{Deserialize, Serialize};

use crate::error::ModelLoadError;

/// Relation between a constraint row and its right-hand side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sense {
    LessEqual,
    GreaterEqual,
    Equal,
}

/// One sparse constraint row: `sum(coef * x[col]) <sense> rhs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub coefficients: Vec<(usize, f64)>,
    pub sense: Sense,
    pub rhs: f64,
}

impl Constraint {
    pub fn new(coefficients: Vec<(usize, f64)>, sense: Sense, rhs: f64) -> Self {
        Self {
            coefficients,
            sense,
            rhs,
        }
    }

    /// Evaluate the left-hand side for the given variable values.
    pub fn activity(&self, values: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .map(|&(col, coef)| coef * values.get(col).copied().unwrap_or(0.0))
            .sum()
    }
}

/// Parameters of a linear (mixed-integer) program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_maximize")]
    pub maximize: bool,
    pub objective: Vec<f64>,
    #[serde(default)]
    pub constraints: Vec<Constraint>,
    pub lower_bounds: Vec<f64>,
    pub upper_bounds: Vec<f64>,
    /// Integrality flags per variable. Empty means all continuous.
    #[serde(default)]
    pub integer: Vec<bool>,
}

fn default_maximize() -> bool { true }

impl ModelParams {
    pub fn num_vars(&self) -> usize {
        self.objective.len()
    }

    /// Check the parameters are internally consistent.
    pub fn validate(&self) -> Result<(), ModelLoadError> {
        let n = self.num_vars();
        if n == 0 {
            return Err(ModelLoadError::Empty);
        }
        for (field, len) in [
            ("lower_bounds", self.lower_bounds.len()),
            ("upper_bounds", self.upper_bounds.len()),
        ] {
            if len != n {
                return Err(ModelLoadError::DimensionMismatch {
                    field,
                    expected: n,
                    actual: len,
                });
            }
        }
        if !self.integer.is_empty() && self.integer.len() != n {
            return Err(ModelLoadError::DimensionMismatch {
                field: "integer",
                expected: n,
                actual: self.integer.len(),
            });
        }
        if self.objective.iter().any(|c| !c.is_finite()) {
            return Err(ModelLoadError::NonFinite("objective"));
        }
        for (i, (lo, up)) in self.lower_bounds.iter().zip(&self.upper_bounds).enumerate() {
            if lo.is_nan() || up.is_nan() {
                return Err(ModelLoadError::NonFinite("bounds"));
            }
            if lo > up {
                return Err(ModelLoadError::InvertedBounds(i));
            }
        }
        for (row, constraint) in self.constraints.iter().enumerate() {
            if !constraint.rhs.is_finite() {
                return Err(ModelLoadError::NonFinite("constraint rhs"));
            }
            for &(column, coef) in &constraint.coefficients {
                if column >= n {
                    return Err(ModelLoadError::ColumnOutOfRange {
                        row,
                        column,
                        num_vars: n,
                    });
                }
                if !coef.is_finite() {
                    return Err(ModelLoadError::NonFinite("constraint coefficients"));
                }
            }
        }
        Ok(())
    }

    /// Objective value of the given assignment.
    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.objective.iter().zip(values).map(|(c, x)| c * x).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolutionStatus {
    Optimal,
    Feasible,
}

/// What a backend returns after a successful solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub status: SolutionStatus,
    pub objective_value: f64,
    pub variable_values: Vec<f64>,
}
