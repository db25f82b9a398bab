//! Optimization over the capped simplex.
//!
//! Every portfolio problem in Frontier shares the feasible set
//! `{w : Σw = 1, lower ≤ w_i ≤ upper}`. This module provides:
//!
//! - [`CappedSimplex`] / [`project_capped_simplex`]: exact Euclidean projection
//! - [`minimize_quadratic`]: accelerated projected gradient (FISTA with
//!   function-value restart) for `min wᵀQw + cᵀw`
//! - [`greedy_linear_allocation`]: exact solution of linear objectives

mod linear;
mod projection;
mod quadratic;

pub use linear::{greedy_linear_allocation, linear_range};
pub use projection::{project_capped_simplex, CappedSimplex};
pub use quadratic::minimize_quadratic;

/// Configuration for optimization algorithms.
#[derive(Debug, Clone, Copy)]
pub struct OptimizationConfig {
    /// Tolerance for convergence (maximum absolute change of any parameter
    /// between iterations).
    pub tolerance: f64,
    /// Maximum number of iterations.
    pub max_iterations: u32,
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-12,
            max_iterations: 20_000,
        }
    }
}

impl OptimizationConfig {
    /// Creates a new optimization configuration.
    #[must_use]
    pub fn new(tolerance: f64, max_iterations: u32) -> Self {
        Self {
            tolerance,
            max_iterations,
        }
    }
}

/// Result of an optimization run.
#[derive(Debug, Clone)]
pub struct OptimizationResult {
    /// Optimal parameters found.
    pub parameters: Vec<f64>,
    /// Final objective function value.
    pub objective_value: f64,
    /// Number of iterations used.
    pub iterations: u32,
    /// Whether the optimization converged.
    pub converged: bool,
}
