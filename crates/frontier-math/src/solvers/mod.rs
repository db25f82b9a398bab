//! Root-finding algorithms.
//!
//! The optimizer only needs one-dimensional searches over monotone functions
//! (the return of a parametric frontier solve as a function of its risk
//! aversion, or frontier risk as a function of target return), so this module
//! provides a bracketing step and a bisection solver:
//!
//! - [`expand_bracket`]: grows an interval geometrically until it brackets a root
//! - [`bisection`]: guaranteed convergence once a bracket is known
//!
//! Both accept `FnMut` so callers can warm-start expensive evaluations.
//!
//! # Example
//!
//! ```rust
//! use frontier_math::solvers::{bisection, expand_bracket, SolverConfig};
//!
//! let f = |x: f64| x * x * x - 8.0;
//! let (lo, hi) = expand_bracket(f, -1.0, 1.0, 20).unwrap();
//! let result = bisection(f, lo, hi, &SolverConfig::default()).unwrap();
//! assert!((result.root - 2.0).abs() < 1e-8);
//! ```

mod bisection;

pub use bisection::{bisection, expand_bracket};

/// Default tolerance for root-finding algorithms.
pub const DEFAULT_TOLERANCE: f64 = 1e-10;

/// Default maximum iterations for root-finding algorithms.
pub const DEFAULT_MAX_ITERATIONS: u32 = 200;

/// Configuration for root-finding algorithms.
#[derive(Debug, Clone, Copy)]
pub struct SolverConfig {
    /// Tolerance for convergence, applied to the residual and to the
    /// bracket width relative to the magnitude of the midpoint.
    pub tolerance: f64,
    /// Maximum number of iterations.
    pub max_iterations: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl SolverConfig {
    /// Creates a new solver configuration.
    #[must_use]
    pub fn new(tolerance: f64, max_iterations: u32) -> Self {
        Self {
            tolerance,
            max_iterations,
        }
    }

    /// Sets the tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the maximum iterations.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

/// Result of a root-finding run.
#[derive(Debug, Clone, Copy)]
pub struct SolverResult {
    /// The root found.
    pub root: f64,
    /// Number of iterations used.
    pub iterations: u32,
    /// Final residual (function value at root).
    pub residual: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solver_config() {
        let config = SolverConfig::default()
            .with_tolerance(1e-8)
            .with_max_iterations(50);

        assert!((config.tolerance - 1e-8).abs() < f64::EPSILON);
        assert_eq!(config.max_iterations, 50);
    }
}
