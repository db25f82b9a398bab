//! Configuration for the optimizers.

use frontier_math::optimization::OptimizationConfig;
use frontier_math::solvers::SolverConfig;
use serde::{Deserialize, Serialize};

use crate::error::{OptimizationError, PortfolioResult};

/// Tolerances and iteration caps for every optimizer.
///
/// Iteration caps are the only bound on solver running time; a solve that
/// hits its cap returns its best iterate with `converged = false`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerSettings {
    /// Largest weight change accepted as converged in the quadratic solver.
    pub qp_tolerance: f64,

    /// Iteration cap for one quadratic solve.
    pub qp_max_iterations: u32,

    /// Sharpe ratio improvement below which the tangency search stops.
    pub sharpe_tolerance: f64,

    /// Iteration cap for the tangency search.
    pub sharpe_max_iterations: u32,

    /// Allowed spread of risk contributions, as a fraction of their mean.
    pub risk_parity_tolerance: f64,

    /// Sweep cap for risk parity coordinate descent.
    pub risk_parity_max_sweeps: u32,

    /// Allowed gap between achieved and requested return.
    pub target_return_tolerance: f64,

    /// Bisection cap for the target-return search.
    pub target_return_max_iterations: u32,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            qp_tolerance: 1e-12,
            qp_max_iterations: 20_000,
            sharpe_tolerance: 1e-12,
            sharpe_max_iterations: 5_000,
            risk_parity_tolerance: 0.01,
            risk_parity_max_sweeps: 1_000,
            target_return_tolerance: 1e-9,
            target_return_max_iterations: 200,
        }
    }
}

impl OptimizerSettings {
    /// Creates settings with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the quadratic solver tolerance and cap.
    #[must_use]
    pub fn with_qp(mut self, tolerance: f64, max_iterations: u32) -> Self {
        self.qp_tolerance = tolerance;
        self.qp_max_iterations = max_iterations;
        self
    }

    /// Sets the tangency search tolerance and cap.
    #[must_use]
    pub fn with_sharpe(mut self, tolerance: f64, max_iterations: u32) -> Self {
        self.sharpe_tolerance = tolerance;
        self.sharpe_max_iterations = max_iterations;
        self
    }

    /// Sets the risk parity tolerance and sweep cap.
    #[must_use]
    pub fn with_risk_parity(mut self, tolerance: f64, max_sweeps: u32) -> Self {
        self.risk_parity_tolerance = tolerance;
        self.risk_parity_max_sweeps = max_sweeps;
        self
    }

    /// Sets the target-return tolerance and bisection cap.
    #[must_use]
    pub fn with_target_return(mut self, tolerance: f64, max_iterations: u32) -> Self {
        self.target_return_tolerance = tolerance;
        self.target_return_max_iterations = max_iterations;
        self
    }

    /// Checks every tolerance is positive and every cap non-zero.
    pub fn validate(&self) -> PortfolioResult<()> {
        let tolerances = [
            ("qp_tolerance", self.qp_tolerance),
            ("sharpe_tolerance", self.sharpe_tolerance),
            ("risk_parity_tolerance", self.risk_parity_tolerance),
            ("target_return_tolerance", self.target_return_tolerance),
        ];
        for (field, value) in tolerances {
            if !(value.is_finite() && value > 0.0) {
                return Err(OptimizationError::validation(
                    field,
                    format!("must be a positive number, got {value}"),
                ));
            }
        }

        let caps = [
            ("qp_max_iterations", self.qp_max_iterations),
            ("sharpe_max_iterations", self.sharpe_max_iterations),
            ("risk_parity_max_sweeps", self.risk_parity_max_sweeps),
            ("target_return_max_iterations", self.target_return_max_iterations),
        ];
        for (field, value) in caps {
            if value == 0 {
                return Err(OptimizationError::validation(field, "must be at least 1"));
            }
        }

        Ok(())
    }

    pub(crate) fn qp_config(&self) -> OptimizationConfig {
        OptimizationConfig::new(self.qp_tolerance, self.qp_max_iterations)
    }

    pub(crate) fn target_search_config(&self) -> SolverConfig {
        SolverConfig::new(self.target_return_tolerance, self.target_return_max_iterations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = OptimizerSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.qp_max_iterations, 20_000);
        assert!((settings.risk_parity_tolerance - 0.01).abs() < f64::EPSILON);
    }

    #[test]
    fn test_builder_methods() {
        let settings = OptimizerSettings::new()
            .with_qp(1e-10, 500)
            .with_risk_parity(0.05, 10);

        assert_eq!(settings.qp_max_iterations, 500);
        assert_eq!(settings.risk_parity_max_sweeps, 10);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let err = OptimizerSettings::new().with_sharpe(0.0, 10).validate().unwrap_err();
        assert!(err.to_string().contains("sharpe_tolerance"));

        let err = OptimizerSettings::new().with_qp(1e-12, 0).validate().unwrap_err();
        assert!(err.to_string().contains("qp_max_iterations"));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let settings: OptimizerSettings = toml::from_str("qp_max_iterations = 100").unwrap();
        assert_eq!(settings.qp_max_iterations, 100);
        assert_eq!(settings.sharpe_max_iterations, 5_000);
    }
}
