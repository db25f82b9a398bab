//! Constrained mean-variance optimizers.
//!
//! All problems share the feasible set `{Σw = 1, min_weight ≤ w_i ≤ max_weight}`
//! (a capped simplex) and are solved deterministically:
//!
//! | Problem | Method |
//! |---------|--------|
//! | Minimum variance | accelerated projected gradient, seeded from `Σ⁻¹1 / 1ᵀΣ⁻¹1` |
//! | Maximum Sharpe | projected gradient ascent with backtracking, seeded from the closed-form tangency weights |
//! | Target return | `min wᵀΣw − λμᵀw` with λ found by bracketing and bisection |
//! | Risk parity | cyclical coordinate descent on the log-barrier problem |
//! | Frontier | one target-return solve per point |
//!
//! Hitting an iteration cap is not an error: the result carries
//! `converged = false`. Structural infeasibility is.

mod frontier;
mod risk_parity;
mod sharpe;
mod target;
mod variance;

pub use frontier::{EfficientFrontier, FrontierPoint};
pub use sharpe::validate_risk_free_rate;
pub use target::validate_target_return;

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::contribution::{risk_contributions, HoldingContribution};
use crate::covariance::CovarianceModel;
use crate::types::{Objective, OptimizerSettings};

/// Weights and diagnostics of one optimization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// What was optimized.
    pub objective: Objective,

    /// Weight per holding, in model order; sums to one.
    pub weights: Vec<f64>,

    /// Per-holding weight and risk contribution.
    pub allocations: Vec<HoldingContribution>,

    /// Expected annual return.
    pub expected_return: f64,

    /// Annual volatility.
    pub expected_risk: f64,

    /// Sharpe ratio, when a risk-free rate applies.
    pub sharpe_ratio: Option<f64>,

    /// Absolute risk contribution per holding.
    pub risk_contributions: Vec<f64>,

    /// Whether the solver met its tolerance.
    pub converged: bool,

    /// Iterations used by the final solve.
    pub iterations: u32,
}

impl OptimizationResult {
    /// Evaluates `weights` under `model`.
    #[must_use]
    pub fn evaluate(
        model: &CovarianceModel,
        objective: Objective,
        weights: &DVector<f64>,
        converged: bool,
        iterations: u32,
    ) -> Self {
        let contributions = risk_contributions(model, weights);
        Self {
            objective,
            weights: weights.iter().copied().collect(),
            risk_contributions: contributions
                .by_holding
                .iter()
                .map(|c| c.risk_contribution)
                .collect(),
            allocations: contributions.by_holding,
            expected_return: model.portfolio_return(weights),
            expected_risk: contributions.portfolio_risk,
            sharpe_ratio: None,
            converged,
            iterations,
        }
    }

    /// Attaches the Sharpe ratio against `risk_free_rate`.
    #[must_use]
    pub fn with_risk_free_rate(mut self, risk_free_rate: f64) -> Self {
        self.sharpe_ratio = sharpe_ratio(self.expected_return, self.expected_risk, risk_free_rate);
        self
    }

    /// Weights as a vector.
    #[must_use]
    pub fn weight_vector(&self) -> DVector<f64> {
        DVector::from_column_slice(&self.weights)
    }
}

/// `(return − rf) / risk`, or `None` for a riskless portfolio.
#[must_use]
pub fn sharpe_ratio(expected_return: f64, expected_risk: f64, risk_free_rate: f64) -> Option<f64> {
    (expected_risk > 0.0).then(|| (expected_return - risk_free_rate) / expected_risk)
}

/// Raw output of one solve.
#[derive(Debug, Clone)]
pub(crate) struct Solved {
    pub weights: DVector<f64>,
    pub converged: bool,
    pub iterations: u32,
}

/// Solves the mean-variance problems of a [`CovarianceModel`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanVarianceOptimizer {
    settings: OptimizerSettings,
}

impl MeanVarianceOptimizer {
    /// Creates an optimizer with the given settings.
    #[must_use]
    pub fn new(settings: OptimizerSettings) -> Self {
        Self { settings }
    }

    /// The solver settings.
    #[must_use]
    pub fn settings(&self) -> &OptimizerSettings {
        &self.settings
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::covariance::{CovarianceMatrixBuilder, CovarianceModel};
    use crate::statistics::AssetClassStatistics;

    /// Builds a model over the standard table, one holding per class key.
    pub fn standard_model(classes: &[&str]) -> CovarianceModel {
        let stats = AssetClassStatistics::standard();
        let ids = (1..=classes.len()).map(|i| format!("h{i}").into()).collect();
        CovarianceMatrixBuilder::new(&stats)
            .build_for(ids, classes.iter().map(|c| (*c).into()).collect())
            .unwrap()
    }

    /// Asserts the weights sum to one and lie within `[lo, hi]`.
    pub fn assert_feasible(weights: &[f64], lo: f64, hi: f64) {
        let sum: f64 = weights.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6, "weights sum to {sum}");
        for &w in weights {
            assert!(w >= lo - 1e-9 && w <= hi + 1e-9, "weight {w} outside [{lo}, {hi}]");
        }
    }
}
