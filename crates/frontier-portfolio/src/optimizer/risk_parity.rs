//! Equal risk contribution portfolio.

use nalgebra::DVector;

use super::{MeanVarianceOptimizer, OptimizationResult};
use crate::covariance::CovarianceModel;
use crate::error::PortfolioResult;
use crate::types::{Objective, WeightBounds};

/// Bound check slack for the unconstrained solution.
const BOUND_SLACK: f64 = 1e-12;

impl MeanVarianceOptimizer {
    /// Weights whose risk contributions are equal.
    ///
    /// Cyclical coordinate descent on `½yᵀΣy − Σ ln(y_i) / n`, whose
    /// minimizer has equal contributions once normalized. Each coordinate
    /// update is the positive root of `Σ_ii y² + a y − 1/n = 0` with
    /// `a = Σ_{j≠i} Σ_ij y_j`. A sweep converges when the spread of
    /// contributions is within `risk_parity_tolerance` of their mean.
    ///
    /// Returns the best iterate flagged `converged = false` when the sweep cap
    /// is hit or when the bounds force the solution to be projected.
    pub fn risk_parity(
        &self,
        model: &CovarianceModel,
        bounds: &WeightBounds,
    ) -> PortfolioResult<OptimizationResult> {
        let n = model.len();
        let set = bounds.feasible_set(n)?;
        let cov = model.covariance();
        let budget = 1.0 / n as f64;

        let mut y: DVector<f64> = model.volatilities().map(|v| 1.0 / v);
        let mut best = (f64::INFINITY, y.clone() / y.sum());
        let mut converged = false;
        let mut sweeps = 0;

        for sweep in 1..=self.settings.risk_parity_max_sweeps {
            sweeps = sweep;
            for i in 0..n {
                let diagonal = cov[(i, i)];
                let cross = cov.row(i).transpose().dot(&y) - diagonal * y[i];
                y[i] = (-cross + (cross * cross + 4.0 * diagonal * budget).sqrt()) / (2.0 * diagonal);
            }

            let w = &y / y.sum();
            let spread = relative_spread(&model.risk_contributions(&w));
            if spread < best.0 {
                best = (spread, w);
            }
            if spread <= self.settings.risk_parity_tolerance {
                converged = true;
                break;
            }
        }

        let (spread, mut w) = best;
        if !set.contains(&w, BOUND_SLACK) {
            tracing::warn!(
                min_weight = bounds.min_weight(),
                max_weight = bounds.max_weight(),
                "risk parity solution violates the weight bounds, projecting"
            );
            w = set.project(&w);
            converged = false;
        }

        if converged {
            tracing::debug!(sweeps, spread, "risk parity solved");
        } else {
            tracing::warn!(sweeps, spread, "risk parity returned its best iterate without converging");
        }

        Ok(OptimizationResult::evaluate(
            model,
            Objective::RiskParity,
            &w,
            converged,
            sweeps,
        ))
    }
}

/// `(max RC − min RC) / mean RC`.
fn relative_spread(contributions: &DVector<f64>) -> f64 {
    let mean = contributions.mean();
    if mean <= 0.0 {
        return f64::INFINITY;
    }
    (contributions.max() - contributions.min()) / mean
}
