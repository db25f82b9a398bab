//! Minimum-variance portfolio.

use nalgebra::DVector;

use frontier_math::linear_algebra::solve_spd;
use frontier_math::optimization::{minimize_quadratic, CappedSimplex};

use super::{MeanVarianceOptimizer, OptimizationResult, Solved};
use crate::covariance::CovarianceModel;
use crate::error::PortfolioResult;
use crate::types::{Objective, WeightBounds};

impl MeanVarianceOptimizer {
    /// Weights minimizing `wᵀΣw` under the bounds.
    pub fn minimize_variance(
        &self,
        model: &CovarianceModel,
        bounds: &WeightBounds,
    ) -> PortfolioResult<OptimizationResult> {
        let set = bounds.feasible_set(model.len())?;
        let solved = self.minimum_variance_weights(model, &set)?;

        if !solved.converged {
            tracing::warn!(
                iterations = solved.iterations,
                "minimum variance solve hit its iteration cap"
            );
        }
        Ok(OptimizationResult::evaluate(
            model,
            Objective::MinimumVariance,
            &solved.weights,
            solved.converged,
            solved.iterations,
        ))
    }

    pub(crate) fn minimum_variance_weights(
        &self,
        model: &CovarianceModel,
        set: &CappedSimplex,
    ) -> PortfolioResult<Solved> {
        let n = model.len();
        let seed = minimum_variance_seed(model, set);
        let solution = minimize_quadratic(
            model.covariance(),
            &DVector::zeros(n),
            set,
            &seed,
            &self.settings.qp_config(),
        )?;

        tracing::debug!(
            iterations = solution.iterations,
            variance = solution.objective_value,
            "minimum variance solved"
        );
        Ok(Solved {
            weights: DVector::from_vec(solution.parameters),
            converged: solution.converged,
            iterations: solution.iterations,
        })
    }
}

/// Unconstrained minimum-variance weights `Σ⁻¹1 / 1ᵀΣ⁻¹1`, projected.
fn minimum_variance_seed(model: &CovarianceModel, set: &CappedSimplex) -> DVector<f64> {
    let ones = DVector::from_element(model.len(), 1.0);
    match solve_spd(model.covariance(), &ones) {
        Ok(x) => {
            let total = x.sum();
            if total.is_finite() && total.abs() > f64::EPSILON {
                set.project(&(x / total))
            } else {
                set.center()
            }
        }
        Err(_) => set.center(),
    }
}
