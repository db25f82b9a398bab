//! Minimum variance at a required expected return.

use nalgebra::DVector;

use frontier_math::optimization::{linear_range, minimize_quadratic, CappedSimplex};
use frontier_math::solvers::{bisection, expand_bracket};
use frontier_math::MathError;

use super::{MeanVarianceOptimizer, OptimizationResult, Solved};
use crate::covariance::CovarianceModel;
use crate::error::{OptimizationError, PortfolioResult};
use crate::types::{Objective, WeightBounds};

/// Doublings allowed while bracketing the risk-aversion parameter.
const MAX_BRACKET_EXPANSIONS: u32 = 64;

/// Checks a requested target return is an annual decimal fraction in (0, 1).
pub fn validate_target_return(target: f64) -> PortfolioResult<()> {
    if !target.is_finite() || target <= 0.0 || target >= 1.0 {
        return Err(OptimizationError::validation(
            "target_return",
            format!("must be an annual decimal fraction in (0, 1), got {target}"),
        ));
    }
    Ok(())
}

impl MeanVarianceOptimizer {
    /// Weights minimizing `wᵀΣw` subject to `μᵀw = target` and the bounds.
    ///
    /// `target` is validated before anything is solved. A target outside the
    /// achievable return range under the bounds is infeasible.
    pub fn target_return(
        &self,
        model: &CovarianceModel,
        target: f64,
        bounds: &WeightBounds,
    ) -> PortfolioResult<OptimizationResult> {
        validate_target_return(target)?;
        let set = bounds.feasible_set(model.len())?;
        let solved = self.solve_target(model, &set, target, None)?;

        if !solved.converged {
            tracing::warn!(target, iterations = solved.iterations, "target return search did not converge");
        }
        Ok(OptimizationResult::evaluate(
            model,
            Objective::TargetReturn,
            &solved.weights,
            solved.converged,
            solved.iterations,
        ))
    }

    /// Solves `min wᵀΣw − λμᵀw` for the λ at which `μᵀw = target`.
    ///
    /// `μᵀw(λ)` is non-decreasing in λ and reaches both ends of the achievable
    /// range at finite λ, so bracketing plus bisection always finds it. Gaps
    /// within `target_return_tolerance` count as exact.
    pub(crate) fn solve_target(
        &self,
        model: &CovarianceModel,
        set: &CappedSimplex,
        target: f64,
        warm_start: Option<&DVector<f64>>,
    ) -> PortfolioResult<Solved> {
        let mu = model.expected_returns();
        let cov = model.covariance();
        let tolerance = self.settings.target_return_tolerance;

        let (lowest, highest) = linear_range(mu.as_slice(), set)?;
        if target < lowest - tolerance || target > highest + tolerance {
            return Err(OptimizationError::infeasible(format!(
                "target return {target:.4} is outside the achievable range [{lowest:.4}, {highest:.4}] under the weight bounds"
            )));
        }
        if highest - lowest <= tolerance {
            // Every feasible portfolio has the same return
            return self.minimum_variance_weights(model, set);
        }
        let target = target.clamp(lowest, highest);

        let qp = self.settings.qp_config();
        let mut start = warm_start.cloned().unwrap_or_else(|| set.center());
        let mut closest: Option<(f64, f64)> = None;
        let mut failure: Option<MathError> = None;

        let mut gap = |lambda: f64| -> f64 {
            let linear = mu * -lambda;
            match minimize_quadratic(cov, &linear, set, &start, &qp) {
                Ok(solution) => {
                    let w = DVector::from_vec(solution.parameters);
                    let gap = mu.dot(&w) - target;
                    if closest.map_or(true, |(_, best)| gap.abs() < best) {
                        closest = Some((lambda, gap.abs()));
                    }
                    start = w;
                    if gap.abs() <= tolerance {
                        0.0
                    } else {
                        gap
                    }
                }
                Err(e) => {
                    failure.get_or_insert(e);
                    f64::NAN
                }
            }
        };

        let search = expand_bracket(&mut gap, -1.0, 1.0, MAX_BRACKET_EXPANSIONS).and_then(
            |(lo, hi)| bisection(&mut gap, lo, hi, &self.settings.target_search_config()),
        );

        if let Some(e) = failure {
            return Err(e.into());
        }
        let (lambda, search_converged) = match search {
            Ok(result) => (result.root, true),
            Err(MathError::ConvergenceFailed { .. } | MathError::InvalidBracket { .. }) => {
                match closest {
                    Some((lambda, _)) => (lambda, false),
                    None => {
                        return Err(OptimizationError::numerical(
                            "target return search produced no candidate",
                        ))
                    }
                }
            }
            Err(e) => return Err(e.into()),
        };

        let solution = minimize_quadratic(cov, &(mu * -lambda), set, &start, &qp)?;
        tracing::debug!(target, lambda, iterations = solution.iterations, "target return solved");

        Ok(Solved {
            weights: DVector::from_vec(solution.parameters),
            converged: search_converged && solution.converged,
            iterations: solution.iterations,
        })
    }
}
