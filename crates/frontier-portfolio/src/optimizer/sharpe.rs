//! Maximum-Sharpe (tangency) portfolio.

use nalgebra::DVector;

use frontier_math::linear_algebra::solve_spd;
use frontier_math::optimization::{greedy_linear_allocation, CappedSimplex};

use super::{MeanVarianceOptimizer, OptimizationResult};
use crate::covariance::CovarianceModel;
use crate::error::{OptimizationError, PortfolioResult};
use crate::types::{Objective, WeightBounds};

/// Backtracking gives up below this step length.
const MIN_STEP: f64 = 1e-14;

/// Checks a risk-free rate is a plausible annual decimal fraction.
pub fn validate_risk_free_rate(risk_free_rate: f64) -> PortfolioResult<()> {
    if !risk_free_rate.is_finite() || risk_free_rate <= -1.0 || risk_free_rate >= 1.0 {
        return Err(OptimizationError::validation(
            "risk_free_rate",
            format!("must be a decimal fraction in (-1, 1), got {risk_free_rate}"),
        ));
    }
    Ok(())
}

impl MeanVarianceOptimizer {
    /// Weights maximizing `(μᵀw − rf) / sqrt(wᵀΣw)` under the bounds.
    ///
    /// Starts from the closed-form tangency weights `Σ⁻¹(μ − rf) / 1ᵀΣ⁻¹(μ − rf)`
    /// projected into the feasible set, or from the highest-return allocation
    /// when that seed has no positive excess return. Each iteration takes a
    /// projected gradient step, halving it until the ratio improves. Stops
    /// when the improvement falls below `sharpe_tolerance`.
    pub fn maximize_sharpe(
        &self,
        model: &CovarianceModel,
        risk_free_rate: f64,
        bounds: &WeightBounds,
    ) -> PortfolioResult<OptimizationResult> {
        validate_risk_free_rate(risk_free_rate)?;
        let set = bounds.feasible_set(model.len())?;

        let mu = model.expected_returns();
        let cov = model.covariance();
        let sharpe = |w: &DVector<f64>| {
            model
                .sharpe_ratio(w, risk_free_rate)
                .unwrap_or(f64::NEG_INFINITY)
        };

        let mut w = tangency_seed(model, &set, risk_free_rate)?;
        let mut current = sharpe(&w);
        let mut step = 1.0;
        let mut converged = false;
        let mut iterations = 0;

        for iteration in 1..=self.settings.sharpe_max_iterations {
            iterations = iteration;

            let marginal = cov * &w;
            let variance = w.dot(&marginal);
            if variance <= 0.0 {
                converged = true;
                break;
            }
            let risk = variance.sqrt();
            let excess = mu.dot(&w) - risk_free_rate;
            let gradient = mu / risk - marginal * (excess / (risk * variance));

            let mut accepted = None;
            while step >= MIN_STEP {
                let candidate = set.project(&(&w + &gradient * step));
                let value = sharpe(&candidate);
                if value > current {
                    accepted = Some((candidate, value));
                    break;
                }
                step *= 0.5;
            }

            let Some((candidate, value)) = accepted else {
                // No step length improves the ratio
                converged = true;
                break;
            };
            let improvement = value - current;
            w = candidate;
            current = value;
            if improvement < self.settings.sharpe_tolerance {
                converged = true;
                break;
            }
            step *= 2.0;
        }

        if converged {
            tracing::debug!(iterations, sharpe = current, "tangency portfolio solved");
        } else {
            tracing::warn!(iterations, sharpe = current, "tangency search hit its iteration cap");
        }

        Ok(OptimizationResult::evaluate(
            model,
            Objective::MaximumSharpe,
            &w,
            converged,
            iterations,
        )
        .with_risk_free_rate(risk_free_rate))
    }
}

fn tangency_seed(
    model: &CovarianceModel,
    set: &CappedSimplex,
    risk_free_rate: f64,
) -> PortfolioResult<DVector<f64>> {
    let mu = model.expected_returns();
    let excess = mu.add_scalar(-risk_free_rate);

    let closed_form = solve_spd(model.covariance(), &excess).ok().and_then(|x| {
        let total = x.sum();
        (total.is_finite() && total.abs() > f64::EPSILON).then(|| set.project(&(x / total)))
    });

    if let Some(w) = closed_form {
        if w.iter().all(|v| v.is_finite()) && mu.dot(&w) - risk_free_rate > 0.0 {
            return Ok(w);
        }
    }

    tracing::debug!("closed-form tangency seed unusable, starting from the highest-return allocation");
    Ok(greedy_linear_allocation(mu.as_slice(), set, true)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::test_support::{assert_feasible, standard_model};
    use approx::assert_relative_eq;

    #[test]
    fn test_beats_other_portfolios() {
        let model = standard_model(&["uk_equity", "us_equity", "bond", "international_equity"]);
        let optimizer = MeanVarianceOptimizer::default();
        let bounds = WeightBounds::default();

        let tangency = optimizer.maximize_sharpe(&model, 0.045, &bounds).unwrap();
        let min_var = optimizer.minimize_variance(&model, &bounds).unwrap();
        let current = DVector::from_vec(vec![0.25, 0.30, 0.20, 0.25]);

        assert_feasible(&tangency.weights, 0.0, 1.0);
        let sharpe = tangency.sharpe_ratio.unwrap();
        assert!(sharpe > 0.0);
        assert!(tangency.expected_return > 0.045);
        assert!(sharpe >= model.sharpe_ratio(&current, 0.045).unwrap() - 1e-9);
        assert!(sharpe >= model.sharpe_ratio(&min_var.weight_vector(), 0.045).unwrap() - 1e-9);
    }

    #[test]
    fn test_uncorrelated_pair_matches_closed_form() {
        // Cash (σ 1%) and UK equity are uncorrelated; tangency is interior so
        // the closed form is the answer.
        let model = standard_model(&["uk_equity", "cash"]);
        let rf = 0.01;
        let result = MeanVarianceOptimizer::default()
            .maximize_sharpe(&model, rf, &WeightBounds::default())
            .unwrap();

        let raw = [(0.07 - rf) / 0.0256, (0.02 - rf) / 0.0001];
        let expected = raw[0] / (raw[0] + raw[1]);
        assert_relative_eq!(result.weights[0], expected, epsilon = 1e-6);
    }

    #[test]
    fn test_rejects_absurd_risk_free_rate() {
        let model = standard_model(&["uk_equity", "bond"]);
        let err = MeanVarianceOptimizer::default()
            .maximize_sharpe(&model, 1.5, &WeightBounds::default())
            .unwrap_err();
        assert!(matches!(err, OptimizationError::Validation { .. }));
    }

    #[test]
    fn test_respects_caps() {
        let model = standard_model(&["uk_equity", "us_equity", "bond", "cash", "alternative"]);
        let result = MeanVarianceOptimizer::default()
            .maximize_sharpe(&model, 0.03, &WeightBounds::new(0.05, 0.35).unwrap())
            .unwrap();
        assert_feasible(&result.weights, 0.05, 0.35);
    }
}
