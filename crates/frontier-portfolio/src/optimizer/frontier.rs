//! Efficient frontier and searches along it.

use serde::{Deserialize, Serialize};

use frontier_math::optimization::linear_range;
use frontier_math::solvers::{bisection, SolverConfig};
use frontier_math::MathError;

use super::{sharpe_ratio, MeanVarianceOptimizer, OptimizationResult, Solved};
use crate::covariance::CovarianceModel;
use crate::error::{OptimizationError, PortfolioResult};
use crate::types::{Objective, WeightBounds};

/// Return ranges narrower than this collapse the frontier to one point.
const DEGENERATE_RANGE: f64 = 1e-9;

/// One point of the efficient frontier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrontierPoint {
    /// Requested return.
    pub target_return: f64,
    /// Achieved expected return.
    pub expected_return: f64,
    /// Volatility.
    pub expected_risk: f64,
    /// Sharpe ratio, when a risk-free rate applies.
    pub sharpe_ratio: Option<f64>,
    /// Weights in model order.
    pub weights: Vec<f64>,
    /// Whether the solve met its tolerance.
    pub converged: bool,
}

impl FrontierPoint {
    fn from_result(target_return: f64, result: &OptimizationResult) -> Self {
        Self {
            target_return,
            expected_return: result.expected_return,
            expected_risk: result.expected_risk,
            sharpe_ratio: result.sharpe_ratio,
            weights: result.weights.clone(),
            converged: result.converged,
        }
    }
}

/// Frontier points from the minimum-variance portfolio to the maximum return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EfficientFrontier {
    /// Points in increasing target return.
    pub points: Vec<FrontierPoint>,
    /// The first point's full result.
    pub minimum_variance: OptimizationResult,
    /// Highest return achievable under the bounds.
    pub max_return: f64,
    /// True when every feasible portfolio has the same return.
    pub collapsed: bool,
}

impl EfficientFrontier {
    /// Attaches Sharpe ratios against `risk_free_rate` to every point.
    #[must_use]
    pub fn with_risk_free_rate(mut self, risk_free_rate: f64) -> Self {
        for point in &mut self.points {
            point.sharpe_ratio = sharpe_ratio(point.expected_return, point.expected_risk, risk_free_rate);
        }
        self.minimum_variance = self.minimum_variance.with_risk_free_rate(risk_free_rate);
        self
    }

    /// Largest volatility on the frontier.
    #[must_use]
    pub fn max_risk(&self) -> f64 {
        self.points.iter().map(|p| p.expected_risk).fold(0.0, f64::max)
    }
}

impl MeanVarianceOptimizer {
    /// `num_points` frontier portfolios with evenly spaced target returns.
    ///
    /// The first point is the minimum-variance portfolio and the last reaches
    /// the highest return achievable under the bounds. When that range is
    /// degenerate the frontier is the single minimum-variance point.
    pub fn frontier(
        &self,
        model: &CovarianceModel,
        bounds: &WeightBounds,
        num_points: usize,
    ) -> PortfolioResult<EfficientFrontier> {
        if num_points < 2 {
            return Err(OptimizationError::validation(
                "num_points",
                format!("a frontier needs at least 2 points, got {num_points}"),
            ));
        }

        let set = bounds.feasible_set(model.len())?;
        let minimum_variance = self.minimize_variance(model, bounds)?;
        let (_, max_return) = linear_range(model.expected_returns().as_slice(), &set)?;
        let start = minimum_variance.expected_return;

        if max_return - start <= DEGENERATE_RANGE {
            tracing::debug!(start, max_return, "frontier collapsed to a single point");
            return Ok(EfficientFrontier {
                points: vec![FrontierPoint::from_result(start, &minimum_variance)],
                minimum_variance,
                max_return,
                collapsed: true,
            });
        }

        let mut points = Vec::with_capacity(num_points);
        points.push(FrontierPoint::from_result(start, &minimum_variance));
        let mut previous = minimum_variance.weight_vector();
        let step = (max_return - start) / (num_points - 1) as f64;

        for k in 1..num_points {
            let target = if k == num_points - 1 {
                max_return
            } else {
                start + step * k as f64
            };
            let solved = self.solve_target(model, &set, target, Some(&previous))?;
            let result = OptimizationResult::evaluate(
                model,
                Objective::TargetReturn,
                &solved.weights,
                solved.converged,
                solved.iterations,
            );
            points.push(FrontierPoint::from_result(target, &result));
            previous = solved.weights;
        }

        let unconverged = points.iter().filter(|p| !p.converged).count();
        if unconverged > 0 {
            tracing::warn!(unconverged, num_points, "some frontier points did not converge");
        }
        tracing::debug!(num_points, start, max_return, "frontier computed");

        Ok(EfficientFrontier {
            points,
            minimum_variance,
            max_return,
            collapsed: false,
        })
    }

    /// Least-risk portfolio with return at least `required_return`.
    ///
    /// Below the minimum-variance return that portfolio is the
    /// minimum-variance one itself.
    pub fn risk_at_return(
        &self,
        model: &CovarianceModel,
        bounds: &WeightBounds,
        required_return: f64,
    ) -> PortfolioResult<OptimizationResult> {
        let set = bounds.feasible_set(model.len())?;
        let minimum_variance = self.minimize_variance(model, bounds)?;
        if required_return <= minimum_variance.expected_return {
            return Ok(minimum_variance);
        }

        let solved = self.solve_target(model, &set, required_return, None)?;
        Ok(OptimizationResult::evaluate(
            model,
            Objective::TargetReturn,
            &solved.weights,
            solved.converged,
            solved.iterations,
        ))
    }

    /// Highest-return frontier portfolio with volatility at most `risk`.
    ///
    /// Bisects on the target return, since frontier volatility increases
    /// with it. Risk below the minimum variance yields the minimum-variance
    /// portfolio and risk above the top of the frontier the maximum-return one.
    pub fn return_at_risk(
        &self,
        model: &CovarianceModel,
        bounds: &WeightBounds,
        risk: f64,
    ) -> PortfolioResult<OptimizationResult> {
        let set = bounds.feasible_set(model.len())?;
        let minimum_variance = self.minimize_variance(model, bounds)?;
        let (_, max_return) = linear_range(model.expected_returns().as_slice(), &set)?;
        let start = minimum_variance.expected_return;

        if risk <= minimum_variance.expected_risk || max_return - start <= DEGENERATE_RANGE {
            return Ok(minimum_variance);
        }

        let top = self.solve_target(model, &set, max_return, None)?;
        if risk >= model.portfolio_risk(&top.weights) {
            return Ok(OptimizationResult::evaluate(
                model,
                Objective::TargetReturn,
                &top.weights,
                top.converged,
                top.iterations,
            ));
        }

        let mut warm = minimum_variance.weight_vector();
        // Highest-return evaluated portfolio within the risk budget
        let mut best: Option<Solved> = None;
        let mut failure: Option<OptimizationError> = None;
        let mut excess_risk = |target: f64| -> f64 {
            match self.solve_target(model, &set, target, Some(&warm)) {
                Ok(solved) => {
                    let gap = model.portfolio_risk(&solved.weights) - risk;
                    let improves = best.as_ref().map_or(true, |b| {
                        model.portfolio_return(&solved.weights) > model.portfolio_return(&b.weights)
                    });
                    if gap <= 0.0 && improves {
                        best = Some(Solved {
                            weights: solved.weights.clone(),
                            converged: false,
                            iterations: solved.iterations,
                        });
                    }
                    warm = solved.weights;
                    gap
                }
                Err(e) => {
                    failure.get_or_insert(e);
                    f64::NAN
                }
            }
        };

        let config = SolverConfig::new(
            self.settings.target_return_tolerance,
            self.settings.target_return_max_iterations,
        );
        let search = bisection(&mut excess_risk, start, max_return, &config);

        if let Some(e) = failure {
            return Err(e);
        }
        let target = match search {
            Ok(result) => result.root,
            Err(MathError::ConvergenceFailed { .. }) => {
                tracing::warn!(risk, "return-at-risk search hit its iteration cap");
                let weights = best.map_or_else(|| minimum_variance.weight_vector(), |b| b.weights);
                return Ok(OptimizationResult::evaluate(
                    model,
                    Objective::TargetReturn,
                    &weights,
                    false,
                    self.settings.target_return_max_iterations,
                ));
            }
            Err(e) => return Err(e.into()),
        };

        let solved = self.solve_target(model, &set, target, Some(&warm))?;
        Ok(OptimizationResult::evaluate(
            model,
            Objective::TargetReturn,
            &solved.weights,
            solved.converged,
            solved.iterations,
        ))
    }
}
