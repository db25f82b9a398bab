//! How far the current portfolio is from the frontier.

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::covariance::CovarianceModel;
use crate::error::PortfolioResult;
use crate::optimizer::{MeanVarianceOptimizer, OptimizationResult};
use crate::types::WeightBounds;

/// Gains available by moving the current portfolio to the frontier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImprovementOpportunities {
    /// Sharpe ratio of the current portfolio.
    pub current_sharpe: Option<f64>,

    /// Sharpe ratio of the tangency portfolio.
    pub optimal_sharpe: Option<f64>,

    /// `optimal_sharpe − current_sharpe`.
    pub sharpe_improvement: Option<f64>,

    /// Highest frontier return at the current risk.
    pub return_at_current_risk: f64,

    /// Extra return available without taking more risk.
    pub additional_return: f64,

    /// Lowest frontier risk at the current return.
    pub risk_at_current_return: f64,

    /// Risk that can be shed without giving up return.
    pub risk_reduction: f64,

    /// Whether the current portfolio is on the frontier.
    pub on_frontier: bool,
}

/// Compares `current` against the frontier under `bounds`.
///
/// `on_frontier` holds when the current return is within `tolerance` of the
/// frontier return at the current risk.
#[allow(clippy::too_many_arguments)]
pub fn improvement_opportunities(
    optimizer: &MeanVarianceOptimizer,
    model: &CovarianceModel,
    bounds: &WeightBounds,
    current: &DVector<f64>,
    tangency: &OptimizationResult,
    risk_free_rate: f64,
    tolerance: f64,
) -> PortfolioResult<ImprovementOpportunities> {
    let current_return = model.portfolio_return(current);
    let current_risk = model.portfolio_risk(current);
    let current_sharpe = model.sharpe_ratio(current, risk_free_rate);

    let at_risk = optimizer.return_at_risk(model, bounds, current_risk)?;
    let at_return = optimizer.risk_at_return(model, bounds, current_return)?;

    let on_frontier = (current_return - at_risk.expected_return).abs() <= tolerance;
    tracing::debug!(
        current_return,
        current_risk,
        frontier_return = at_risk.expected_return,
        on_frontier,
        "compared current portfolio with the frontier"
    );

    Ok(ImprovementOpportunities {
        current_sharpe,
        optimal_sharpe: tangency.sharpe_ratio,
        sharpe_improvement: current_sharpe
            .zip(tangency.sharpe_ratio)
            .map(|(current, optimal)| optimal - current),
        return_at_current_risk: at_risk.expected_return,
        additional_return: (at_risk.expected_return - current_return).max(0.0),
        risk_at_current_return: at_return.expected_risk,
        risk_reduction: (current_risk - at_return.expected_risk).max(0.0),
        on_frontier,
    })
}
