//! Diversification metrics.

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::covariance::CovarianceModel;

/// How concentrated a portfolio is, in weight and in risk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiversificationMetrics {
    /// `1 / Σ s_i²` over risk shares `s_i`: the number of equally risky,
    /// independent positions with the same risk concentration.
    pub effective_bets: f64,

    /// `Σ w_i σ_i / σ_p`; 1 means no diversification benefit.
    pub diversification_ratio: f64,

    /// Herfindahl index of the weights, `Σ w_i²`.
    pub weight_concentration: f64,

    /// `1 / Σ w_i²`.
    pub effective_holdings: f64,
}

/// Computes diversification metrics for `weights`.
#[must_use]
pub fn diversification_metrics(
    model: &CovarianceModel,
    weights: &DVector<f64>,
) -> DiversificationMetrics {
    let risk = model.portfolio_risk(weights);
    let contributions = model.risk_contributions(weights);

    let risk_concentration = if risk > 0.0 {
        contributions.iter().map(|rc| (rc / risk).powi(2)).sum::<f64>()
    } else {
        0.0
    };
    let weight_concentration = weights.norm_squared();
    let inverse = |x: f64| if x > 0.0 { 1.0 / x } else { 0.0 };

    DiversificationMetrics {
        effective_bets: inverse(risk_concentration),
        diversification_ratio: if risk > 0.0 {
            weights.dot(model.volatilities()) / risk
        } else {
            1.0
        },
        weight_concentration,
        effective_holdings: inverse(weight_concentration),
    }
}
