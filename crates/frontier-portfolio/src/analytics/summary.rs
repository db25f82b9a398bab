//! Summary of an arbitrary (typically the current) portfolio.

use std::collections::BTreeMap;

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::contribution::{risk_contributions, BucketContribution, HoldingContribution};
use crate::covariance::CovarianceModel;
use crate::optimizer::sharpe_ratio;
use crate::types::AssetClass;

/// Return, risk and risk decomposition of a weight vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    /// Expected annual return.
    pub expected_return: f64,

    /// Annual volatility.
    pub expected_risk: f64,

    /// Sharpe ratio against the request's risk-free rate.
    pub sharpe_ratio: Option<f64>,

    /// Per-holding weight and risk contribution.
    pub allocations: Vec<HoldingContribution>,

    /// Weight and risk contribution per asset class.
    pub by_class: BTreeMap<AssetClass, BucketContribution>,
}

/// Summarizes `weights` under `model`.
#[must_use]
pub fn summarize_portfolio(
    model: &CovarianceModel,
    weights: &DVector<f64>,
    risk_free_rate: f64,
) -> PortfolioSummary {
    let contributions = risk_contributions(model, weights);
    let expected_return = model.portfolio_return(weights);

    PortfolioSummary {
        expected_return,
        expected_risk: contributions.portfolio_risk,
        sharpe_ratio: sharpe_ratio(expected_return, contributions.portfolio_risk, risk_free_rate),
        allocations: contributions.by_holding,
        by_class: contributions.by_class,
    }
}
