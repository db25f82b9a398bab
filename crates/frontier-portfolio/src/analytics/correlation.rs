//! Pairwise correlation statistics.

use serde::{Deserialize, Serialize};

use frontier_traits::HoldingId;

use crate::covariance::CovarianceModel;
use crate::error::{OptimizationError, PortfolioResult};
use crate::types::AssetClass;

/// Correlation between two holdings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationPair {
    /// First holding (earlier in model order).
    pub first: HoldingId,
    /// Asset class of the first holding.
    pub first_class: AssetClass,
    /// Second holding.
    pub second: HoldingId,
    /// Asset class of the second holding.
    pub second_class: AssetClass,
    /// Their correlation.
    pub correlation: f64,
}

/// Average and extremes of the off-diagonal correlations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationSummary {
    /// Mean over all distinct pairs.
    pub average: f64,
    /// Most correlated pair (first in row order on ties).
    pub max: CorrelationPair,
    /// Least correlated pair (first in row order on ties).
    pub min: CorrelationPair,
    /// Number of distinct pairs.
    pub pairs: usize,
}

/// Summarizes the holding-level correlation matrix.
pub fn correlation_summary(model: &CovarianceModel) -> PortfolioResult<CorrelationSummary> {
    let n = model.len();
    if n < 2 {
        return Err(OptimizationError::insufficient_data(
            "need at least two holdings to compare",
        ));
    }

    let corr = model.correlation();
    let mut total = 0.0;
    let mut max = (0, 1);
    let mut min = (0, 1);
    for i in 0..n {
        for j in i + 1..n {
            let rho = corr[(i, j)];
            total += rho;
            if rho > corr[max] {
                max = (i, j);
            }
            if rho < corr[min] {
                min = (i, j);
            }
        }
    }

    let pair = |(i, j): (usize, usize)| CorrelationPair {
        first: model.holding_ids()[i].clone(),
        first_class: model.asset_classes()[i].clone(),
        second: model.holding_ids()[j].clone(),
        second_class: model.asset_classes()[j].clone(),
        correlation: corr[(i, j)],
    };
    let pairs = n * (n - 1) / 2;

    Ok(CorrelationSummary {
        average: total / pairs as f64,
        max: pair(max),
        min: pair(min),
        pairs,
    })
}
