//! Risk contribution by holding and by asset class.

use std::collections::BTreeMap;

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use frontier_traits::HoldingId;

use crate::covariance::CovarianceModel;
use crate::types::AssetClass;

/// Contribution of a single holding to portfolio risk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingContribution {
    /// Holding identifier.
    pub holding_id: HoldingId,

    /// Asset class of the holding.
    pub asset_class: AssetClass,

    /// Portfolio weight (0-1).
    pub weight: f64,

    /// Absolute contribution to portfolio volatility.
    pub risk_contribution: f64,

    /// Contribution as a fraction of portfolio volatility.
    pub risk_share: f64,
}

/// Aggregated contribution for an asset class.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BucketContribution {
    /// Number of holdings in this class.
    pub count: usize,

    /// Total weight of the class (0-1).
    pub weight: f64,

    /// Absolute contribution to portfolio volatility.
    pub risk_contribution: f64,

    /// Contribution as a fraction of portfolio volatility.
    pub risk_share: f64,
}

/// Risk decomposition of one weight vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskContributions {
    /// Contributions by holding, in model order.
    pub by_holding: Vec<HoldingContribution>,

    /// Contributions by asset class.
    pub by_class: BTreeMap<AssetClass, BucketContribution>,

    /// Portfolio volatility.
    pub portfolio_risk: f64,
}

impl RiskContributions {
    /// Returns the top N contributors by absolute contribution.
    #[must_use]
    pub fn top_contributors(&self, n: usize) -> Vec<&HoldingContribution> {
        let mut sorted: Vec<&HoldingContribution> = self.by_holding.iter().collect();
        sorted.sort_by(|a, b| {
            b.risk_contribution
                .abs()
                .total_cmp(&a.risk_contribution.abs())
                .then_with(|| a.holding_id.cmp(&b.holding_id))
        });
        sorted.truncate(n);
        sorted
    }

    /// Risk shares in model order.
    #[must_use]
    pub fn shares(&self) -> Vec<f64> {
        self.by_holding.iter().map(|c| c.risk_share).collect()
    }

    /// Largest over smallest absolute contribution, if the smallest is non-zero.
    #[must_use]
    pub fn spread_ratio(&self) -> Option<f64> {
        let (min, max) = self
            .by_holding
            .iter()
            .map(|c| c.risk_contribution)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), rc| {
                (lo.min(rc), hi.max(rc))
            });
        (min > 0.0).then(|| max / min)
    }
}

/// Decomposes the risk of `weights` under `model`.
#[must_use]
pub fn risk_contributions(model: &CovarianceModel, weights: &DVector<f64>) -> RiskContributions {
    let contributions = model.risk_contributions(weights);
    let portfolio_risk = model.portfolio_risk(weights);
    let share = |rc: f64| if portfolio_risk > 0.0 { rc / portfolio_risk } else { 0.0 };

    let by_holding: Vec<HoldingContribution> = model
        .holding_ids()
        .iter()
        .zip(model.asset_classes())
        .enumerate()
        .map(|(i, (id, class))| HoldingContribution {
            holding_id: id.clone(),
            asset_class: class.clone(),
            weight: weights[i],
            risk_contribution: contributions[i],
            risk_share: share(contributions[i]),
        })
        .collect();

    let mut by_class: BTreeMap<AssetClass, BucketContribution> = BTreeMap::new();
    for c in &by_holding {
        let bucket = by_class.entry(c.asset_class.clone()).or_default();
        bucket.count += 1;
        bucket.weight += c.weight;
        bucket.risk_contribution += c.risk_contribution;
        bucket.risk_share += c.risk_share;
    }

    RiskContributions {
        by_holding,
        by_class,
        portfolio_risk,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::covariance::CovarianceMatrixBuilder;
    use crate::statistics::AssetClassStatistics;
    use approx::assert_relative_eq;

    fn model() -> CovarianceModel {
        let stats = AssetClassStatistics::standard();
        CovarianceMatrixBuilder::new(&stats)
            .build_for(
                vec!["h1".into(), "h2".into(), "h3".into()],
                vec!["us_equity".into(), "us_equity".into(), "cash".into()],
            )
            .unwrap()
    }

    #[test]
    fn test_shares_sum_to_one() {
        let w = DVector::from_vec(vec![0.4, 0.4, 0.2]);
        let rc = risk_contributions(&model(), &w);

        assert_relative_eq!(rc.shares().iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(
            rc.by_holding.iter().map(|c| c.risk_contribution).sum::<f64>(),
            rc.portfolio_risk,
            epsilon = 1e-14
        );
    }

    #[test]
    fn test_by_class_aggregation() {
        let w = DVector::from_vec(vec![0.4, 0.4, 0.2]);
        let rc = risk_contributions(&model(), &w);

        let equity = &rc.by_class[&AssetClass::new("us_equity")];
        assert_eq!(equity.count, 2);
        assert_relative_eq!(equity.weight, 0.8, epsilon = 1e-15);
        // Cash is uncorrelated and tiny: equities carry almost all risk
        assert!(equity.risk_share > 0.99);
    }

    #[test]
    fn test_top_contributors() {
        let w = DVector::from_vec(vec![0.5, 0.3, 0.2]);
        let rc = risk_contributions(&model(), &w);

        let top = rc.top_contributors(2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].holding_id.as_str(), "h1");
        assert_eq!(top[1].holding_id.as_str(), "h2");
    }
}
