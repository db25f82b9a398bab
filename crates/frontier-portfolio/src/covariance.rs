//! Holding-level covariance models.
//!
//! Every holding inherits the return, volatility and correlations of its asset
//! class:
//!
//! ```text
//! Σ_ij = σ_i σ_j ρ(class_i, class_j)      i ≠ j, different classes
//! Σ_ij = σ_i σ_j (1 − ε)                  i ≠ j, same class
//! Σ_ii = σ_i²
//! ```
//!
//! Two holdings of the same class would otherwise be perfectly correlated and
//! the matrix singular. The `1 − ε` entry keeps it positive-definite so the
//! closed-form seeds used by the optimizers exist.

use nalgebra::{DMatrix, DVector};

use frontier_math::linear_algebra::{cholesky, ensure_symmetric, quadratic_form};
use frontier_traits::HoldingId;

use crate::error::{OptimizationError, PortfolioResult};
use crate::snapshot::HoldingsSnapshot;
use crate::statistics::AssetClassStatistics;
use crate::types::AssetClass;

/// Default ε for same-class pairs.
pub const SAME_CLASS_EPSILON: f64 = 1e-4;

/// Expected returns, volatilities, correlations and covariance of a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct CovarianceModel {
    holding_ids: Vec<HoldingId>,
    asset_classes: Vec<AssetClass>,
    expected_returns: DVector<f64>,
    volatilities: DVector<f64>,
    correlation: DMatrix<f64>,
    covariance: DMatrix<f64>,
}

impl CovarianceModel {
    /// Number of holdings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.holding_ids.len()
    }

    /// Returns true if the model has no holdings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.holding_ids.is_empty()
    }

    /// Holding ids, in row order.
    #[must_use]
    pub fn holding_ids(&self) -> &[HoldingId] {
        &self.holding_ids
    }

    /// Asset classes, in row order.
    #[must_use]
    pub fn asset_classes(&self) -> &[AssetClass] {
        &self.asset_classes
    }

    /// Expected annual return per holding.
    #[must_use]
    pub fn expected_returns(&self) -> &DVector<f64> {
        &self.expected_returns
    }

    /// Annual volatility per holding.
    #[must_use]
    pub fn volatilities(&self) -> &DVector<f64> {
        &self.volatilities
    }

    /// Holding-level correlation matrix (unit diagonal).
    #[must_use]
    pub fn correlation(&self) -> &DMatrix<f64> {
        &self.correlation
    }

    /// Covariance matrix.
    #[must_use]
    pub fn covariance(&self) -> &DMatrix<f64> {
        &self.covariance
    }

    /// `μᵀw`.
    #[must_use]
    pub fn portfolio_return(&self, weights: &DVector<f64>) -> f64 {
        self.expected_returns.dot(weights)
    }

    /// `wᵀΣw`.
    #[must_use]
    pub fn portfolio_variance(&self, weights: &DVector<f64>) -> f64 {
        quadratic_form(&self.covariance, weights)
    }

    /// `sqrt(wᵀΣw)`.
    #[must_use]
    pub fn portfolio_risk(&self, weights: &DVector<f64>) -> f64 {
        self.portfolio_variance(weights).max(0.0).sqrt()
    }

    /// `(μᵀw − rf) / σ_p`, or `None` for a riskless portfolio.
    #[must_use]
    pub fn sharpe_ratio(&self, weights: &DVector<f64>, risk_free_rate: f64) -> Option<f64> {
        let risk = self.portfolio_risk(weights);
        (risk > 0.0).then(|| (self.portfolio_return(weights) - risk_free_rate) / risk)
    }

    /// Absolute risk contributions `RC_i = w_i (Σw)_i / σ_p`.
    ///
    /// They sum to `σ_p`. A riskless portfolio has all-zero contributions.
    #[must_use]
    pub fn risk_contributions(&self, weights: &DVector<f64>) -> DVector<f64> {
        let marginal = &self.covariance * weights;
        let risk = weights.dot(&marginal).max(0.0).sqrt();
        if risk == 0.0 {
            return DVector::zeros(weights.len());
        }
        weights.component_mul(&marginal) / risk
    }
}

/// Builds a [`CovarianceModel`] from a snapshot and class assumptions.
#[derive(Debug, Clone, Copy)]
pub struct CovarianceMatrixBuilder<'a> {
    statistics: &'a AssetClassStatistics,
    same_class_epsilon: f64,
}

impl<'a> CovarianceMatrixBuilder<'a> {
    /// Creates a builder with the default same-class ε.
    #[must_use]
    pub fn new(statistics: &'a AssetClassStatistics) -> Self {
        Self {
            statistics,
            same_class_epsilon: SAME_CLASS_EPSILON,
        }
    }

    /// Overrides the same-class ε.
    #[must_use]
    pub fn with_same_class_epsilon(mut self, epsilon: f64) -> Self {
        self.same_class_epsilon = epsilon;
        self
    }

    /// Builds the model for a snapshot.
    pub fn build(&self, snapshot: &HoldingsSnapshot) -> PortfolioResult<CovarianceModel> {
        self.build_for(snapshot.holding_ids(), snapshot.asset_classes())
    }

    /// Builds the model for explicit `(holding, class)` rows.
    pub fn build_for(
        &self,
        holding_ids: Vec<HoldingId>,
        asset_classes: Vec<AssetClass>,
    ) -> PortfolioResult<CovarianceModel> {
        let n = asset_classes.len();
        if holding_ids.len() != n {
            return Err(OptimizationError::validation(
                "holdings",
                format!("{} ids for {n} asset classes", holding_ids.len()),
            ));
        }

        let profiles = asset_classes
            .iter()
            .map(|class| {
                self.statistics.profile(class).map_err(|e| {
                    tracing::error!(error = %e, "asset class missing from assumptions");
                    e
                })
            })
            .collect::<PortfolioResult<Vec<_>>>()?;

        let expected_returns = DVector::from_iterator(n, profiles.iter().map(|p| p.expected_return));
        let volatilities = DVector::from_iterator(n, profiles.iter().map(|p| p.volatility));

        let mut correlation = DMatrix::identity(n, n);
        for i in 0..n {
            for j in i + 1..n {
                let rho = if asset_classes[i] == asset_classes[j] {
                    1.0 - self.same_class_epsilon
                } else {
                    self.statistics.correlation(&asset_classes[i], &asset_classes[j])?
                };
                correlation[(i, j)] = rho;
                correlation[(j, i)] = rho;
            }
        }

        let covariance = DMatrix::from_fn(n, n, |i, j| {
            volatilities[i] * volatilities[j] * correlation[(i, j)]
        });

        ensure_symmetric(&covariance, 1e-15)?;
        if let Err(e) = cholesky(&covariance) {
            tracing::error!(
                error = %e,
                classes = ?asset_classes,
                matrix = %covariance,
                "covariance matrix is not positive-definite"
            );
            return Err(OptimizationError::numerical(format!(
                "covariance matrix is not positive-definite: {covariance}"
            )));
        }

        Ok(CovarianceModel {
            holding_ids,
            asset_classes,
            expected_returns,
            volatilities,
            correlation,
            covariance,
        })
    }
}
