//! The efficient frontier service.
//!
//! Every operation follows the same steps:
//!
//! 1. Validate the request parameters (before any holdings are read)
//! 2. Look up the cache
//! 3. On a miss, load a fresh snapshot, build the covariance model and solve
//! 4. Cache the result; failures are never cached
//!
//! The service also listens for holdings mutations and drops the affected
//! user's cached results.

use std::sync::Arc;

use nalgebra::DVector;
use serde::de::DeserializeOwned;
use serde::Serialize;

use frontier_portfolio::{
    capital_allocation_line, correlation_summary, diversification_metrics,
    improvement_opportunities, summarize_portfolio, validate_risk_free_rate,
    validate_target_return, AssetClassStatistics, CovarianceMatrixBuilder, CovarianceModel,
    HoldingsSnapshot, MeanVarianceOptimizer, OptimizationError, OptimizationResult,
    PortfolioResult, WeightBounds,
};
use frontier_traits::{AccountFilter, HoldingsEvent, HoldingsListener, HoldingsSource, UserId};

use crate::cache::{CacheKey, CacheOperation, OptimizationCache};
use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::reports::{CorrelationReport, CurrentPositionReport, FrontierReport, MatrixLabel};

/// Portfolio optimization and frontier analysis over a holdings source.
///
/// `Send + Sync`; share it behind an `Arc`.
pub struct EfficientFrontierService {
    source: Arc<dyn HoldingsSource>,
    statistics: Arc<AssetClassStatistics>,
    optimizer: MeanVarianceOptimizer,
    cache: OptimizationCache,
    config: EngineConfig,
}

impl EfficientFrontierService {
    /// Creates a service after validating `config`.
    pub fn new(
        source: Arc<dyn HoldingsSource>,
        statistics: Arc<AssetClassStatistics>,
        config: EngineConfig,
    ) -> EngineResult<Self> {
        config.validate()?;
        tracing::info!(
            name = %config.name,
            source = source.source_name(),
            cache_ttl_secs = config.cache_ttl_secs,
            "efficient frontier service ready"
        );
        Ok(Self {
            source,
            statistics,
            optimizer: MeanVarianceOptimizer::new(config.optimizer),
            cache: OptimizationCache::new(config.cache_ttl()),
            config,
        })
    }

    /// The service configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The result cache.
    pub fn cache(&self) -> &OptimizationCache {
        &self.cache
    }

    /// The asset-class assumptions.
    pub fn statistics(&self) -> &AssetClassStatistics {
        &self.statistics
    }

    // =========================================================================
    // OPERATIONS
    // =========================================================================

    /// Full frontier analysis of the user's holdings under default bounds.
    ///
    /// `risk_free_rate` and `num_points` fall back to the configured defaults.
    pub fn efficient_frontier(
        &self,
        user_id: &UserId,
        filter: &AccountFilter,
        risk_free_rate: Option<f64>,
        num_points: Option<usize>,
    ) -> EngineResult<FrontierReport> {
        let rf = risk_free_rate.unwrap_or(self.config.default_risk_free_rate);
        let num_points = num_points.unwrap_or(self.config.default_frontier_points);
        validate_risk_free_rate(rf)?;
        validate_num_points(num_points)?;

        let key = CacheKey::new(user_id, CacheOperation::EfficientFrontier, filter)
            .with_float(rf)
            .with_count(num_points);

        self.cached(key, || {
            let (snapshot, model) = self.load(user_id, filter)?;
            let bounds = WeightBounds::default();
            let current_weights = DVector::from_vec(snapshot.weights());

            let current = summarize_portfolio(&model, &current_weights, rf);
            let frontier = self
                .optimizer
                .frontier(&model, &bounds, num_points)?
                .with_risk_free_rate(rf);
            let tangency = self.optimizer.maximize_sharpe(&model, rf, &bounds)?;

            let max_risk = frontier
                .max_risk()
                .max(tangency.expected_risk)
                .max(current.expected_risk);
            let capital_allocation_line = capital_allocation_line(
                rf,
                tangency.expected_return,
                tangency.expected_risk,
                max_risk,
                num_points,
            );

            let improvement = improvement_opportunities(
                &self.optimizer,
                &model,
                &bounds,
                &current_weights,
                &tangency,
                rf,
                self.config.frontier_tolerance,
            )?;

            Ok(FrontierReport {
                user_id: user_id.clone(),
                total_value: snapshot.total_value(),
                holdings: snapshot.entries().to_vec(),
                excluded_holdings: snapshot.excluded(),
                risk_free_rate: rf,
                correlation: correlation_summary(&model)?,
                diversification: diversification_metrics(&model, &current_weights),
                current,
                minimum_variance: frontier.minimum_variance,
                tangency,
                frontier: frontier.points,
                frontier_collapsed: frontier.collapsed,
                capital_allocation_line,
                improvement,
            })
        })
    }

    /// Minimum-variance portfolio.
    ///
    /// Bounds default to `[0, 1]`. The Sharpe ratio uses the configured
    /// default risk-free rate.
    pub fn minimize_variance(
        &self,
        user_id: &UserId,
        filter: &AccountFilter,
        min_weight: Option<f64>,
        max_weight: Option<f64>,
    ) -> EngineResult<OptimizationResult> {
        let bounds = bounds(min_weight, max_weight)?;
        let key = CacheKey::new(user_id, CacheOperation::MinimumVariance, filter)
            .with_float(bounds.min_weight())
            .with_float(bounds.max_weight());

        self.cached(key, || {
            let (_, model) = self.load(user_id, filter)?;
            Ok(self
                .optimizer
                .minimize_variance(&model, &bounds)?
                .with_risk_free_rate(self.config.default_risk_free_rate))
        })
    }

    /// Tangency (maximum Sharpe) portfolio.
    pub fn maximize_sharpe(
        &self,
        user_id: &UserId,
        filter: &AccountFilter,
        risk_free_rate: Option<f64>,
        min_weight: Option<f64>,
        max_weight: Option<f64>,
    ) -> EngineResult<OptimizationResult> {
        let rf = risk_free_rate.unwrap_or(self.config.default_risk_free_rate);
        validate_risk_free_rate(rf)?;
        let bounds = bounds(min_weight, max_weight)?;
        let key = CacheKey::new(user_id, CacheOperation::MaximumSharpe, filter)
            .with_float(rf)
            .with_float(bounds.min_weight())
            .with_float(bounds.max_weight());

        self.cached(key, || {
            let (_, model) = self.load(user_id, filter)?;
            self.optimizer.maximize_sharpe(&model, rf, &bounds)
        })
    }

    /// Least-variance portfolio with expected return `target`.
    pub fn target_return(
        &self,
        user_id: &UserId,
        filter: &AccountFilter,
        target: f64,
        min_weight: Option<f64>,
        max_weight: Option<f64>,
    ) -> EngineResult<OptimizationResult> {
        validate_target_return(target)?;
        let bounds = bounds(min_weight, max_weight)?;
        let key = CacheKey::new(user_id, CacheOperation::TargetReturn, filter)
            .with_float(target)
            .with_float(bounds.min_weight())
            .with_float(bounds.max_weight());

        self.cached(key, || {
            let (_, model) = self.load(user_id, filter)?;
            Ok(self
                .optimizer
                .target_return(&model, target, &bounds)?
                .with_risk_free_rate(self.config.default_risk_free_rate))
        })
    }

    /// Equal-risk-contribution portfolio under default bounds.
    pub fn risk_parity(
        &self,
        user_id: &UserId,
        filter: &AccountFilter,
    ) -> EngineResult<OptimizationResult> {
        let key = CacheKey::new(user_id, CacheOperation::RiskParity, filter);

        self.cached(key, || {
            let (_, model) = self.load(user_id, filter)?;
            Ok(self
                .optimizer
                .risk_parity(&model, &WeightBounds::default())?
                .with_risk_free_rate(self.config.default_risk_free_rate))
        })
    }

    /// Holding-level correlation matrix with summary statistics.
    pub fn correlation_matrix(
        &self,
        user_id: &UserId,
        filter: &AccountFilter,
    ) -> EngineResult<CorrelationReport> {
        let key = CacheKey::new(user_id, CacheOperation::CorrelationMatrix, filter);

        self.cached(key, || {
            let (snapshot, model) = self.load(user_id, filter)?;
            let current_weights = DVector::from_vec(snapshot.weights());
            let corr = model.correlation();

            Ok(CorrelationReport {
                user_id: user_id.clone(),
                labels: model
                    .holding_ids()
                    .iter()
                    .zip(model.asset_classes())
                    .map(|(holding_id, asset_class)| MatrixLabel {
                        holding_id: holding_id.clone(),
                        asset_class: asset_class.clone(),
                    })
                    .collect(),
                matrix: (0..corr.nrows())
                    .map(|i| corr.row(i).iter().copied().collect())
                    .collect(),
                summary: correlation_summary(&model)?,
                diversification: diversification_metrics(&model, &current_weights),
            })
        })
    }

    /// The current portfolio against the frontier, at the default risk-free rate.
    pub fn current_position(
        &self,
        user_id: &UserId,
        filter: &AccountFilter,
    ) -> EngineResult<CurrentPositionReport> {
        let rf = self.config.default_risk_free_rate;
        let key = CacheKey::new(user_id, CacheOperation::CurrentPosition, filter).with_float(rf);

        self.cached(key, || {
            let (snapshot, model) = self.load(user_id, filter)?;
            let bounds = WeightBounds::default();
            let current_weights = DVector::from_vec(snapshot.weights());
            let tangency = self.optimizer.maximize_sharpe(&model, rf, &bounds)?;
            let improvement = improvement_opportunities(
                &self.optimizer,
                &model,
                &bounds,
                &current_weights,
                &tangency,
                rf,
                self.config.frontier_tolerance,
            )?;

            Ok(CurrentPositionReport {
                user_id: user_id.clone(),
                total_value: snapshot.total_value(),
                holdings: snapshot.entries().to_vec(),
                excluded_holdings: snapshot.excluded(),
                risk_free_rate: rf,
                current: summarize_portfolio(&model, &current_weights, rf),
                diversification: diversification_metrics(&model, &current_weights),
                tangency,
                improvement,
            })
        })
    }

    /// Drops every cached result of one user.
    pub fn clear_cache(&self, user_id: &UserId) -> usize {
        self.cache.invalidate_user(user_id)
    }

    /// Drops every cached result.
    pub fn clear_all_cache(&self) -> usize {
        self.cache.invalidate_all()
    }

    // =========================================================================
    // HELPERS
    // =========================================================================

    fn load(
        &self,
        user_id: &UserId,
        filter: &AccountFilter,
    ) -> PortfolioResult<(HoldingsSnapshot, CovarianceModel)> {
        let snapshot = HoldingsSnapshot::load(self.source.as_ref(), user_id, filter)?;
        let model = CovarianceMatrixBuilder::new(&self.statistics).build(&snapshot)?;
        tracing::debug!(
            user = %user_id,
            holdings = snapshot.len(),
            excluded = snapshot.excluded(),
            "built covariance model"
        );
        Ok((snapshot, model))
    }

    fn cached<T, F>(&self, key: CacheKey, compute: F) -> EngineResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> PortfolioResult<T>,
    {
        let seen = self.cache.generation(&key.user_id);
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit);
        }

        let value = compute().map_err(|e| {
            tracing::debug!(
                user = %key.user_id,
                operation = ?key.operation,
                code = e.code(),
                error = %e,
                "optimization request failed"
            );
            e
        })?;

        if let Err(e) = self.cache.put_if_current(key, &value, seen) {
            tracing::warn!(error = %e, "result could not be cached");
        }
        Ok(value)
    }
}

impl HoldingsListener for EfficientFrontierService {
    fn on_holdings_changed(&self, event: &HoldingsEvent) {
        tracing::debug!(
            user = %event.user_id,
            holding = %event.holding_id,
            kind = ?event.kind,
            "holdings changed"
        );
        self.cache.invalidate_user(&event.user_id);
    }
}

fn bounds(min_weight: Option<f64>, max_weight: Option<f64>) -> PortfolioResult<WeightBounds> {
    WeightBounds::new(min_weight.unwrap_or(0.0), max_weight.unwrap_or(1.0))
}

fn validate_num_points(num_points: usize) -> PortfolioResult<()> {
    if num_points < 2 {
        return Err(OptimizationError::validation(
            "num_points",
            format!("a frontier needs at least 2 points, got {num_points}"),
        ));
    }
    Ok(())
}
