//! # Frontier Portfolio
//!
//! Mean-variance analytics for a user's holdings.
//!
//! This crate turns a set of holdings and asset-class assumptions into
//! optimized allocations and the efficient frontier.
//!
//! ## Design Philosophy
//!
//! - **Pure functions**: All calculations are stateless with explicit inputs
//! - **Class-level assumptions**: Holdings inherit return, volatility and
//!   correlation from their asset class
//! - **Deterministic solvers**: No randomness; hitting an iteration cap is
//!   reported, not raised
//!
//! ## Features
//!
//! - **Assumptions**: Asset-class statistics with PSD validation, loadable from TOML
//! - **Snapshots**: Eligible holdings and current weights for one request
//! - **Covariance**: Holding-level covariance built from class correlations
//! - **Optimizers**: Minimum variance, maximum Sharpe, target return, risk parity
//! - **Frontier**: Evenly spaced target returns, CAL, return-at-risk searches
//! - **Analytics**: Risk contributions, correlation summaries, diversification
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use frontier_portfolio::prelude::*;
//!
//! let stats = AssetClassStatistics::standard();
//! let snapshot = HoldingsSnapshot::load(&source, &user_id, &AccountFilter::All)?;
//! let model = CovarianceMatrixBuilder::new(&stats).build(&snapshot)?;
//!
//! let optimizer = MeanVarianceOptimizer::default();
//! let bounds = WeightBounds::default();
//! let tangency = optimizer.maximize_sharpe(&model, 0.045, &bounds)?;
//! let frontier = optimizer.frontier(&model, &bounds, 50)?;
//! ```
//!
//! ## Module Overview
//!
//! - [`analytics`] - Portfolio summaries, correlation, diversification, CAL
//! - [`contribution`] - Risk contribution by holding and asset class
//! - [`covariance`] - Covariance models
//! - [`optimizer`] - Constrained optimizers and the efficient frontier
//! - [`snapshot`] - Holdings snapshots
//! - [`statistics`] - Asset-class assumptions
//! - [`types`] - Core types (AssetClass, WeightBounds, Objective, settings)

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![allow(clippy::module_name_repetitions)]

// Module declarations
pub mod analytics;
pub mod contribution;
pub mod covariance;
pub mod error;
pub mod optimizer;
pub mod snapshot;
pub mod statistics;
pub mod types;

// Re-export error types at crate root
pub use error::{OptimizationError, PortfolioResult};

// Re-export main types
pub use types::{AssetClass, AssetClassProfile, Objective, OptimizerSettings, WeightBounds};

pub use covariance::{CovarianceMatrixBuilder, CovarianceModel, SAME_CLASS_EPSILON};
pub use snapshot::{HoldingsSnapshot, SnapshotEntry};
pub use statistics::{AssetClassStatistics, CorrelationEntry, StatisticsTable};

// Re-export optimizer types
pub use optimizer::{
    sharpe_ratio, validate_risk_free_rate, validate_target_return, EfficientFrontier,
    FrontierPoint, MeanVarianceOptimizer, OptimizationResult,
};

// Re-export analytics types and functions
pub use analytics::{
    // Capital allocation line
    capital_allocation_line,
    // Correlation
    correlation_summary,
    // Diversification
    diversification_metrics,
    // Improvement
    improvement_opportunities,
    // Summary
    summarize_portfolio,
    CorrelationPair,
    CorrelationSummary,
    DiversificationMetrics,
    ImprovementOpportunities,
    PortfolioSummary,
    RiskReturnPoint,
};

// Re-export contribution analysis types and functions
pub use contribution::{
    risk_contributions, BucketContribution, HoldingContribution, RiskContributions,
};

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use frontier_portfolio::prelude::*;
/// ```
pub mod prelude {
    // Error types
    pub use crate::error::{OptimizationError, PortfolioResult};

    // Domain types
    pub use crate::types::{AssetClass, AssetClassProfile, Objective, OptimizerSettings, WeightBounds};

    // Inputs
    pub use crate::covariance::{CovarianceMatrixBuilder, CovarianceModel};
    pub use crate::snapshot::HoldingsSnapshot;
    pub use crate::statistics::AssetClassStatistics;

    // Optimizers
    pub use crate::optimizer::{
        EfficientFrontier, FrontierPoint, MeanVarianceOptimizer, OptimizationResult,
    };

    // Analytics
    pub use crate::analytics::{
        capital_allocation_line, correlation_summary, diversification_metrics,
        improvement_opportunities, summarize_portfolio, CorrelationSummary,
        DiversificationMetrics, ImprovementOpportunities, PortfolioSummary, RiskReturnPoint,
    };

    // Contribution analysis
    pub use crate::contribution::{risk_contributions, HoldingContribution, RiskContributions};

    // Collaborator types
    pub use frontier_traits::{AccountFilter, HoldingRecord, HoldingsSource, UserId};
}
