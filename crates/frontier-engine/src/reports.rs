//! Reports returned by the service.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use frontier_portfolio::{
    AssetClass, CorrelationSummary, DiversificationMetrics, FrontierPoint,
    ImprovementOpportunities, OptimizationResult, PortfolioSummary, RiskReturnPoint,
    SnapshotEntry,
};
use frontier_traits::{HoldingId, UserId};

/// Everything needed to draw a user's efficient frontier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrontierReport {
    /// Requesting user
    pub user_id: UserId,
    /// Value of the analysed holdings
    pub total_value: Decimal,
    /// Analysed holdings with their current weights
    pub holdings: Vec<SnapshotEntry>,
    /// Holdings discarded as ineligible
    pub excluded_holdings: usize,
    /// Risk-free rate used for Sharpe ratios and the CAL
    pub risk_free_rate: f64,
    /// The portfolio as it stands
    pub current: PortfolioSummary,
    /// Minimum-variance portfolio
    pub minimum_variance: OptimizationResult,
    /// Tangency portfolio
    pub tangency: OptimizationResult,
    /// Frontier points in increasing return
    pub frontier: Vec<FrontierPoint>,
    /// True when every feasible portfolio has the same return
    pub frontier_collapsed: bool,
    /// Capital Allocation Line
    pub capital_allocation_line: Vec<RiskReturnPoint>,
    /// Pairwise correlation statistics
    pub correlation: CorrelationSummary,
    /// Diversification of the current portfolio
    pub diversification: DiversificationMetrics,
    /// Distance of the current portfolio from the frontier
    pub improvement: ImprovementOpportunities,
}

/// A row/column label of the correlation matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixLabel {
    /// Holding
    pub holding_id: HoldingId,
    /// Its asset class
    pub asset_class: AssetClass,
}

/// Holding-level correlation matrix with summary statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationReport {
    /// Requesting user
    pub user_id: UserId,
    /// Row and column labels
    pub labels: Vec<MatrixLabel>,
    /// Row-major correlation matrix
    pub matrix: Vec<Vec<f64>>,
    /// Pairwise statistics
    pub summary: CorrelationSummary,
    /// Diversification of the current portfolio
    pub diversification: DiversificationMetrics,
}

/// The current portfolio and how far it is from the frontier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentPositionReport {
    /// Requesting user
    pub user_id: UserId,
    /// Value of the analysed holdings
    pub total_value: Decimal,
    /// Analysed holdings with their current weights
    pub holdings: Vec<SnapshotEntry>,
    /// Holdings discarded as ineligible
    pub excluded_holdings: usize,
    /// Risk-free rate used for Sharpe ratios
    pub risk_free_rate: f64,
    /// The portfolio as it stands
    pub current: PortfolioSummary,
    /// Tangency portfolio
    pub tangency: OptimizationResult,
    /// Diversification of the current portfolio
    pub diversification: DiversificationMetrics,
    /// Distance from the frontier
    pub improvement: ImprovementOpportunities,
}
