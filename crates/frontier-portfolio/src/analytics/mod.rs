//! Portfolio-level analytics around the optimizers.
//!
//! This module provides:
//! - Current-portfolio summaries (return, risk, Sharpe, risk decomposition)
//! - Correlation summaries (average, extremal pairs)
//! - Diversification metrics (effective bets, diversification ratio)
//! - The Capital Allocation Line
//! - Improvement opportunities relative to the frontier
//!
//! All functions are pure - they take a covariance model and weights as input
//! and return computed results. No caching, no I/O, no side effects.

mod capital_allocation;
mod correlation;
mod diversification;
mod improvement;
mod summary;

pub use capital_allocation::*;
pub use correlation::*;
pub use diversification::*;
pub use improvement::*;
pub use summary::*;
