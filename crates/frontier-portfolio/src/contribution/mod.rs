//! Risk contribution analysis.
//!
//! Splits portfolio volatility into per-holding and per-class pieces that
//! account for correlations:
//! - Absolute contribution `RC_i = w_i (Σw)_i / σ_p` (sums to `σ_p`)
//! - Share of risk `RC_i / σ_p` (sums to one)
//! - Aggregation by asset class
//!
//! # Example
//!
//! ```rust,ignore
//! use frontier_portfolio::contribution::risk_contributions;
//!
//! let contributions = risk_contributions(&model, &weights);
//! for c in contributions.top_contributors(3) {
//!     println!("{}: {:.1}% of risk", c.holding_id, c.risk_share * 100.0);
//! }
//! ```

mod risk;

pub use risk::*;
