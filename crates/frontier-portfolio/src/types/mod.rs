//! Domain types for portfolio optimization.
//!
//! - [`AssetClass`] / [`AssetClassProfile`]: class keys and their assumptions
//! - [`WeightBounds`]: per-holding weight limits
//! - [`Objective`]: what a result was optimized for
//! - [`OptimizerSettings`]: solver tolerances and caps

mod asset_class;
mod bounds;
mod config;
mod objective;

// Re-export all types
pub use asset_class::{AssetClass, AssetClassProfile};
pub use bounds::WeightBounds;
pub use config::OptimizerSettings;
pub use objective::Objective;
