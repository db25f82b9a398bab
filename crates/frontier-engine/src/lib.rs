//! # Frontier Engine
//!
//! The optimization service for Frontier.
//!
//! This crate provides:
//! - [`EfficientFrontierService`]: Request validation, snapshot loading, optimization and reports
//! - [`OptimizationCache`]: Per-user result cache with TTL expiry
//! - [`EngineConfig`]: Service configuration, loadable from TOML
//! - [`InMemoryHoldingsStore`]: Holdings store that notifies listeners of mutations
//!
//! ## Architecture
//!
//! ```text
//! HoldingsSource ─> HoldingsSnapshot ─> CovarianceModel ─> MeanVarianceOptimizer ─┬─> OptimizationResult
//!                                                                                 │
//!                                                                                 └─> FrontierReport
//!
//! InMemoryHoldingsStore ── mutation ──> HoldingsListener ──> OptimizationCache::invalidate_user
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let store = Arc::new(InMemoryHoldingsStore::from_json_file("holdings.json")?);
//! let service = Arc::new(
//!     EfficientFrontierServiceBuilder::new()
//!         .with_source(store.clone())
//!         .with_config(EngineConfig::default())
//!         .build()?,
//! );
//! let weak = Arc::downgrade(&service);
//! let listener: Weak<dyn HoldingsListener> = weak;
//! store.subscribe(listener);
//!
//! let report = service.efficient_frontier(&user, &AccountFilter::All, None, None)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
pub mod cache;
pub mod config;
pub mod error;
pub mod reports;
pub mod service;
pub mod store;

// Re-exports
pub use builder::EfficientFrontierServiceBuilder;
pub use cache::{CacheGeneration, CacheKey, CacheOperation, CacheParam, CacheStats, OptimizationCache};
pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use reports::{CorrelationReport, CurrentPositionReport, FrontierReport, MatrixLabel};
pub use service::EfficientFrontierService;
pub use store::{HoldingsFile, InMemoryHoldingsStore};
