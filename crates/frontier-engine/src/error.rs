//! Engine error types.

use frontier_portfolio::OptimizationError;
use frontier_traits::TraitError;
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Engine error type.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration error
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Optimization request failed
    #[error(transparent)]
    Optimization(#[from] OptimizationError),

    /// Holdings store error
    #[error("holdings store error: {0}")]
    Store(#[from] TraitError),
}

impl EngineError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// The optimization error, if this is one.
    pub fn as_optimization(&self) -> Option<&OptimizationError> {
        match self {
            Self::Optimization(e) => Some(e),
            _ => None,
        }
    }

    /// Message safe to show to an end user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Optimization(e) => e.user_message(),
            Self::ConfigError(_) => "Portfolio optimization is not configured".to_string(),
            Self::Store(e) => e.to_string(),
        }
    }
}
