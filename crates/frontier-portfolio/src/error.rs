//! Error types for portfolio optimization.
//!
//! Every failure here is deterministic: the same holdings, assumptions and
//! parameters fail the same way on every call, so nothing is retried.

use frontier_math::MathError;
use frontier_traits::TraitError;
use thiserror::Error;

/// Result type for portfolio operations.
pub type PortfolioResult<T> = Result<T, OptimizationError>;

/// Errors that can occur while building or optimizing a portfolio.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OptimizationError {
    /// Malformed caller input.
    #[error("Invalid {field}: {reason}")]
    Validation {
        /// The offending parameter.
        field: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The account filter names an account the user does not own.
    #[error("Account '{account_id}' does not belong to the requesting user")]
    Authorization {
        /// The offending account id.
        account_id: String,
    },

    /// Too few eligible holdings.
    #[error("Insufficient data: {reason}")]
    InsufficientData {
        /// What is missing.
        reason: String,
    },

    /// The bounds or target admit no feasible weight vector.
    #[error("Infeasible constraints: {constraint}")]
    InfeasibleConstraints {
        /// The violated constraint.
        constraint: String,
    },

    /// Unknown asset class or malformed assumption tables.
    #[error("Configuration error: {reason}")]
    Configuration {
        /// Operator-facing detail.
        reason: String,
    },

    /// Covariance matrix failed its positive-definiteness check.
    #[error("Numerical error: {reason}")]
    Numerical {
        /// Diagnostic detail, including the offending matrix.
        reason: String,
    },

    /// The holdings collaborator failed.
    #[error("Holdings source error: {reason}")]
    DataSource {
        /// The collaborator's error message.
        reason: String,
    },
}

impl OptimizationError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create an authorization error.
    #[must_use]
    pub fn authorization(account_id: impl Into<String>) -> Self {
        Self::Authorization {
            account_id: account_id.into(),
        }
    }

    /// Create an insufficient data error.
    #[must_use]
    pub fn insufficient_data(reason: impl Into<String>) -> Self {
        Self::InsufficientData {
            reason: reason.into(),
        }
    }

    /// Create an infeasible constraints error.
    #[must_use]
    pub fn infeasible(constraint: impl Into<String>) -> Self {
        Self::InfeasibleConstraints {
            constraint: constraint.into(),
        }
    }

    /// Create a configuration error.
    #[must_use]
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Create a numerical error.
    #[must_use]
    pub fn numerical(reason: impl Into<String>) -> Self {
        Self::Numerical {
            reason: reason.into(),
        }
    }

    /// Create a data source error.
    #[must_use]
    pub fn data_source(reason: impl Into<String>) -> Self {
        Self::DataSource {
            reason: reason.into(),
        }
    }

    /// Stable machine-readable code for the error category.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation_error",
            Self::Authorization { .. } => "authorization_error",
            Self::InsufficientData { .. } => "insufficient_data",
            Self::InfeasibleConstraints { .. } => "infeasible_constraints",
            Self::Configuration { .. } => "configuration_error",
            Self::Numerical { .. } => "numerical_error",
            Self::DataSource { .. } => "data_source_error",
        }
    }

    /// Whether retrying the same request could succeed.
    ///
    /// Always false: inputs are re-read on every call and the computation is
    /// deterministic.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        false
    }

    /// Message safe to show to an end user.
    ///
    /// Operator-facing defects (configuration, numerical, collaborator
    /// failures) get a generic message; their detail belongs in the logs.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InsufficientData { reason } => {
                format!("{reason}: add more holdings to run portfolio optimization")
            }
            Self::Configuration { .. } => {
                "Portfolio optimization is not available for one or more of your asset classes"
                    .to_string()
            }
            Self::Numerical { .. } => {
                "Portfolio optimization could not be completed for these holdings".to_string()
            }
            Self::DataSource { .. } => "Holdings could not be loaded".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<MathError> for OptimizationError {
    fn from(e: MathError) -> Self {
        match e {
            MathError::Infeasible { reason } => Self::InfeasibleConstraints { constraint: reason },
            other => Self::Numerical {
                reason: other.to_string(),
            },
        }
    }
}

impl From<TraitError> for OptimizationError {
    fn from(e: TraitError) -> Self {
        match e {
            TraitError::PermissionDenied(account_id) => Self::Authorization { account_id },
            other => Self::DataSource {
                reason: other.to_string(),
            },
        }
    }
}
