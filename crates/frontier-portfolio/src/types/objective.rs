//! Optimization objectives.

use serde::{Deserialize, Serialize};

/// What an optimization result was solved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    /// Lowest variance under the bounds.
    MinimumVariance,
    /// Highest Sharpe ratio (tangency portfolio).
    MaximumSharpe,
    /// Lowest variance at a required return.
    TargetReturn,
    /// Equal risk contributions.
    RiskParity,
}

impl Objective {
    /// Returns a human-readable name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::MinimumVariance => "Minimum Variance",
            Self::MaximumSharpe => "Maximum Sharpe",
            Self::TargetReturn => "Target Return",
            Self::RiskParity => "Risk Parity",
        }
    }

    /// Returns the operation code used in logs and cache keys.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::MinimumVariance => "min_variance",
            Self::MaximumSharpe => "max_sharpe",
            Self::TargetReturn => "target_return",
            Self::RiskParity => "risk_parity",
        }
    }
}

impl std::fmt::Display for Objective {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
