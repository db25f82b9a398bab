//! Per-holding weight bounds.

use frontier_math::optimization::CappedSimplex;
use serde::{Deserialize, Serialize};

use crate::error::{OptimizationError, PortfolioResult};

/// Slack allowed on the `N * min <= 1 <= N * max` feasibility test.
const FEASIBILITY_SLACK: f64 = 1e-12;

/// Lower and upper bound applied to every holding's weight.
///
/// Short selling is not supported, so `min_weight` is never negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightBounds {
    min_weight: f64,
    max_weight: f64,
}

impl Default for WeightBounds {
    fn default() -> Self {
        Self {
            min_weight: 0.0,
            max_weight: 1.0,
        }
    }
}

impl WeightBounds {
    /// Creates bounds, rejecting negative, inverted or non-finite values.
    pub fn new(min_weight: f64, max_weight: f64) -> PortfolioResult<Self> {
        if !min_weight.is_finite() || !(0.0..=1.0).contains(&min_weight) {
            return Err(OptimizationError::validation(
                "min_weight",
                format!("must lie in [0, 1], got {min_weight}"),
            ));
        }
        if !max_weight.is_finite() || max_weight <= 0.0 || max_weight > 1.0 {
            return Err(OptimizationError::validation(
                "max_weight",
                format!("must lie in (0, 1], got {max_weight}"),
            ));
        }
        if min_weight > max_weight {
            return Err(OptimizationError::validation(
                "min_weight",
                format!("{min_weight} exceeds max_weight {max_weight}"),
            ));
        }

        Ok(Self {
            min_weight,
            max_weight,
        })
    }

    /// Lower bound.
    #[must_use]
    pub fn min_weight(&self) -> f64 {
        self.min_weight
    }

    /// Upper bound.
    #[must_use]
    pub fn max_weight(&self) -> f64 {
        self.max_weight
    }

    /// Returns true if `weight` respects the bounds within `tolerance`.
    #[must_use]
    pub fn contains(&self, weight: f64, tolerance: f64) -> bool {
        weight >= self.min_weight - tolerance && weight <= self.max_weight + tolerance
    }

    /// The feasible set for `holdings` weights under these bounds.
    pub fn feasible_set(&self, holdings: usize) -> PortfolioResult<CappedSimplex> {
        let n = holdings as f64;
        if n * self.min_weight > 1.0 + FEASIBILITY_SLACK {
            return Err(OptimizationError::infeasible(format!(
                "{holdings} holdings at min_weight {} need {:.4} > 100% of the portfolio",
                self.min_weight,
                n * self.min_weight
            )));
        }
        if n * self.max_weight < 1.0 - FEASIBILITY_SLACK {
            return Err(OptimizationError::infeasible(format!(
                "{holdings} holdings at max_weight {} reach only {:.4} < 100% of the portfolio",
                self.max_weight,
                n * self.max_weight
            )));
        }

        Ok(CappedSimplex::new(holdings, self.min_weight, self.max_weight)?)
    }
}
