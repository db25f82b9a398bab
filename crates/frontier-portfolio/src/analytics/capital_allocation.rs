//! Capital Allocation Line.

use serde::{Deserialize, Serialize};

/// A (risk, return) point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskReturnPoint {
    /// Annual volatility.
    pub risk: f64,
    /// Expected annual return.
    pub expected_return: f64,
}

/// `num_points` points on the line from `(0, rf)` through the tangency
/// portfolio, with risk evenly spaced from 0 to `max_risk`.
///
/// Empty when the tangency portfolio is riskless or fewer than two points
/// are requested.
#[must_use]
pub fn capital_allocation_line(
    risk_free_rate: f64,
    tangency_return: f64,
    tangency_risk: f64,
    max_risk: f64,
    num_points: usize,
) -> Vec<RiskReturnPoint> {
    if tangency_risk <= 0.0 || num_points < 2 {
        return Vec::new();
    }

    let slope = (tangency_return - risk_free_rate) / tangency_risk;
    let step = max_risk.max(tangency_risk) / (num_points - 1) as f64;
    (0..num_points)
        .map(|k| {
            let risk = step * k as f64;
            RiskReturnPoint {
                risk,
                expected_return: risk_free_rate + slope * risk,
            }
        })
        .collect()
}
