//! Exact solutions of linear objectives over the capped simplex.

use nalgebra::DVector;

use super::CappedSimplex;
use crate::error::{MathError, MathResult};

/// Maximizes (or minimizes) `valuesᵀw` over a [`CappedSimplex`].
///
/// Every coordinate starts at the lower bound and the remaining budget is
/// handed out greedily in order of value, capped at the upper bound. Ties
/// are broken by index, so the result is deterministic.
pub fn greedy_linear_allocation(
    values: &[f64],
    set: &CappedSimplex,
    maximize: bool,
) -> MathResult<DVector<f64>> {
    let n = set.dimension();
    if values.len() != n {
        return Err(MathError::DimensionMismatch {
            rows1: values.len(),
            cols1: 1,
            rows2: n,
            cols2: 1,
        });
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(MathError::invalid_input("Objective contains non-finite values"));
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        let ord = values[a].total_cmp(&values[b]);
        if maximize {
            ord.reverse()
        } else {
            ord
        }
    });

    let room = set.upper() - set.lower();
    let mut budget = 1.0 - n as f64 * set.lower();
    let mut w = DVector::from_element(n, set.lower());
    for i in order {
        if budget <= 0.0 {
            break;
        }
        let give = room.min(budget);
        w[i] += give;
        budget -= give;
    }

    Ok(w)
}

/// Returns the smallest and largest achievable `valuesᵀw` over the set.
pub fn linear_range(values: &[f64], set: &CappedSimplex) -> MathResult<(f64, f64)> {
    let v = DVector::from_column_slice(values);
    let lo = greedy_linear_allocation(values, set, false)?.dot(&v);
    let hi = greedy_linear_allocation(values, set, true)?.dot(&v);
    Ok((lo, hi))
}
