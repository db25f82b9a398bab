//! Euclidean projection onto the capped simplex.

use nalgebra::DVector;

use crate::error::{MathError, MathResult};

/// Slack allowed when checking `n * lower <= 1 <= n * upper`.
const FEASIBILITY_SLACK: f64 = 1e-12;

/// The set `{w ∈ Rⁿ : Σw = 1, lower ≤ w_i ≤ upper}`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CappedSimplex {
    dimension: usize,
    lower: f64,
    upper: f64,
}

impl CappedSimplex {
    /// Creates the set, failing if it is empty.
    pub fn new(dimension: usize, lower: f64, upper: f64) -> MathResult<Self> {
        if dimension == 0 {
            return Err(MathError::invalid_input("Capped simplex needs dimension >= 1"));
        }
        if !(lower.is_finite() && upper.is_finite()) || lower > upper {
            return Err(MathError::invalid_input(format!(
                "Invalid weight bounds [{lower}, {upper}]"
            )));
        }

        let n = dimension as f64;
        if n * lower > 1.0 + FEASIBILITY_SLACK {
            return Err(MathError::infeasible(format!(
                "{dimension} weights at minimum {lower} sum to {} > 1",
                n * lower
            )));
        }
        if n * upper < 1.0 - FEASIBILITY_SLACK {
            return Err(MathError::infeasible(format!(
                "{dimension} weights at maximum {upper} sum to {} < 1",
                n * upper
            )));
        }

        Ok(Self {
            dimension,
            lower,
            upper,
        })
    }

    /// Number of coordinates.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Lower bound per coordinate.
    pub fn lower(&self) -> f64 {
        self.lower
    }

    /// Upper bound per coordinate.
    pub fn upper(&self) -> f64 {
        self.upper
    }

    /// The equal-weight point, always feasible.
    pub fn center(&self) -> DVector<f64> {
        DVector::from_element(self.dimension, 1.0 / self.dimension as f64)
    }

    /// Returns true if `w` lies in the set within `tolerance`.
    pub fn contains(&self, w: &DVector<f64>, tolerance: f64) -> bool {
        w.len() == self.dimension
            && (w.sum() - 1.0).abs() <= tolerance
            && w
                .iter()
                .all(|&x| x >= self.lower - tolerance && x <= self.upper + tolerance)
    }

    /// Projects `v` onto the set.
    ///
    /// Finds the shift `τ` with `Σ clamp(v_i − τ, lower, upper) = 1` by
    /// bisection, then solves for `τ` exactly on the coordinates left strictly
    /// inside their bounds.
    pub fn project(&self, v: &DVector<f64>) -> DVector<f64> {
        debug_assert_eq!(v.len(), self.dimension);
        let (l, u) = (self.lower, self.upper);
        let clamped_sum = |tau: f64| v.iter().map(|&x| (x - tau).clamp(l, u)).sum::<f64>();

        let v_min = v.iter().copied().fold(f64::INFINITY, f64::min);
        let v_max = v.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        // clamped_sum(lo) = n * upper >= 1 and clamped_sum(hi) = n * lower <= 1
        let mut lo = v_min - u;
        let mut hi = v_max - l;
        for _ in 0..200 {
            let mid = 0.5 * (lo + hi);
            if clamped_sum(mid) > 1.0 {
                lo = mid;
            } else {
                hi = mid;
            }
            if hi - lo <= f64::EPSILON * (1.0 + mid.abs()) {
                break;
            }
        }
        let mut tau = 0.5 * (lo + hi);

        let free: Vec<usize> = (0..self.dimension)
            .filter(|&i| {
                let x = v[i] - tau;
                x > l && x < u
            })
            .collect();
        if !free.is_empty() {
            let fixed: f64 = (0..self.dimension)
                .filter(|i| !free.contains(i))
                .map(|i| (v[i] - tau).clamp(l, u))
                .sum();
            let free_sum: f64 = free.iter().map(|&i| v[i]).sum();
            tau = (free_sum + fixed - 1.0) / free.len() as f64;
        }

        let mut w = v.map(|x| (x - tau).clamp(l, u));
        self.absorb_residual(&mut w);
        w
    }

    /// Spreads any rounding residual of `Σw − 1` over coordinates with slack.
    fn absorb_residual(&self, w: &mut DVector<f64>) {
        for _ in 0..self.dimension {
            let residual = 1.0 - w.sum();
            if residual == 0.0 {
                return;
            }
            let slack: Vec<usize> = (0..self.dimension)
                .filter(|&i| {
                    if residual > 0.0 {
                        w[i] < self.upper
                    } else {
                        w[i] > self.lower
                    }
                })
                .collect();
            if slack.is_empty() {
                return;
            }
            let share = residual / slack.len() as f64;
            for i in slack {
                w[i] = (w[i] + share).clamp(self.lower, self.upper);
            }
            if (1.0 - w.sum()).abs() >= residual.abs() {
                return;
            }
        }
    }
}

/// Convenience wrapper: projects `v` onto `{Σw = 1, lower ≤ w_i ≤ upper}`.
pub fn project_capped_simplex(
    v: &DVector<f64>,
    lower: f64,
    upper: f64,
) -> MathResult<DVector<f64>> {
    Ok(CappedSimplex::new(v.len(), lower, upper)?.project(v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_feasibility_checks() {
        assert!(matches!(
            CappedSimplex::new(4, 0.3, 1.0),
            Err(MathError::Infeasible { .. })
        ));
        assert!(matches!(
            CappedSimplex::new(4, 0.0, 0.2),
            Err(MathError::Infeasible { .. })
        ));
        assert!(CappedSimplex::new(4, 0.25, 0.25).is_ok());
        assert!(CappedSimplex::new(4, 0.5, 0.4).is_err());
    }

    #[test]
    fn test_projection_of_feasible_point_is_identity() {
        let set = CappedSimplex::new(3, 0.0, 1.0).unwrap();
        let w = DVector::from_vec(vec![0.2, 0.3, 0.5]);

        let p = set.project(&w);

        for i in 0..3 {
            assert_relative_eq!(p[i], w[i], epsilon = 1e-14);
        }
    }

    #[test]
    fn test_projection_standard_simplex() {
        let set = CappedSimplex::new(3, 0.0, 1.0).unwrap();
        let v = DVector::from_vec(vec![1.0, 1.0, -1.0]);

        let p = set.project(&v);

        assert_relative_eq!(p[0], 0.5, epsilon = 1e-14);
        assert_relative_eq!(p[1], 0.5, epsilon = 1e-14);
        assert_relative_eq!(p[2], 0.0, epsilon = 1e-14);
    }

    #[test]
    fn test_projection_respects_caps() {
        let set = CappedSimplex::new(4, 0.05, 0.4).unwrap();
        let v = DVector::from_vec(vec![3.0, 2.0, -1.0, -2.0]);

        let p = set.project(&v);

        assert!(set.contains(&p, 1e-14));
        assert_relative_eq!(p[0], 0.4, epsilon = 1e-14);
        assert_relative_eq!(p[1], 0.4, epsilon = 1e-14);
    }

    #[test]
    fn test_degenerate_box_is_single_point() {
        let set = CappedSimplex::new(4, 0.25, 0.25).unwrap();
        let p = set.project(&DVector::from_vec(vec![9.0, -3.0, 0.1, 0.0]));

        for i in 0..4 {
            assert_relative_eq!(p[i], 0.25, epsilon = 1e-15);
        }
    }

    proptest! {
        #[test]
        fn prop_projection_is_feasible(
            values in proptest::collection::vec(-5.0f64..5.0, 2..12),
            upper in 0.5f64..1.0,
        ) {
            let set = CappedSimplex::new(values.len(), 0.0, upper).unwrap();
            let p = set.project(&DVector::from_vec(values));
            prop_assert!(set.contains(&p, 1e-12));
        }

        #[test]
        fn prop_projection_is_idempotent(
            values in proptest::collection::vec(-5.0f64..5.0, 2..12),
        ) {
            let set = CappedSimplex::new(values.len(), 0.0, 1.0).unwrap();
            let once = set.project(&DVector::from_vec(values));
            let twice = set.project(&once);
            for i in 0..once.len() {
                prop_assert!((once[i] - twice[i]).abs() < 1e-12);
            }
        }
    }
}
