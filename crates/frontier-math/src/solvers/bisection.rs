//! Bisection root-finding and bracket expansion.

use crate::error::{MathError, MathResult};
use crate::solvers::{SolverConfig, SolverResult};

/// Bisection root-finding algorithm.
///
/// Repeatedly halves the interval and keeps the half whose endpoints have
/// opposite signs. Endpoint values are carried between iterations so `f` is
/// evaluated exactly once per step.
///
/// Requires: `f(a) * f(b) <= 0` (opposite signs at endpoints)
///
/// # Example
///
/// ```rust
/// use frontier_math::solvers::{bisection, SolverConfig};
///
/// let f = |x: f64| x * x - 2.0;
///
/// let result = bisection(f, 1.0, 2.0, &SolverConfig::default()).unwrap();
/// assert!((result.root - std::f64::consts::SQRT_2).abs() < 1e-9);
/// ```
pub fn bisection<F>(mut f: F, a: f64, b: f64, config: &SolverConfig) -> MathResult<SolverResult>
where
    F: FnMut(f64) -> f64,
{
    let mut lo = a.min(b);
    let mut hi = a.max(b);

    let mut f_lo = f(lo);
    let f_hi = f(hi);

    if f_lo * f_hi > 0.0 {
        return Err(MathError::InvalidBracket {
            a: lo,
            b: hi,
            fa: f_lo,
            fb: f_hi,
        });
    }

    if f_lo.abs() < config.tolerance {
        return Ok(SolverResult {
            root: lo,
            iterations: 0,
            residual: f_lo,
        });
    }
    if f_hi.abs() < config.tolerance {
        return Ok(SolverResult {
            root: hi,
            iterations: 0,
            residual: f_hi,
        });
    }

    for iteration in 0..config.max_iterations {
        let mid = 0.5 * (lo + hi);
        let f_mid = f(mid);

        let width = 0.5 * (hi - lo);
        if f_mid.abs() < config.tolerance || width < config.tolerance * (1.0 + mid.abs()) {
            return Ok(SolverResult {
                root: mid,
                iterations: iteration + 1,
                residual: f_mid,
            });
        }

        if f_mid * f_lo < 0.0 {
            hi = mid;
        } else {
            lo = mid;
            f_lo = f_mid;
        }
    }

    let mid = 0.5 * (lo + hi);
    Err(MathError::convergence_failed(
        config.max_iterations,
        f(mid).abs(),
    ))
}

/// Expands `[lo, hi]` outward until `f` changes sign across it.
///
/// Each step doubles the half-width around the original midpoint. Returns the
/// bracketing interval, or [`MathError::ConvergenceFailed`] after
/// `max_expansions` unsuccessful doublings.
pub fn expand_bracket<F>(mut f: F, lo: f64, hi: f64, max_expansions: u32) -> MathResult<(f64, f64)>
where
    F: FnMut(f64) -> f64,
{
    if !(lo.is_finite() && hi.is_finite()) || hi <= lo {
        return Err(MathError::invalid_input(format!(
            "Bracket expansion needs finite lo < hi, got [{lo}, {hi}]"
        )));
    }

    let center = 0.5 * (lo + hi);
    let mut half_width = 0.5 * (hi - lo);
    let mut f_lo = f(lo);
    let mut f_hi = f(hi);

    for _ in 0..max_expansions {
        if f_lo * f_hi <= 0.0 {
            return Ok((center - half_width, center + half_width));
        }
        half_width *= 2.0;
        f_lo = f(center - half_width);
        f_hi = f(center + half_width);
    }

    if f_lo * f_hi <= 0.0 {
        return Ok((center - half_width, center + half_width));
    }
    Err(MathError::convergence_failed(
        max_expansions,
        f_lo.abs().min(f_hi.abs()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sqrt_2() {
        let f = |x: f64| x * x - 2.0;

        let result = bisection(f, 1.0, 2.0, &SolverConfig::default()).unwrap();

        assert_relative_eq!(result.root, std::f64::consts::SQRT_2, epsilon = 1e-9);
    }

    #[test]
    fn test_reversed_bracket() {
        let f = |x: f64| x * x - 2.0;

        let result = bisection(f, 2.0, 1.0, &SolverConfig::default()).unwrap();

        assert_relative_eq!(result.root, std::f64::consts::SQRT_2, epsilon = 1e-9);
    }

    #[test]
    fn test_invalid_bracket() {
        let f = |x: f64| x * x - 2.0;

        let result = bisection(f, 2.0, 3.0, &SolverConfig::default());

        assert!(matches!(result, Err(MathError::InvalidBracket { .. })));
    }

    #[test]
    fn test_root_at_endpoint() {
        let f = |x: f64| x - 1.0;

        let result = bisection(f, 0.0, 1.0, &SolverConfig::default()).unwrap();

        assert_relative_eq!(result.root, 1.0, epsilon = 1e-10);
        assert_eq!(result.iterations, 0);
    }

    #[test]
    fn test_monotone_step_function_with_plateau() {
        // Clamped linear response, like a bounded frontier return
        let f = |x: f64| x.clamp(-1.0, 1.0) - 0.25;

        let result = bisection(f, -10.0, 10.0, &SolverConfig::default()).unwrap();

        assert_relative_eq!(result.root, 0.25, epsilon = 1e-8);
    }

    #[test]
    fn test_counts_evaluations() {
        let mut calls = 0_u32;
        let f = |x: f64| {
            calls += 1;
            x - 0.3
        };

        let result = bisection(f, 0.0, 1.0, &SolverConfig::default()).unwrap();

        // Two endpoint evaluations plus one per iteration
        assert_eq!(calls, result.iterations + 2);
    }

    #[test]
    fn test_expand_bracket() {
        let f = |x: f64| x - 100.0;

        let (lo, hi) = expand_bracket(f, -1.0, 1.0, 20).unwrap();

        assert!(lo <= 100.0 && hi >= 100.0);
    }

    #[test]
    fn test_expand_bracket_gives_up() {
        let f = |_x: f64| 1.0;

        let result = expand_bracket(f, -1.0, 1.0, 5);

        assert!(matches!(result, Err(MathError::ConvergenceFailed { .. })));
    }
}
