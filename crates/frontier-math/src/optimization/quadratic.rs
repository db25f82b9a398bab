//! Accelerated projected gradient for convex quadratics on the capped simplex.

use nalgebra::{DMatrix, DVector};

use super::{CappedSimplex, OptimizationConfig, OptimizationResult};
use crate::error::{MathError, MathResult};
use crate::linear_algebra::symmetric_eigenvalue_range;

/// Minimizes `f(w) = wᵀQw + cᵀw` over a [`CappedSimplex`].
///
/// `Q` must be symmetric positive semi-definite. Uses FISTA with a fixed step
/// `1 / L`, `L = 2 λ_max(Q)`, and resets momentum whenever the objective
/// increases. Converges when no weight moves by more than
/// `config.tolerance` in an accepted step.
///
/// The iteration is fully deterministic for a given `start`.
pub fn minimize_quadratic(
    q: &DMatrix<f64>,
    c: &DVector<f64>,
    set: &CappedSimplex,
    start: &DVector<f64>,
    config: &OptimizationConfig,
) -> MathResult<OptimizationResult> {
    let n = set.dimension();
    if q.nrows() != n || q.ncols() != n || c.len() != n || start.len() != n {
        return Err(MathError::DimensionMismatch {
            rows1: q.nrows(),
            cols1: q.ncols(),
            rows2: c.len(),
            cols2: start.len(),
        });
    }

    let objective = |w: &DVector<f64>| w.dot(&(q * w)) + c.dot(w);

    let (_, lambda_max) = symmetric_eigenvalue_range(q)?;
    let lipschitz = (2.0 * lambda_max).max(f64::EPSILON);
    let step = 1.0 / lipschitz;

    let mut x = set.project(start);
    let mut fx = objective(&x);
    let mut y = x.clone();
    let mut t = 1.0_f64;

    for iteration in 1..=config.max_iterations {
        let gradient = (q * &y) * 2.0 + c;
        let x_next = set.project(&(&y - gradient * step));
        let f_next = objective(&x_next);

        if f_next > fx && t > 1.0 {
            // Momentum overshot: restart from the last accepted point
            t = 1.0;
            y.copy_from(&x);
            continue;
        }

        let movement = (&x_next - &x).amax();
        let t_next = 0.5 * (1.0 + (1.0 + 4.0 * t * t).sqrt());
        y = &x_next + (&x_next - &x) * ((t - 1.0) / t_next);
        x = x_next;
        fx = f_next;
        t = t_next;

        if movement < config.tolerance {
            log::trace!("quadratic solve converged after {iteration} iterations");
            return Ok(OptimizationResult {
                parameters: x.iter().copied().collect(),
                objective_value: fx,
                iterations: iteration,
                converged: true,
            });
        }
    }

    log::debug!(
        "quadratic solve hit the {} iteration cap (objective {fx:.6e})",
        config.max_iterations
    );
    Ok(OptimizationResult {
        parameters: x.iter().copied().collect(),
        objective_value: fx,
        iterations: config.max_iterations,
        converged: false,
    })
}
