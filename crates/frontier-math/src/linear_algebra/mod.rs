//! Linear algebra utilities.
//!
//! Dense symmetric-matrix helpers for covariance work: symmetry and
//! positive-definiteness checks, SPD solves and spectral bounds.

use crate::error::{MathError, MathResult};
use nalgebra::{Cholesky, DMatrix, DVector};

/// Checks that a square matrix is symmetric within `tolerance`.
///
/// Reports the first offending entry in row-major order.
pub fn ensure_symmetric(matrix: &DMatrix<f64>, tolerance: f64) -> MathResult<()> {
    let n = matrix.nrows();
    if n != matrix.ncols() {
        return Err(MathError::DimensionMismatch {
            rows1: n,
            cols1: matrix.ncols(),
            rows2: matrix.ncols(),
            cols2: n,
        });
    }

    for row in 0..n {
        for col in row + 1..n {
            let difference = (matrix[(row, col)] - matrix[(col, row)]).abs();
            if difference.is_nan() || difference > tolerance {
                return Err(MathError::NotSymmetric {
                    row,
                    col,
                    difference,
                });
            }
        }
    }

    Ok(())
}

/// Computes the lower-triangular Cholesky factor `L` with `A = L * Lᵀ`.
///
/// Fails with [`MathError::NotPositiveDefinite`] if the factorization breaks
/// down, which is the positive-definiteness test used for covariance matrices.
pub fn cholesky(matrix: &DMatrix<f64>) -> MathResult<DMatrix<f64>> {
    let n = matrix.nrows();
    if n != matrix.ncols() {
        return Err(MathError::invalid_input(
            "Matrix must be square for Cholesky decomposition",
        ));
    }
    if matrix.iter().any(|v| !v.is_finite()) {
        return Err(MathError::invalid_input("Matrix contains non-finite entries"));
    }

    Cholesky::new(matrix.clone())
        .map(|c| c.l())
        .ok_or(MathError::NotPositiveDefinite { size: n })
}

/// Solves `A x = b` for a symmetric positive-definite `A`.
pub fn solve_spd(matrix: &DMatrix<f64>, rhs: &DVector<f64>) -> MathResult<DVector<f64>> {
    let n = matrix.nrows();
    if n != rhs.len() {
        return Err(MathError::DimensionMismatch {
            rows1: n,
            cols1: matrix.ncols(),
            rows2: rhs.len(),
            cols2: 1,
        });
    }

    let factor =
        Cholesky::new(matrix.clone()).ok_or(MathError::NotPositiveDefinite { size: n })?;
    let x = factor.solve(rhs);

    if x.iter().any(|v| !v.is_finite()) {
        return Err(MathError::SingularMatrix);
    }
    Ok(x)
}

/// Returns `vᵀ A v`.
pub fn quadratic_form(matrix: &DMatrix<f64>, v: &DVector<f64>) -> f64 {
    v.dot(&(matrix * v))
}

/// Returns the smallest and largest eigenvalue of a symmetric matrix.
pub fn symmetric_eigenvalue_range(matrix: &DMatrix<f64>) -> MathResult<(f64, f64)> {
    if matrix.nrows() == 0 {
        return Err(MathError::invalid_input("Empty matrix has no eigenvalues"));
    }
    ensure_symmetric(matrix, 1e-10)?;

    let eigenvalues = matrix.symmetric_eigenvalues();
    let (min, max) = eigenvalues
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });

    Ok((min, max))
}
