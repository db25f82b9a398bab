//! # Frontier Math
//!
//! Numerical kernels for the Frontier portfolio optimization engine.
//!
//! This crate provides:
//!
//! - **Linear Algebra**: symmetry and positive-definiteness checks, SPD solves,
//!   quadratic forms and symmetric eigenvalue bounds
//! - **Solvers**: bracketing root finder used for parametric searches
//! - **Optimization**: projection onto the capped simplex, an accelerated
//!   projected-gradient solver for quadratic programs over it, and greedy
//!   linear allocation
//!
//! ## Design Philosophy
//!
//! - **Deterministic**: no randomized starts; identical inputs give identical output
//! - **Numerical Stability**: explicit tolerances, exact final projection steps
//! - **Small dense problems**: sized for tens of assets, not thousands

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::similar_names)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unreadable_literal)]

pub mod error;
pub mod linear_algebra;
pub mod optimization;
pub mod solvers;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{MathError, MathResult};
    pub use crate::linear_algebra::{
        cholesky, ensure_symmetric, quadratic_form, solve_spd, symmetric_eigenvalue_range,
    };
    pub use crate::optimization::{
        greedy_linear_allocation, minimize_quadratic, project_capped_simplex, CappedSimplex,
        OptimizationConfig, OptimizationResult,
    };
    pub use crate::solvers::{bisection, expand_bracket, SolverConfig, SolverResult};
}

pub use error::{MathError, MathResult};
