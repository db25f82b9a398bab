//! CLI error types.

use std::path::PathBuf;

use thiserror::Error;

/// CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// An input file could not be loaded.
    #[error("Cannot load {kind} from {path}: {reason}")]
    Input {
        /// What the file holds
        kind: &'static str,
        /// Where it was read from
        path: PathBuf,
        /// Underlying error
        reason: String,
    },

    /// The request was rejected.
    #[error("{0}")]
    Rejected(String),
}

impl CliError {
    /// Creates an input error.
    pub fn input(kind: &'static str, path: &std::path::Path, reason: impl ToString) -> Self {
        Self::Input {
            kind,
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}

/// CLI result type.
pub type CliResult<T> = Result<T, CliError>;
