//! Error types for the feature selection core.
//!
//! Every fallible operation in [`crate::pipeline`] returns a [`SelectionError`].
//! The core never prints or logs these; callers decide how to present them.

use thiserror::Error;

/// Errors raised by the selection pipeline.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SelectionError {
    /// Malformed or insufficiently-sized input data.
    ///
    /// Raised for non-numeric or missing values, duplicate names,
    /// label vectors that do not line up with the feature matrix, and
    /// matrices too small for the requested operation.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Unrecognized or mutually inconsistent configuration options.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// An iterative or cross-validated procedure could not produce a
    /// stable result (degenerate folds, empty selections).
    #[error("Selection did not converge: {0}")]
    Convergence(String),
}

impl SelectionError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        SelectionError::InvalidInput(msg.into())
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        SelectionError::InvalidConfig(msg.into())
    }

    pub fn convergence(msg: impl Into<String>) -> Self {
        SelectionError::Convergence(msg.into())
    }
}

/// Result alias used throughout the selection core.
pub type Result<T> = std::result::Result<T, SelectionError>;
