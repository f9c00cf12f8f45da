//! Error types for wirecrate

use thiserror::Error;

/// Main error type for wirecrate operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Degenerate input: {0}")]
    DegenerateInput(String),

    #[error("Label count mismatch: expected {expected} labels, found {found}")]
    InvalidLabels { expected: usize, found: usize },

    #[error("Fit did not converge after {iterations} iterations: {reason}")]
    FitNonConvergence { iterations: usize, reason: String },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

impl Error {
    /// Whether this error describes a single wire that could not be fitted,
    /// as opposed to a problem with the caller's input as a whole
    pub fn is_per_wire(&self) -> bool {
        matches!(self, Error::DegenerateInput(_) | Error::FitNonConvergence { .. })
    }
}

/// Result type alias for wirecrate operations
pub type Result<T> = std::result::Result<T, Error>;
