//! Error types for adalat-vector.

use thiserror::Error;

/// Result type for adalat-vector operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in adalat-vector operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Dimension mismatch between a vector and the index.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimensions.
        expected: usize,
        /// Actual dimensions provided.
        actual: usize,
    },

    /// Invalid vector (e.g., contains NaN or infinity).
    #[error("Invalid vector: {0}")]
    InvalidVector(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Persistence error (serialization, inconsistent files).
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
