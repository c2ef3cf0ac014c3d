//! Error types for spatial transformers.

use thiserror::Error;
use warpkit_core::SpatialError;

/// Main error type for transformer operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformerError {
    /// Grids which must describe the same domain do not.
    #[error("Domain mismatch: {0}")]
    DomainMismatch(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Shape mismatch.
    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// Error in grid, axes or sampling operation.
    #[error(transparent)]
    Spatial(#[from] SpatialError),
}

/// Result type for transformer operations.
pub type Result<T> = std::result::Result<T, TransformerError>;

impl TransformerError {
    /// Create a domain mismatch error.
    pub fn domain_mismatch(msg: impl Into<String>) -> Self {
        Self::DomainMismatch(msg.into())
    }

    /// Create an invalid configuration error.
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }
}
