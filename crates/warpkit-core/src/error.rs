//! Error types for grid, axes and sampling operations.
//!
//! Every fallible operation in `warpkit-core` reports one of these variants.
//! Errors are raised where the precondition is checked and never logged and
//! swallowed.

use thiserror::Error;

/// Main error type for spatial operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpatialError {
    /// Unknown coordinate axes identifier.
    #[error("Invalid axes: {0}")]
    InvalidAxes(String),

    /// Unknown interpolation mode identifier.
    #[error("Invalid sampling mode: {0}")]
    InvalidSampling(String),

    /// Unknown extrapolation mode identifier.
    #[error("Invalid padding mode: {0}")]
    InvalidPadding(String),

    /// Grid description that cannot define a sampling domain.
    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    /// A coordinate map could not be inverted.
    #[error("Singular matrix: {0}")]
    SingularMatrix(String),

    /// Tensor rank or coordinate dimension does not match the grid.
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Tensor shape does not match the expected shape.
    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },
}

/// Result type for spatial operations.
pub type Result<T> = std::result::Result<T, SpatialError>;

impl SpatialError {
    /// Create an invalid axes error.
    pub fn invalid_axes(msg: impl Into<String>) -> Self {
        Self::InvalidAxes(msg.into())
    }

    /// Create an invalid sampling mode error.
    pub fn invalid_sampling(msg: impl Into<String>) -> Self {
        Self::InvalidSampling(msg.into())
    }

    /// Create an invalid padding mode error.
    pub fn invalid_padding(msg: impl Into<String>) -> Self {
        Self::InvalidPadding(msg.into())
    }

    /// Create an invalid grid error.
    pub fn invalid_grid(msg: impl Into<String>) -> Self {
        Self::InvalidGrid(msg.into())
    }

    /// Create a singular matrix error.
    pub fn singular_matrix(msg: impl Into<String>) -> Self {
        Self::SingularMatrix(msg.into())
    }

    /// Create a dimension mismatch error.
    pub fn dimension_mismatch(msg: impl Into<String>) -> Self {
        Self::DimensionMismatch(msg.into())
    }
}
