//! Interpolator trait and sampling modes.
//!
//! This module defines the core Interpolator trait that all interpolation methods must implement.

use std::fmt;
use std::str::FromStr;

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use serde::{Deserialize, Serialize};

use super::padding::Padding;
use crate::error::{Result, SpatialError};

/// Interpolator trait for sampling values at continuous coordinates.
///
/// # Type Parameters
/// * `B` - The Burn backend
pub trait Interpolator<B: Backend> {
    /// Interpolate multi-channel grid data at continuous voxel indices.
    ///
    /// # Arguments
    /// * `data` - Grid data `[N, C, V]` with the spatial dimensions flattened,
    ///   `x` varying fastest
    /// * `size` - Grid size `(x, y, z)`, its product must equal `V`
    /// * `indices` - Voxel indices `[N, P, D]` ordered `(x, y, z)`; a batch of
    ///   one is broadcast against `data` and vice versa
    /// * `padding` - Extrapolation policy for indices outside the grid
    /// * `align_corners` - Corner convention used to reflect indices
    ///
    /// # Returns
    /// Tensor of sampled values `[N, C, P]`
    fn interpolate<const D: usize>(
        &self,
        data: Tensor<B, 3>,
        size: [usize; D],
        indices: Tensor<B, 3>,
        padding: Padding,
        align_corners: bool,
    ) -> Tensor<B, 3>;
}

/// Interpolation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sampling {
    /// Value of the closest grid point.
    Nearest,
    /// N-linear interpolation of the 2^D surrounding grid points.
    #[default]
    Linear,
}

impl Sampling {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sampling::Nearest => "nearest",
            Sampling::Linear => "linear",
        }
    }
}

impl fmt::Display for Sampling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sampling {
    type Err = SpatialError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "nearest" => Ok(Sampling::Nearest),
            "linear" | "bilinear" | "trilinear" => Ok(Sampling::Linear),
            _ => Err(SpatialError::invalid_sampling(format!(
                "'{}' is not one of 'nearest', 'linear'",
                s
            ))),
        }
    }
}

/// Broadcast a batch of one against the other batch size.
pub(crate) fn broadcast_batch<B: Backend>(
    data: Tensor<B, 3>,
    indices: Tensor<B, 3>,
) -> (Tensor<B, 3>, Tensor<B, 3>) {
    let n_data = data.dims()[0];
    let n_indices = indices.dims()[0];
    if n_data == n_indices {
        (data, indices)
    } else if n_data == 1 {
        (data.repeat(&[n_indices, 1, 1]), indices)
    } else {
        (data, indices.repeat(&[n_data, 1, 1]))
    }
}

/// Row-major strides of a flattened `(z, y, x)` tensor, indexed by `(x, y, z)`.
pub(crate) fn strides<const D: usize>(size: [usize; D]) -> [i64; D] {
    let mut strides = [1i64; D];
    for i in 1..D {
        strides[i] = strides[i - 1] * size[i - 1] as i64;
    }
    strides
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sampling() {
        assert_eq!("nearest".parse::<Sampling>().unwrap(), Sampling::Nearest);
        assert_eq!("Linear".parse::<Sampling>().unwrap(), Sampling::Linear);
        assert_eq!("trilinear".parse::<Sampling>().unwrap(), Sampling::Linear);
        assert!(matches!(
            "cubic".parse::<Sampling>(),
            Err(SpatialError::InvalidSampling(_))
        ));
        assert_eq!(Sampling::default().to_string(), "linear");
    }

    #[test]
    fn test_strides() {
        assert_eq!(strides([4, 3, 2]), [1, 4, 12]);
    }
}
