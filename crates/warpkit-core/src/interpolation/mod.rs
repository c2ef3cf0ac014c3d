//! Interpolation types and operations.
//!
//! This module provides interpolation traits and implementations
//! for sampling grid data at continuous voxel indices, together with the
//! extrapolation policy applied outside the grid.

pub mod linear;
pub mod nearest;
pub mod padding;
pub mod trait_;

pub use linear::LinearInterpolator;
pub use nearest::NearestNeighborInterpolator;
pub use padding::Padding;
pub use trait_::{Interpolator, Sampling};

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::error::{Result, SpatialError};

/// Interpolate grid data `[N, C, V]` at voxel indices `[N, P, D]`.
///
/// Validates the shapes and dispatches to the interpolator of `sampling`.
/// See [`Interpolator::interpolate`] for the argument conventions.
pub fn interpolate<B: Backend, const D: usize>(
    data: Tensor<B, 3>,
    size: [usize; D],
    indices: Tensor<B, 3>,
    sampling: Sampling,
    padding: Padding,
    align_corners: bool,
) -> Result<Tensor<B, 3>> {
    let data_dims = data.dims();
    let index_dims = indices.dims();
    let numel: usize = size.iter().product();
    if data_dims[2] != numel {
        return Err(SpatialError::ShapeMismatch {
            expected: vec![data_dims[0], data_dims[1], numel],
            actual: data_dims.to_vec(),
        });
    }
    if index_dims[2] != D {
        return Err(SpatialError::dimension_mismatch(format!(
            "interpolate() indices of shape {:?} must have trailing dimension {}",
            index_dims, D
        )));
    }
    if data_dims[0] != index_dims[0] && data_dims[0] != 1 && index_dims[0] != 1 {
        return Err(SpatialError::dimension_mismatch(format!(
            "interpolate() batch sizes {} and {} cannot be broadcast",
            data_dims[0], index_dims[0]
        )));
    }

    Ok(match sampling {
        Sampling::Nearest => {
            NearestNeighborInterpolator::new().interpolate(data, size, indices, padding, align_corners)
        }
        Sampling::Linear => {
            LinearInterpolator::new().interpolate(data, size, indices, padding, align_corners)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_interpolate_validates_shapes() {
        let device = Default::default();
        let data = Tensor::<TestBackend, 3>::zeros([2, 1, 6], &device);

        let indices = Tensor::<TestBackend, 3>::zeros([1, 4, 2], &device);
        let result = interpolate(data.clone(), [2, 2], indices.clone(), Sampling::Linear, Padding::Border, true);
        assert!(matches!(result, Err(SpatialError::ShapeMismatch { .. })));

        let result = interpolate(data.clone(), [6], indices, Sampling::Linear, Padding::Border, true);
        assert!(matches!(result, Err(SpatialError::DimensionMismatch(_))));

        let indices = Tensor::<TestBackend, 3>::zeros([3, 4, 2], &device);
        let result = interpolate(data.clone(), [3, 2], indices, Sampling::Nearest, Padding::Border, true);
        assert!(matches!(result, Err(SpatialError::DimensionMismatch(_))));

        let indices = Tensor::<TestBackend, 3>::zeros([1, 4, 2], &device);
        let result = interpolate(data, [3, 2], indices, Sampling::Nearest, Padding::Border, true).unwrap();
        assert_eq!(result.dims(), [2, 1, 4]);
    }
}
