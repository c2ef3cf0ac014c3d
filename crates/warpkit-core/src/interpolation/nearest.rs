//! Nearest neighbor interpolation implementation.

use burn::tensor::backend::Backend;
use burn::tensor::{Int, Tensor};
use serde::{Deserialize, Serialize};

use super::padding::{clamp_index, reflect, snap, with_constant_fill, Padding};
use super::trait_::{broadcast_batch, strides, Interpolator};

/// Nearest Neighbor Interpolator.
///
/// Takes the value of the grid point closest to each sample position.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct NearestNeighborInterpolator;

impl NearestNeighborInterpolator {
    /// Create a new nearest neighbor interpolator.
    pub fn new() -> Self {
        Self
    }
}

impl<B: Backend> Interpolator<B> for NearestNeighborInterpolator {
    fn interpolate<const D: usize>(
        &self,
        data: Tensor<B, 3>,
        size: [usize; D],
        indices: Tensor<B, 3>,
        padding: Padding,
        align_corners: bool,
    ) -> Tensor<B, 3> {
        with_constant_fill(data, padding, |data, padding| {
            let (data, indices) = broadcast_batch(data, indices.clone());
            let [n, c, _] = data.dims();
            let p = indices.dims()[1];
            let device = data.device();
            let strides = strides(size);

            let mut index = Tensor::<B, 2, Int>::zeros([n, p], &device);
            let mut inside = Tensor::<B, 2>::ones([n, p], &device);
            for (i, &len) in size.iter().enumerate() {
                let mut x = snap(indices.clone().narrow(2, i, 1).squeeze::<2>(2));
                if padding == Padding::Reflection {
                    x = reflect(x, len, align_corners);
                }
                let (idx, valid) = clamp_index(x.round(), len);
                index = index + idx.mul_scalar(strides[i]);
                inside = inside * valid;
            }

            let values = data.gather(2, index.unsqueeze_dim::<3>(1).repeat(&[1, c, 1]));
            if padding == Padding::Zeros {
                values * inside.unsqueeze_dim::<3>(1)
            } else {
                values
            }
        })
    }
}
