//! Linear interpolation implementation.
//!
//! N-linear interpolation (bilinear for 2D, trilinear for 3D) of
//! multi-channel grid data, weighting the 2^D grid points around each
//! sample position.

use burn::tensor::backend::Backend;
use burn::tensor::{Int, Tensor};
use serde::{Deserialize, Serialize};

use super::padding::{clamp_index, reflect, snap, with_constant_fill, Padding};
use super::trait_::{broadcast_batch, strides, Interpolator};

/// Linear Interpolator.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct LinearInterpolator;

impl LinearInterpolator {
    /// Create a new linear interpolator.
    pub fn new() -> Self {
        Self
    }
}

/// Lower and upper neighbour along one axis: clamped index and weight.
type AxisNeighbours<B> = [(Tensor<B, 2, Int>, Tensor<B, 2>); 2];

impl<B: Backend> Interpolator<B> for LinearInterpolator {
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

            let mut neighbours: Vec<AxisNeighbours<B>> = Vec::with_capacity(D);
            for (i, &len) in size.iter().enumerate() {
                let mut x = snap(indices.clone().narrow(2, i, 1).squeeze::<2>(2));
                if padding == Padding::Reflection {
                    x = reflect(x, len, align_corners);
                }
                let x0 = x.clone().floor();
                let w1 = x - x0.clone();
                let w0 = w1.clone().neg().add_scalar(1.0);
                let x1 = x0.clone().add_scalar(1.0);

                let (i0, inside0) = clamp_index(x0, len);
                let (i1, inside1) = clamp_index(x1, len);
                let (w0, w1) = if padding == Padding::Zeros {
                    (w0 * inside0, w1 * inside1)
                } else {
                    (w0, w1)
                };
                neighbours.push([(i0, w0), (i1, w1)]);
            }

            let mut output = Tensor::<B, 3>::zeros([n, c, p], &device);
            for corner in 0..(1usize << D) {
                let mut index = Tensor::<B, 2, Int>::zeros([n, p], &device);
                let mut weight = Tensor::<B, 2>::ones([n, p], &device);
                for (i, axis) in neighbours.iter().enumerate() {
                    let (idx, w) = &axis[(corner >> i) & 1];
                    index = index + idx.clone().mul_scalar(strides[i]);
                    weight = weight * w.clone();
                }
                let index = index.unsqueeze_dim::<3>(1).repeat(&[1, c, 1]);
                let values = data.clone().gather(2, index);
                output = output + values * weight.unsqueeze_dim::<3>(1);
            }
            output
        })
    }
}
