//! Transformers apply a spatial transform to images or point sets.

pub mod base;
pub mod config;
pub mod image;
pub mod point_set;

pub use base::SpatialTransformer;
pub use config::{ImageTransformerConfig, PointSetConfig};
pub use image::{ImageTransformer, SampleEntry, MASK_KEY};
pub use point_set::PointSetTransformer;

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

/// Reverse the order of the coordinates in the last dimension.
pub(crate) fn reverse_coords<B: Backend>(coords: Tensor<B, 3>) -> Tensor<B, 3> {
    let d = coords.dims()[2];
    let columns = (0..d).rev().map(|i| coords.clone().narrow(2, i, 1)).collect();
    Tensor::cat(columns, 2)
}
