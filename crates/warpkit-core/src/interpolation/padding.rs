//! Extrapolation policy for sample positions outside the grid.

use std::fmt;
use std::str::FromStr;

use burn::tensor::backend::Backend;
use burn::tensor::{Int, Tensor};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SpatialError};

/// Sample positions closer than this to an integer index are snapped to it.
pub const SNAP_TOLERANCE: f64 = 1e-4;

/// How values outside the sampled grid are obtained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Padding {
    /// Repeat the value of the closest border voxel.
    Border,
    /// Treat voxels outside the grid as zero.
    Zeros,
    /// Mirror the grid about its first and last sample.
    Reflection,
    /// Treat voxels outside the grid as the given value.
    Constant(f32),
}

impl Padding {
    /// Value assigned to data outside a mask or the grid.
    pub fn fill_value(&self) -> f32 {
        match self {
            Padding::Constant(value) => *value,
            _ => 0.0,
        }
    }
}

impl Default for Padding {
    fn default() -> Self {
        Padding::Border
    }
}

impl fmt::Display for Padding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Padding::Border => f.write_str("border"),
            Padding::Zeros => f.write_str("zeros"),
            Padding::Reflection => f.write_str("reflection"),
            Padding::Constant(value) => write!(f, "{}", value),
        }
    }
}

impl FromStr for Padding {
    type Err = SpatialError;

    /// Parse a padding mode name, or a number as constant fill value.
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "border" => Ok(Padding::Border),
            "zeros" => Ok(Padding::Zeros),
            "reflection" => Ok(Padding::Reflection),
            other => other.parse::<f32>().map(Padding::Constant).map_err(|_| {
                SpatialError::invalid_padding(format!(
                    "'{}' is neither 'border', 'zeros', 'reflection' nor a number",
                    s
                ))
            }),
        }
    }
}

/// Run a zero-padded interpolation and fill the weight that falls outside
/// the grid with a constant, so that out-of-grid voxels take that value.
///
/// The in-grid weight of each sample is obtained by running the kernel on a
/// tensor of ones. In-grid values never pass through the fill value.
pub(crate) fn with_constant_fill<B, F>(data: Tensor<B, 3>, padding: Padding, kernel: F) -> Tensor<B, 3>
where
    B: Backend,
    F: Fn(Tensor<B, 3>, Padding) -> Tensor<B, 3>,
{
    match padding {
        Padding::Constant(value) if value != 0.0 => {
            let [_, _, numel] = data.dims();
            let ones = Tensor::<B, 3>::ones([1, 1, numel], &data.device());
            let coverage = kernel(ones, Padding::Zeros);
            let values = kernel(data, Padding::Zeros);
            values + coverage.neg().add_scalar(1.0).mul_scalar(value)
        }
        Padding::Constant(_) => kernel(data, Padding::Zeros),
        other => kernel(data, other),
    }
}

/// Snap positions within [`SNAP_TOLERANCE`] of an integer to that integer.
pub(crate) fn snap<B: Backend>(x: Tensor<B, 2>) -> Tensor<B, 2> {
    let rounded = x.clone().round();
    let near = (x.clone() - rounded.clone()).abs().lower_elem(SNAP_TOLERANCE);
    x.mask_where(near, rounded)
}

/// Mirror positions into the grid extent along one axis of `n` samples.
///
/// With aligned corners the mirror axes are the first and last sample,
/// otherwise the outer voxel borders.
pub(crate) fn reflect<B: Backend>(x: Tensor<B, 2>, n: usize, align_corners: bool) -> Tensor<B, 2> {
    let (shift, extent) = if align_corners {
        (0.0, n as f64 - 1.0)
    } else {
        (0.5, n as f64)
    };
    if extent <= 0.0 {
        return x.zeros_like();
    }
    let period = 2.0 * extent;
    let u = x.add_scalar(shift).abs();
    let wrapped = u.clone() - u.div_scalar(period).floor().mul_scalar(period);
    let mirrored = (wrapped.sub_scalar(extent)).abs().neg().add_scalar(extent);
    mirrored.sub_scalar(shift)
}

/// Integer positions clamped into `[0, n - 1]`, plus a float validity mask
/// which is one where the unclamped position lies inside the grid.
pub(crate) fn clamp_index<B: Backend>(pos: Tensor<B, 2>, n: usize) -> (Tensor<B, 2, Int>, Tensor<B, 2>) {
    let upper = n as f64 - 1.0;
    let inside = pos.clone().greater_equal_elem(0.0).float() * pos.clone().lower_equal_elem(upper).float();
    (pos.clamp(0.0, upper).int(), inside)
}
