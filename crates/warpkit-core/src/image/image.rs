//! Image type with a sampling grid.
//!
//! This module provides the Image struct which combines multi-channel tensor
//! data with the [`Grid`] describing where its voxels lie in physical space.

use burn::tensor::backend::Backend;
use burn::tensor::{ElementConversion, Tensor};
use serde::{Deserialize, Serialize};

use super::axes::Axes;
use super::grid::Grid;
use crate::error::{Result, SpatialError};
use crate::interpolation::{interpolate, Padding, Sampling};

/// Intensity normalization applied by [`Image::normalize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// Map the intensity range onto `[0, 1]`.
    #[default]
    Unit,
    /// Map the intensity range onto `[-0.5, 0.5]`.
    Center,
    /// Zero mean and unit variance.
    ZScore,
}

/// Image data defined on a sampling grid.
///
/// An image has `C` channels of voxel values laid out `[C, ...grid.shape()]`.
///
/// # Type Parameters
/// * `B` - The backend (CPU or GPU) for tensor operations
/// * `D` - The dimensionality of the image (2 or 3)
///
/// # Examples
/// ```rust
/// use warpkit_core::{Grid, Image};
/// use burn::tensor::Tensor;
/// use burn_ndarray::NdArray;
///
/// type Backend = NdArray<f32>;
///
/// let device = Default::default();
/// let grid = Grid::new([10, 8, 6]);
/// let data = Tensor::<Backend, 4>::zeros([2, 6, 8, 10], &device);
/// let image = Image::new(data, grid).unwrap();
/// assert_eq!(image.shape(), [6, 8, 10]);
/// assert_eq!(image.channels(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Image<B: Backend, const D: usize> {
    /// Voxel values `[C, V]` with the spatial dimensions flattened.
    data: Tensor<B, 2>,
    grid: Grid<D>,
}

impl<B: Backend, const D: usize> Image<B, D> {
    /// Create a new image, checking that the data shape matches the grid.
    ///
    /// Data of rank `D` is a single channel image, data of rank `D + 1`
    /// has its channels along the first dimension.
    pub fn new<const R: usize>(data: Tensor<B, R>, grid: Grid<D>) -> Result<Self> {
        let dims = data.dims();
        let spatial = spatial_dims::<R, D>(&dims)?;
        if spatial != grid.shape().as_slice() {
            let mut expected = dims[..R - D].to_vec();
            expected.extend_from_slice(&grid.shape());
            return Err(SpatialError::ShapeMismatch {
                expected,
                actual: dims.to_vec(),
            });
        }
        let channels = if R == D { 1 } else { dims[0] };
        let data = data.reshape([channels, grid.numel()]);
        Ok(Self { data, grid })
    }

    /// Create an image on the default grid of its data shape.
    pub fn from_data<const R: usize>(data: Tensor<B, R>) -> Result<Self> {
        let dims = data.dims();
        let mut shape = [0usize; D];
        shape.copy_from_slice(spatial_dims::<R, D>(&dims)?);
        Self::new(data, Grid::from_shape(shape))
    }

    /// Voxel values `[C, V]` with the spatial dimensions flattened.
    pub fn data(&self) -> &Tensor<B, 2> {
        &self.data
    }

    /// Consume the image and return its flattened `[C, V]` data.
    pub fn into_tensor(self) -> Tensor<B, 2> {
        self.data
    }

    /// Image data of shape `[C, ...shape]` for rank `D + 1`, or
    /// `[...shape]` for rank `D` when the image has a single channel.
    pub fn tensor<const R: usize>(&self) -> Result<Tensor<B, R>> {
        let mut dims = Vec::with_capacity(R);
        if R == D + 1 {
            dims.push(self.channels());
        } else if R != D || self.channels() != 1 {
            return Err(SpatialError::dimension_mismatch(format!(
                "Image::tensor() cannot view {} channel image of dimension {} as rank {} tensor",
                self.channels(),
                D,
                R
            )));
        }
        dims.extend_from_slice(&self.grid.shape());
        Ok(self.data.clone().reshape(to_array::<R>(&dims)?))
    }

    pub fn grid(&self) -> &Grid<D> {
        &self.grid
    }

    /// Number of image channels.
    pub fn channels(&self) -> usize {
        self.data.dims()[0]
    }

    /// Spatial shape of the image, i.e. the reversed grid size.
    pub fn shape(&self) -> [usize; D] {
        self.grid.shape()
    }

    /// Linearly map intensities from `[data_min, data_max]` onto `[min, max]`.
    ///
    /// The input range defaults to the intensity range of the image. Mapped
    /// values are clamped to `[min, max]`. A degenerate input range maps
    /// every voxel to `min`.
    pub fn rescale(&self, min: f64, max: f64, data_min: Option<f64>, data_max: Option<f64>) -> Self {
        let data_min = data_min.unwrap_or_else(|| self.data.clone().min().into_scalar().elem::<f64>());
        let data_max = data_max.unwrap_or_else(|| self.data.clone().max().into_scalar().elem::<f64>());
        let range = data_max - data_min;
        let scale = if range > 0.0 { (max - min) / range } else { 0.0 };
        let data = self
            .data
            .clone()
            .sub_scalar(data_min)
            .mul_scalar(scale)
            .add_scalar(min)
            .clamp(min, max);
        Self {
            data,
            grid: self.grid.clone(),
        }
    }

    /// Normalize image intensities over all channels.
    pub fn normalize(&self, mode: Normalization) -> Self {
        match mode {
            Normalization::Unit => self.rescale(0.0, 1.0, None, None),
            Normalization::Center => self.rescale(-0.5, 0.5, None, None),
            Normalization::ZScore => {
                let mean = self.data.clone().mean().into_scalar().elem::<f64>();
                let centered = self.data.clone().sub_scalar(mean);
                let var = centered.clone().powf_scalar(2.0).mean().into_scalar().elem::<f64>();
                let data = if var > 0.0 { centered.div_scalar(var.sqrt()) } else { centered };
                Self {
                    data,
                    grid: self.grid.clone(),
                }
            }
        }
    }

    /// Resample the image onto another grid.
    ///
    /// Sampling onto the image's own grid returns an unchanged copy.
    pub fn sample(&self, grid: &Grid<D>, sampling: Sampling, padding: Padding) -> Result<Self> {
        if grid == &self.grid {
            return Ok(self.clone());
        }
        grid.validate()?;
        let device = self.data.device();
        let coords = grid.coords::<B>(false, &device);
        let values = self.sample_at(coords, Axes::from_grid(grid), grid, sampling, padding)?;
        Ok(Self {
            data: values,
            grid: grid.clone(),
        })
    }

    /// Sample the image at points given in cube coordinates of its grid.
    ///
    /// # Arguments
    /// * `coords` - Points `[..., D]` ordered `(x, y, z)` with respect to
    ///   [`Axes::from_grid`] of the image grid
    /// * `sampling` - Interpolation mode
    ///
    /// # Returns
    /// Sampled values `[C, ...]` with the leading shape of `coords`, border
    /// values outside the grid
    pub fn sample_points<const R: usize>(&self, coords: Tensor<B, R>, sampling: Sampling) -> Result<Tensor<B, R>> {
        let dims = coords.dims();
        if R < 2 || dims[R - 1] != D {
            return Err(SpatialError::dimension_mismatch(format!(
                "Image::sample_points() coordinates of shape {:?} must have trailing dimension {}",
                dims, D
            )));
        }
        let points: usize = dims[..R - 1].iter().product();
        let mut shape = Vec::with_capacity(R);
        shape.push(self.channels());
        shape.extend_from_slice(&dims[..R - 1]);
        let shape = to_array::<R>(&shape)?;

        let axes = Axes::from_grid(&self.grid);
        let values = self.sample_at(coords.reshape([points, D]), axes, &self.grid, sampling, Padding::Border)?;
        Ok(values.reshape(shape))
    }

    /// Sample all channels at points `[P, D]`, returning `[C, P]`.
    fn sample_at(
        &self,
        coords: Tensor<B, 2>,
        axes: Axes,
        grid: &Grid<D>,
        sampling: Sampling,
        padding: Padding,
    ) -> Result<Tensor<B, 2>> {
        let indices = grid.transform_points(coords, axes, &self.grid, Axes::Grid, None)?;
        let points = indices.dims()[0];
        let channels = self.channels();
        let data = self.data.clone().unsqueeze_dim::<3>(0);
        let values = interpolate(
            data,
            self.grid.size(),
            indices.unsqueeze_dim::<3>(0),
            sampling,
            padding,
            self.grid.align_corners(),
        )?;
        Ok(values.reshape([channels, points]))
    }
}

/// Spatial part of a rank `R` data shape of a `D`-dimensional image.
fn spatial_dims<const R: usize, const D: usize>(dims: &[usize; R]) -> Result<&[usize]> {
    if R != D && R != D + 1 {
        return Err(SpatialError::dimension_mismatch(format!(
            "Image data of rank {} must have rank {} or {}",
            R,
            D,
            D + 1
        )));
    }
    Ok(&dims[R - D..])
}

fn to_array<const R: usize>(dims: &[usize]) -> Result<[usize; R]> {
    <[usize; R]>::try_from(dims)
        .map_err(|_| SpatialError::dimension_mismatch(format!("Shape {:?} is not of rank {}", dims, R)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;

    type Backend = NdArray<f32>;

    fn values(tensor: Tensor<Backend, 2>) -> Vec<f32> {
        tensor.into_data().as_slice::<f32>().unwrap().to_vec()
    }

    fn assert_close(actual: Vec<f32>, expected: &[f32]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected.iter()) {
            assert!((a - e).abs() < 1e-6, "got {:?}, expected {:?}", actual, expected);
        }
    }

    #[test]
    fn test_image_creation() {
        let device = Default::default();
        let grid = Grid::new([10, 8, 6]);
        let data = Tensor::<Backend, 3>::zeros([6, 8, 10], &device);
        let image = Image::new(data, grid.clone()).unwrap();
        assert_eq!(image.shape(), [6, 8, 10]);
        assert_eq!(image.channels(), 1);
        assert_eq!(image.grid(), &grid);
        assert_eq!(image.tensor::<4>().unwrap().dims(), [1, 6, 8, 10]);
    }

    #[test]
    fn test_image_shape_mismatch() {
        let device = Default::default();
        let data = Tensor::<Backend, 2>::zeros([4, 5], &device);
        let result = Image::new(data, Grid::new([4, 5]));
        assert!(matches!(result, Err(SpatialError::ShapeMismatch { .. })));

        let data = Tensor::<Backend, 4>::zeros([1, 2, 5, 4], &device);
        let result = Image::new(data, Grid::new([4, 5]));
        assert!(matches!(result, Err(SpatialError::DimensionMismatch(_))));
    }

    #[test]
    fn test_multi_channel_tensor_views() {
        let device = Default::default();
        let data = Tensor::<Backend, 3>::from_floats(
            [[[0.0, 1.0, 2.0], [3.0, 4.0, 5.0]], [[6.0, 7.0, 8.0], [9.0, 10.0, 11.0]]],
            &device,
        );
        let image: Image<Backend, 2> = Image::from_data(data).unwrap();
        assert_eq!(image.channels(), 2);
        assert_eq!(image.shape(), [2, 3]);
        assert_eq!(image.grid().size(), [3, 2]);
        assert_eq!(image.tensor::<3>().unwrap().dims(), [2, 2, 3]);
        // Two channels have no rank 2 view
        assert!(image.tensor::<2>().is_err());
    }

    #[test]
    fn test_sample_points() {
        let device = Default::default();
        // [[0, 1, 2],
        //  [3, 4, 5]]
        let data = Tensor::<Backend, 2>::from_floats([[0.0, 1.0, 2.0], [3.0, 4.0, 5.0]], &device);
        let image: Image<Backend, 2> = Image::from_data(data).unwrap();
        let coords = Tensor::<Backend, 2>::from_floats([[-1.0, -1.0], [1.0, 1.0], [0.0, 0.0], [0.5, -1.0]], &device);
        let sampled = image.sample_points(coords, Sampling::Linear).unwrap();
        assert_eq!(sampled.dims(), [1, 4]);
        let expected = [0.0, 5.0, 2.5, 1.5];
        let slice = values(sampled);
        for (a, e) in slice.iter().zip(expected.iter()) {
            assert!((a - e).abs() < 1e-5, "got {:?}", slice);
        }
    }

    #[test]
    fn test_sample_points_keeps_channels_and_leading_shape() {
        let device = Default::default();
        let data = Tensor::<Backend, 3>::from_floats(
            [[[0.0, 1.0, 2.0], [3.0, 4.0, 5.0]], [[0.0, 10.0, 20.0], [30.0, 40.0, 50.0]]],
            &device,
        );
        let image: Image<Backend, 2> = Image::from_data(data).unwrap();
        // [2, 2, 2] grid of points
        let coords = Tensor::<Backend, 3>::from_floats(
            [[[-1.0, -1.0], [1.0, -1.0]], [[-1.0, 1.0], [1.0, 1.0]]],
            &device,
        );
        let sampled = image.sample_points(coords, Sampling::Nearest).unwrap();
        assert_eq!(sampled.dims(), [2, 2, 2]);
        let data = sampled.into_data();
        assert_eq!(data.as_slice::<f32>().unwrap(), &[0.0, 2.0, 3.0, 5.0, 0.0, 20.0, 30.0, 50.0]);
    }

    #[test]
    fn test_rescale_and_normalize() {
        let device = Default::default();
        let data = Tensor::<Backend, 2>::from_floats([[-50.0, 0.0, 150.0]], &device);
        let image: Image<Backend, 2> = Image::from_data(data).unwrap();

        let unit = image.normalize(Normalization::Unit);
        assert_close(values(unit.data().clone()), &[0.0, 0.25, 1.0]);
        // Input unchanged
        assert_eq!(values(image.data().clone()), vec![-50.0, 0.0, 150.0]);

        let center = image.normalize(Normalization::Center);
        assert_close(values(center.into_tensor()), &[-0.5, -0.25, 0.5]);

        let explicit = image.rescale(0.0, 1.0, Some(-50.0), Some(150.0));
        assert_close(values(explicit.into_tensor()), &[0.0, 0.25, 1.0]);

        // Values beyond the given input range saturate
        let clamped = image.rescale(0.0, 100.0, None, Some(50.0));
        assert_eq!(values(clamped.into_tensor()), vec![0.0, 50.0, 100.0]);

        let z = image.normalize(Normalization::ZScore);
        let z = values(z.into_tensor());
        let mean: f32 = z.iter().sum::<f32>() / 3.0;
        let var: f32 = z.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / 3.0;
        assert!(mean.abs() < 1e-5);
        assert!((var - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_rescale_constant_image() {
        let device = Default::default();
        let data = Tensor::<Backend, 2>::full([2, 2], 7.0, &device);
        let image: Image<Backend, 2> = Image::from_data(data).unwrap();
        assert_eq!(values(image.rescale(-1.0, 1.0, None, None).into_tensor()), vec![-1.0; 4]);
    }
}
