//! Affine transform implementation.
//!
//! This module provides an affine transform (linear transformation + translation)
//! of normalized grid coordinates.

use burn::module::{Module, Param};
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use warpkit_core::{Axes, Grid};

use super::trait_::SpatialTransform;

/// Trainable parameters of an [`AffineTransform`].
#[derive(Module, Debug)]
pub struct AffineParams<B: Backend> {
    matrix: Param<Tensor<B, 2>>,      // [D, D] linear transformation matrix
    translation: Param<Tensor<B, 1>>, // [D] translation vector
}

impl<B: Backend> AffineParams<B> {
    pub fn new(matrix: Tensor<B, 2>, translation: Tensor<B, 1>) -> Self {
        Self {
            matrix: Param::from_tensor(matrix),
            translation: Param::from_tensor(translation),
        }
    }

    pub fn matrix(&self) -> Tensor<B, 2> {
        self.matrix.val()
    }

    pub fn translation(&self) -> Tensor<B, 1> {
        self.translation.val()
    }
}

/// Affine Transform (Linear transformation + Translation).
///
/// T(x) = A x + t
///
/// where:
/// * A is a D×D matrix (linear transformation: rotation, scale, shear)
/// * t is a D-dimensional translation vector
///
/// Points are given in the transform axes, by default the normalized cube
/// of its grid, so that rotations and scalings are about the grid center.
#[derive(Debug, Clone)]
pub struct AffineTransform<B: Backend, const D: usize> {
    params: AffineParams<B>,
    grid: Grid<D>,
    axes: Axes,
}

impl<B: Backend, const D: usize> AffineTransform<B, D> {
    /// Create a new affine transform.
    ///
    /// # Arguments
    /// * `grid` - Domain of the transform
    /// * `matrix` - Tensor of shape `[D, D]` containing the linear transformation matrix
    /// * `translation` - Tensor of shape `[D]` containing the translation vector
    pub fn new(grid: Grid<D>, matrix: Tensor<B, 2>, translation: Tensor<B, 1>) -> Self {
        let axes = Axes::from_grid(&grid);
        Self {
            params: AffineParams::new(matrix, translation),
            grid,
            axes,
        }
    }

    /// Create an identity affine transform.
    pub fn identity(grid: Grid<D>, device: &B::Device) -> Self {
        let matrix = Tensor::<B, 2>::eye(D, device);
        let translation = Tensor::<B, 1>::zeros([D], device);
        Self::new(grid, matrix, translation)
    }

    /// Use other coordinate axes.
    pub fn with_axes(mut self, axes: Axes) -> Self {
        self.axes = axes;
        self
    }

    /// Get the transformation matrix.
    pub fn matrix(&self) -> Tensor<B, 2> {
        self.params.matrix()
    }

    /// Get the translation vector.
    pub fn translation(&self) -> Tensor<B, 1> {
        self.params.translation()
    }

    pub fn params(&self) -> &AffineParams<B> {
        &self.params
    }

    /// Replace the parameters, e.g. after an optimization step.
    pub fn set_params(&mut self, params: AffineParams<B>) {
        self.params = params;
    }
}

impl<B: Backend, const D: usize> SpatialTransform<B, D> for AffineTransform<B, D> {
    type Condition = ();

    fn grid(&self) -> &Grid<D> {
        &self.grid
    }

    fn axes(&self) -> Axes {
        self.axes
    }

    fn condition(&self) {}

    fn set_condition(&mut self, _condition: ()) {}

    fn transform_points(&self, points: Tensor<B, 3>, _grid: bool) -> Tensor<B, 3> {
        // Row vectors: y = x @ A^T + t
        let [n, p, _] = points.dims();
        let a = self.params.matrix();
        let t = self.params.translation().reshape([1, D]);
        let rotated = points.reshape([n * p, D]).matmul(a.transpose());
        (rotated + t).reshape([n, p, D])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_affine_transform_identity() {
        let device = Default::default();
        let transform = AffineTransform::<TestBackend, 3>::identity(Grid::new([4, 4, 4]), &device);

        let points = Tensor::<TestBackend, 3>::from_floats([[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]], &device);
        let transformed = transform.transform_points(points, false);
        assert_eq!(
            transformed.into_data().as_slice::<f32>().unwrap(),
            &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]
        );
    }

    #[test]
    fn test_affine_transform_scale_and_translation() {
        let device = Default::default();
        // Scale x by 2, shift y by 0.5
        let matrix = Tensor::<TestBackend, 2>::from_floats([[2.0, 0.0], [0.0, 1.0]], &device);
        let translation = Tensor::<TestBackend, 1>::from_floats([0.0, 0.5], &device);
        let transform = AffineTransform::new(Grid::new([8, 8]), matrix, translation);
        assert_eq!(SpatialTransform::<TestBackend, 2>::axes(&transform), Axes::CubeCorners);

        let points = Tensor::<TestBackend, 3>::from_floats(
            [[[0.25, 0.0]], [[-0.5, -0.5]]],
            &device,
        );
        let transformed = transform.transform_points(points, false);
        assert_eq!(transformed.dims(), [2, 1, 2]);
        let data = transformed.into_data();
        let slice = data.as_slice::<f32>().unwrap();
        let expected = [0.5, 0.5, -1.0, 0.0];
        for (a, e) in slice.iter().zip(expected.iter()) {
            assert!((a - e).abs() < 1e-6);
        }
    }

    #[test]
    fn test_rotation_is_about_grid_center() {
        let device = Default::default();
        // 90 degrees counter-clockwise
        let matrix = Tensor::<TestBackend, 2>::from_floats([[0.0, -1.0], [1.0, 0.0]], &device);
        let translation = Tensor::<TestBackend, 1>::zeros([2], &device);
        let transform = AffineTransform::new(Grid::new([5, 5]), matrix, translation);

        let points = Tensor::<TestBackend, 3>::from_floats([[[0.0, 0.0], [1.0, 0.0]]], &device);
        let data = transform.transform_points(points, true).into_data();
        let slice = data.as_slice::<f32>().unwrap();
        let expected = [0.0, 0.0, 0.0, 1.0];
        for (a, e) in slice.iter().zip(expected.iter()) {
            assert!((a - e).abs() < 1e-6);
        }
    }
}
