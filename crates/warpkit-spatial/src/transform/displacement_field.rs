//! Displacement field transform implementation.
//!
//! This module provides a dense displacement field transform where each
//! grid point has its own displacement vector. This is used for deformable
//! (non-rigid) registration.

use burn::module::Param;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use warpkit_core::interpolation::{Interpolator, LinearInterpolator};
use warpkit_core::{AffineMap, Axes, Grid, Padding};

use super::trait_::SpatialTransform;
use crate::error::{Result, TransformerError};

/// Dense displacement field transform.
///
/// The displacement field has shape `[N, D, V]` where `V` is the number of
/// grid points in flattened `(z, y, x)` order. Displacements are given in
/// the normalized cube units of the transform axes.
///
/// The transform is conditioned on an optional field. On
/// [`update`](SpatialTransform::update) a present condition becomes the
/// current displacement.
///
/// # Type Parameters
/// * `B` - The Burn backend
/// * `D` - The spatial dimensionality
#[derive(Debug, Clone)]
pub struct DisplacementFieldTransform<B: Backend, const D: usize> {
    displacement: Param<Tensor<B, 3>>,
    condition: Option<Tensor<B, 3>>,
    grid: Grid<D>,
    axes: Axes,
    to_index: AffineMap<D>,
}

impl<B: Backend, const D: usize> DisplacementFieldTransform<B, D> {
    /// Create a zero displacement field on `grid`.
    pub fn new(grid: Grid<D>, device: &B::Device) -> Result<Self> {
        let field = Tensor::<B, 3>::zeros([1, D, grid.numel()], device);
        Self::from_field(grid, field)
    }

    /// Create a transform from a displacement field of shape `[N, D, V]`.
    pub fn from_field(grid: Grid<D>, field: Tensor<B, 3>) -> Result<Self> {
        grid.validate()?;
        check_field_shape(&grid, &field)?;
        let axes = Axes::from_grid(&grid);
        let to_index = grid.axes_to_index(axes)?;
        Ok(Self {
            displacement: Param::from_tensor(field),
            condition: None,
            grid,
            axes,
            to_index,
        })
    }

    /// Get the displacement field.
    pub fn displacement(&self) -> Tensor<B, 3> {
        self.displacement.val()
    }

    /// Replace the displacement field.
    pub fn set_displacement(&mut self, field: Tensor<B, 3>) -> Result<()> {
        check_field_shape(&self.grid, &field)?;
        self.displacement = Param::from_tensor(field);
        Ok(())
    }
}

fn check_field_shape<B: Backend, const D: usize>(grid: &Grid<D>, field: &Tensor<B, 3>) -> Result<()> {
    let dims = field.dims();
    if dims[1] != D || dims[2] != grid.numel() {
        return Err(TransformerError::ShapeMismatch {
            expected: vec![dims[0], D, grid.numel()],
            actual: dims.to_vec(),
        });
    }
    Ok(())
}

impl<B: Backend, const D: usize> SpatialTransform<B, D> for DisplacementFieldTransform<B, D> {
    type Condition = Option<Tensor<B, 3>>;

    fn grid(&self) -> &Grid<D> {
        &self.grid
    }

    fn axes(&self) -> Axes {
        self.axes
    }

    fn condition(&self) -> Self::Condition {
        self.condition.clone()
    }

    fn set_condition(&mut self, condition: Self::Condition) {
        self.condition = condition;
    }

    fn update(&mut self) -> Result<()> {
        if let Some(field) = &self.condition {
            check_field_shape(&self.grid, field)?;
            self.displacement = Param::from_tensor(field.clone());
        }
        Ok(())
    }

    fn transform_points(&self, points: Tensor<B, 3>, grid: bool) -> Tensor<B, 3> {
        let field = self.displacement.val();
        let num_points = points.dims()[1];
        if grid && num_points == self.grid.numel() {
            return points + field.swap_dims(1, 2);
        }
        let indices = self.to_index.apply_tensor(points.clone());
        let sampled = LinearInterpolator::new().interpolate(
            field,
            self.grid.size(),
            indices,
            Padding::Border,
            self.grid.align_corners(),
        );
        points + sampled.swap_dims(1, 2)
    }
}
