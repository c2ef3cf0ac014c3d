//! Identity transform.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use warpkit_core::{Axes, Grid};

use super::trait_::SpatialTransform;

/// Transform which maps every point onto itself.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentityTransform<const D: usize> {
    grid: Grid<D>,
    axes: Axes,
}

impl<const D: usize> IdentityTransform<D> {
    /// Create an identity transform on the cube axes of `grid`.
    pub fn new(grid: Grid<D>) -> Self {
        let axes = Axes::from_grid(&grid);
        Self { grid, axes }
    }

    /// Use other coordinate axes.
    pub fn with_axes(mut self, axes: Axes) -> Self {
        self.axes = axes;
        self
    }
}

impl<B: Backend, const D: usize> SpatialTransform<B, D> for IdentityTransform<D> {
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
        points
    }
}
