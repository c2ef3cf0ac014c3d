//! Spatial transform trait.
//!
//! This module defines the core SpatialTransform trait that all spatial
//! transforms must implement to be wrapped by a transformer.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use warpkit_core::{Axes, Grid};

use crate::error::Result;

/// Spatial transformation of point coordinates.
///
/// A spatial transform maps points from the target domain to the source
/// domain. Its domain is described by [`grid`](SpatialTransform::grid) and
/// points are given with respect to [`axes`](SpatialTransform::axes).
///
/// Transforms may be conditioned on an input, e.g. a displacement field
/// predicted by a network. Conditioning is stored by
/// [`set_condition`](SpatialTransform::set_condition) and takes effect in
/// [`update`](SpatialTransform::update), which the shared handle calls
/// before each evaluation unless updates are manual.
///
/// # Type Parameters
/// * `B` - The Burn backend
/// * `D` - The spatial dimensionality (2 or 3)
pub trait SpatialTransform<B: Backend, const D: usize>: Clone {
    /// Conditioning input of this transform.
    type Condition: Clone;

    /// Sampling grid defining the domain of the transform.
    fn grid(&self) -> &Grid<D>;

    /// Coordinate axes of points passed to [`transform_points`](SpatialTransform::transform_points).
    fn axes(&self) -> Axes {
        Axes::from_grid(self.grid())
    }

    /// Current conditioning input.
    fn condition(&self) -> Self::Condition;

    /// Replace the conditioning input.
    fn set_condition(&mut self, condition: Self::Condition);

    /// Update transform parameters from the conditioning input.
    ///
    /// Fails without changing the parameters when the condition does not
    /// fit the transform.
    fn update(&mut self) -> Result<()> {
        Ok(())
    }

    /// Apply the transform to a batch of points.
    ///
    /// # Arguments
    /// * `points` - Tensor of shape `[N, P, D]` with coordinates in [`axes`](SpatialTransform::axes)
    /// * `grid` - Whether `points` are the coordinates of all points of
    ///   [`grid`](SpatialTransform::grid) in flattened order
    ///
    /// # Returns
    /// Tensor of shape `[N, P, D]` containing the transformed points
    fn transform_points(&self, points: Tensor<B, 3>, grid: bool) -> Tensor<B, 3>;
}
