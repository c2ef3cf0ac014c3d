//! Point set transformer.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use warpkit_core::{AffineMap, Axes, Grid};

use super::base::SpatialTransformer;
use super::config::PointSetConfig;
use crate::error::{Result, TransformerError};
use crate::transform::{SharedTransform, SpatialTransform};

/// Spatially transform point sets.
///
/// Points are converted from the input convention into the transform axes,
/// mapped by the transform and converted into the output convention.
#[derive(Debug, Clone)]
pub struct PointSetTransformer<B: Backend, T, const D: usize> {
    base: SpatialTransformer<B, T, D>,
    grid: Grid<D>,
    axes: Axes,
    to_grid: Grid<D>,
    to_axes: Axes,
    to_transform: AffineMap<D>,
    from_transform: AffineMap<D>,
}

impl<B, T, const D: usize> PointSetTransformer<B, T, D>
where
    B: Backend,
    T: SpatialTransform<B, D>,
{
    /// Create a new point set transformer.
    pub fn new(transform: impl Into<SharedTransform<B, T, D>>, config: PointSetConfig<D>) -> Result<Self> {
        let base = SpatialTransformer::new(transform);
        let transform_grid = base.transform().grid();
        let transform_axes = base.transform().axes();

        let grid = config.grid.unwrap_or_else(|| transform_grid.clone());
        let axes = config.axes.unwrap_or(transform_axes);
        let to_grid = config.to_grid.unwrap_or_else(|| grid.clone());
        let to_axes = config.to_axes.unwrap_or(axes);

        // A transform never changes its grid or axes, so the maps hold for
        // every evaluation.
        let to_transform = grid.transform_map(axes, &transform_grid, transform_axes)?;
        let from_transform = transform_grid.transform_map(transform_axes, &to_grid, to_axes)?;

        tracing::debug!(
            "Created point set transformer: {} {:?} -> {} {:?} via {}",
            axes,
            grid.size(),
            to_axes,
            to_grid.size(),
            transform_axes
        );

        Ok(Self {
            base,
            grid,
            axes,
            to_grid,
            to_axes,
            to_transform,
            from_transform,
        })
    }

    /// Transform a point set.
    ///
    /// # Arguments
    /// * `points` - Tensor of shape `[..., D]` in the input convention; a
    ///   matrix `[P, D]` is a single point set, higher ranks `[N, ..., D]`
    ///   are batches of point sets
    ///
    /// # Returns
    /// Tensor of the same shape in the output convention
    pub fn forward<const R: usize>(&self, points: Tensor<B, R>) -> Result<Tensor<B, R>> {
        let dims = points.dims();
        if R < 2 || dims[R - 1] != D {
            let mut expected = dims.to_vec();
            if let Some(last) = expected.last_mut() {
                *last = D;
            }
            return Err(TransformerError::ShapeMismatch {
                expected,
                actual: dims.to_vec(),
            });
        }
        let (n, p) = if R == 2 {
            (1, dims[0])
        } else {
            (dims[0], dims[1..R - 1].iter().product::<usize>())
        };

        tracing::trace!("Transforming point set of shape {:?}", dims);
        let points = self.to_transform.apply_tensor(points.reshape([n, p, D]));
        let points = self.base.invoke(points, false)?;
        let points = self.from_transform.apply_tensor(points);
        Ok(points.reshape(dims))
    }

    /// Grid with respect to which input points are defined.
    pub fn target_grid(&self) -> &Grid<D> {
        &self.grid
    }

    pub fn target_axes(&self) -> Axes {
        self.axes
    }

    /// Grid with respect to which output points are defined.
    pub fn source_grid(&self) -> &Grid<D> {
        &self.to_grid
    }

    pub fn source_axes(&self) -> Axes {
        self.to_axes
    }

    pub fn transformer(&self) -> &SpatialTransformer<B, T, D> {
        &self.base
    }

    /// Shared handle of the spatial transform.
    pub fn transform(&self) -> &SharedTransform<B, T, D> {
        self.base.transform()
    }

    pub fn condition(&self) -> T::Condition {
        self.base.condition()
    }

    /// Point set transformer with a conditioned copy of the transform.
    pub fn with_condition(&self, condition: T::Condition) -> Self {
        Self {
            base: self.base.with_condition(condition),
            ..self.clone()
        }
    }

    /// Condition the shared transform in place.
    pub fn set_condition(&self, condition: T::Condition) -> &Self {
        self.base.set_condition(condition);
        self
    }
}
