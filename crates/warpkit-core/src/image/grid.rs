//! Sampling grids.
//!
//! A [`Grid`] describes a discretized spatial domain: number of points per
//! dimension, physical spacing, orientation and position, and whether the
//! normalized cube extrema `-1`/`1` refer to the corner voxel centers or to
//! the outer voxel borders.
//!
//! Sizes and coordinate tuples are ordered `(x, y, z)`. Tensor shapes are
//! ordered `(z, y, x)`, see [`Grid::shape`].

use burn::tensor::backend::Backend;
use burn::tensor::{Int, Shape, Tensor, TensorData};
use nalgebra::{SMatrix, SVector};

use super::axes::Axes;
use crate::error::{Result, SpatialError};
use crate::spatial::{AffineMap, Direction, Point, Spacing};

/// Absolute tolerance used by [`Grid::same_domain_as`].
pub const DOMAIN_TOLERANCE: f64 = 1e-5;

/// Discretized sampling domain.
///
/// # Coordinate Systems
/// * **Grid** (index) space: continuous voxel indices
/// * **Cube** space: normalized coordinates in `[-1, 1]`, see [`Axes`]
/// * **World** space: physical coordinates,
///   `point = origin + Direction * (index * spacing)`
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<const D: usize> {
    size: [usize; D],
    spacing: Spacing<D>,
    center: Point<D>,
    direction: Direction<D>,
    align_corners: bool,
}

impl<const D: usize> Grid<D> {
    /// Create a grid with unit spacing, identity orientation, centered at the
    /// world origin and with aligned corners.
    ///
    /// # Arguments
    /// * `size` - Number of grid points per dimension `(x, y, z)`
    pub fn new(size: [usize; D]) -> Self {
        Self {
            size,
            spacing: Spacing::from_element(1.0),
            center: Point::origin(),
            direction: Direction::identity(),
            align_corners: true,
        }
    }

    /// Create a grid from a tensor shape `(z, y, x)`.
    pub fn from_shape(shape: [usize; D]) -> Self {
        let mut size = shape;
        size.reverse();
        Self::new(size)
    }

    /// Set the grid spacing, keeping the grid center fixed.
    pub fn with_spacing(mut self, spacing: Spacing<D>) -> Self {
        self.spacing = spacing;
        self
    }

    /// Set the orientation, keeping the grid center fixed.
    pub fn with_direction(mut self, direction: Direction<D>) -> Self {
        self.direction = direction;
        self
    }

    /// Set the world position of the grid center.
    pub fn with_center(mut self, center: Point<D>) -> Self {
        self.center = center;
        self
    }

    /// Set the world position of the grid point with zero index.
    ///
    /// The origin is relative to the current spacing and direction, so set
    /// those first.
    pub fn with_origin(mut self, origin: Point<D>) -> Self {
        self.center = origin + self.half_span();
        self
    }

    /// Set whether cube extrema refer to corner voxel centers.
    pub fn with_align_corners(mut self, align_corners: bool) -> Self {
        self.align_corners = align_corners;
        self
    }

    /// Number of grid points per dimension `(x, y, z)`.
    pub fn size(&self) -> [usize; D] {
        self.size
    }

    /// Tensor shape of data sampled on this grid `(z, y, x)`.
    pub fn shape(&self) -> [usize; D] {
        let mut shape = self.size;
        shape.reverse();
        shape
    }

    /// Number of spatial dimensions.
    pub fn ndim(&self) -> usize {
        D
    }

    /// Total number of grid points.
    pub fn numel(&self) -> usize {
        self.size.iter().product()
    }

    /// Physical distance between grid points along each axis.
    pub fn spacing(&self) -> &Spacing<D> {
        &self.spacing
    }

    /// Orientation matrix, columns are the grid axis directions.
    pub fn direction(&self) -> &Direction<D> {
        &self.direction
    }

    /// World position of the grid center.
    pub fn center(&self) -> &Point<D> {
        &self.center
    }

    /// World position of the grid point with zero index.
    pub fn origin(&self) -> Point<D> {
        self.center - self.half_span()
    }

    /// Whether cube extrema refer to corner voxel centers.
    pub fn align_corners(&self) -> bool {
        self.align_corners
    }

    /// Check that this grid defines a non-degenerate domain.
    pub fn validate(&self) -> Result<()> {
        if self.size.iter().any(|&n| n == 0) {
            return Err(SpatialError::invalid_grid(format!(
                "size {:?} must be positive in every dimension",
                self.size
            )));
        }
        if self.spacing.iter().any(|&s| !(s.is_finite() && s > 0.0)) {
            return Err(SpatialError::invalid_grid(format!(
                "spacing {:?} must be positive and finite",
                self.spacing.as_slice()
            )));
        }
        if self.direction.try_inverse().is_none() {
            return Err(SpatialError::singular_matrix("grid direction must be invertible"));
        }
        Ok(())
    }

    /// Whether both grids describe the same domain.
    ///
    /// Sizes must be equal and spacing, center and direction must agree within
    /// [`DOMAIN_TOLERANCE`]. Corner alignment is a sampling convention and not
    /// part of the domain.
    pub fn same_domain_as(&self, other: &Grid<D>) -> bool {
        if self.size != other.size {
            return false;
        }
        let close = |a: &[f64], b: &[f64]| {
            a.iter().zip(b).all(|(x, y)| (x - y).abs() <= DOMAIN_TOLERANCE)
        };
        close(self.spacing.as_slice(), other.spacing.as_slice())
            && close(self.center.coords.as_slice(), other.center.coords.as_slice())
            && close(self.direction.as_slice(), other.direction.as_slice())
    }

    /// Downsample the grid by a factor of two per level.
    ///
    /// The grid center, orientation and cube extent are preserved.
    pub fn downsample(&self, levels: usize) -> Self {
        let mut grid = self.clone();
        for _ in 0..levels {
            for i in 0..D {
                let n = grid.size[i];
                let m = (n + 1) / 2;
                let factor = if grid.align_corners && m > 1 {
                    (n - 1) as f64 / (m - 1) as f64
                } else {
                    n as f64 / m as f64
                };
                grid.size[i] = m;
                grid.spacing[i] *= factor;
            }
        }
        grid
    }

    /// Affine map from `axes` coordinates to continuous voxel indices.
    pub fn axes_to_index(&self, axes: Axes) -> Result<AffineMap<D>> {
        match axes {
            Axes::Grid => Ok(AffineMap::identity()),
            Axes::Cube | Axes::CubeCorners => {
                let mut scale = SVector::<f64, D>::zeros();
                let mut offset = SVector::<f64, D>::zeros();
                for i in 0..D {
                    let m = self.cube_denominator(i, axes);
                    scale[i] = m / 2.0;
                    offset[i] = (self.size[i] as f64 - 1.0) / 2.0;
                }
                Ok(AffineMap::new(SMatrix::from_diagonal(&scale), offset))
            }
            Axes::World => self.index_to_world_map().try_inverse().ok_or_else(|| {
                SpatialError::singular_matrix("grid direction and spacing must be invertible")
            }),
        }
    }

    /// Affine map from continuous voxel indices to `axes` coordinates.
    pub fn index_to_axes(&self, axes: Axes) -> Result<AffineMap<D>> {
        match axes {
            Axes::Grid => Ok(AffineMap::identity()),
            Axes::Cube | Axes::CubeCorners => {
                let mut scale = SVector::<f64, D>::zeros();
                let mut offset = SVector::<f64, D>::zeros();
                for i in 0..D {
                    let m = self.cube_denominator(i, axes);
                    scale[i] = 2.0 / m;
                    offset[i] = -(self.size[i] as f64 - 1.0) / m;
                }
                Ok(AffineMap::new(SMatrix::from_diagonal(&scale), offset))
            }
            Axes::World => Ok(self.index_to_world_map()),
        }
    }

    /// Affine map from `axes` coordinates to world coordinates.
    pub fn axes_to_world(&self, axes: Axes) -> Result<AffineMap<D>> {
        if axes == Axes::World {
            return Ok(AffineMap::identity());
        }
        Ok(self.axes_to_index(axes)?.then(&self.index_to_world_map()))
    }

    /// Affine map from world coordinates to `axes` coordinates.
    pub fn world_to_axes(&self, axes: Axes) -> Result<AffineMap<D>> {
        if axes == Axes::World {
            return Ok(AffineMap::identity());
        }
        Ok(self.axes_to_index(Axes::World)?.then(&self.index_to_axes(axes)?))
    }

    /// Affine map from `(self, axes)` coordinates to `(to_grid, to_axes)` coordinates.
    pub fn transform_map(&self, axes: Axes, to_grid: &Grid<D>, to_axes: Axes) -> Result<AffineMap<D>> {
        if self == to_grid {
            if axes == to_axes {
                return Ok(AffineMap::identity());
            }
            if axes != Axes::World && to_axes != Axes::World {
                return Ok(self.axes_to_index(axes)?.then(&self.index_to_axes(to_axes)?));
            }
        }
        Ok(self.axes_to_world(axes)?.then(&to_grid.world_to_axes(to_axes)?))
    }

    /// Transform point coordinates from `(self, axes)` to `(to_grid, to_axes)`.
    ///
    /// # Arguments
    /// * `points` - Tensor of shape `[..., D]`
    /// * `decimals` - Round the result to this many decimal places, if given
    ///
    /// # Returns
    /// Tensor of the same shape with converted coordinates
    pub fn transform_points<B: Backend, const R: usize>(
        &self,
        points: Tensor<B, R>,
        axes: Axes,
        to_grid: &Grid<D>,
        to_axes: Axes,
        decimals: Option<u32>,
    ) -> Result<Tensor<B, R>> {
        check_coord_dim::<B, R, D>(&points)?;
        let map = self.transform_map(axes, to_grid, to_axes)?;
        let points = map.apply_tensor(points);
        Ok(match decimals {
            Some(decimals) => {
                let scale = 10f64.powi(decimals as i32);
                points.mul_scalar(scale).round().div_scalar(scale)
            }
            None => points,
        })
    }

    /// Convert continuous voxel indices to cube coordinates of this grid.
    pub fn index_to_cube<B: Backend, const R: usize>(&self, indices: Tensor<B, R>) -> Result<Tensor<B, R>> {
        self.transform_points(indices, Axes::Grid, self, Axes::from_grid(self), None)
    }

    /// Convert cube coordinates of this grid to continuous voxel indices.
    pub fn cube_to_index<B: Backend, const R: usize>(&self, coords: Tensor<B, R>) -> Result<Tensor<B, R>> {
        self.transform_points(coords, Axes::from_grid(self), self, Axes::Grid, None)
    }

    /// Convert continuous voxel indices to world coordinates.
    pub fn index_to_world<B: Backend, const R: usize>(&self, indices: Tensor<B, R>) -> Result<Tensor<B, R>> {
        self.transform_points(indices, Axes::Grid, self, Axes::World, None)
    }

    /// Convert world coordinates to continuous voxel indices.
    pub fn world_to_index<B: Backend, const R: usize>(&self, points: Tensor<B, R>) -> Result<Tensor<B, R>> {
        self.transform_points(points, Axes::World, self, Axes::Grid, None)
    }

    /// Cube coordinates of all grid points.
    ///
    /// Coordinates are given with respect to [`Axes::from_grid`], the point
    /// order is that of a flattened `(z, y, x)` tensor, i.e. `x` varies
    /// fastest.
    ///
    /// # Arguments
    /// * `flip` - Order coordinate columns `(z, y, x)` instead of `(x, y, z)`
    /// * `device` - The device to create the tensor on
    ///
    /// # Returns
    /// Tensor of shape `[N, D]` where N is the number of grid points
    pub fn coords<B: Backend>(&self, flip: bool, device: &B::Device) -> Tensor<B, 2> {
        let total = self.numel();
        let mut scale = [0.0f64; D];
        let mut offset = [0.0f64; D];
        for i in 0..D {
            let m = self.cube_denominator(i, Axes::from_grid(self));
            scale[i] = 2.0 / m;
            offset[i] = (self.size[i] as f64 - 1.0) / m;
        }

        let mut grid = Vec::with_capacity(total * D);
        let mut index = [0usize; D];
        for _ in 0..total {
            for k in 0..D {
                let i = if flip { D - 1 - k } else { k };
                grid.push((index[i] as f64 * scale[i] - offset[i]) as f32);
            }
            // Increment x first
            for i in 0..D {
                index[i] += 1;
                if index[i] < self.size[i] {
                    break;
                }
                index[i] = 0;
            }
        }

        Tensor::<B, 1>::from_data(TensorData::new(grid, Shape::new([total * D])), device)
            .reshape([total, D])
    }

    fn index_to_world_map(&self) -> AffineMap<D> {
        let linear = self.direction * SMatrix::from_diagonal(&self.spacing);
        AffineMap::new(linear, self.origin().coords)
    }

    /// World offset from the zero index grid point to the grid center.
    fn half_span(&self) -> SVector<f64, D> {
        let mut half = SVector::<f64, D>::zeros();
        for i in 0..D {
            half[i] = (self.size[i] as f64 - 1.0) / 2.0 * self.spacing[i];
        }
        self.direction * half
    }

    /// Grid extent in voxel units covered by the cube `[-1, 1]`.
    fn cube_denominator(&self, dim: usize, axes: Axes) -> f64 {
        let n = self.size[dim];
        if axes == Axes::CubeCorners {
            n.saturating_sub(1).max(1) as f64
        } else {
            n as f64
        }
    }
}

/// Check that the trailing tensor dimension holds `D` coordinates.
pub(crate) fn check_coord_dim<B: Backend, const R: usize, const D: usize>(
    points: &Tensor<B, R>,
) -> Result<()> {
    let dims = points.dims();
    if R < 1 || dims[R - 1] != D {
        return Err(SpatialError::dimension_mismatch(format!(
            "point tensor of shape {:?} must have trailing dimension {}",
            dims, D
        )));
    }
    Ok(())
}

/// Convert flat voxel indices to voxel coordinates.
///
/// # Arguments
/// * `indices` - Flat indices into a tensor of shape `(z, y, x)`
/// * `size` - Grid size `(x, y, z)`
///
/// # Returns
/// Tensor of shape `[N, D]` with coordinates ordered `(x, y, z)`
pub fn unravel_coords<B: Backend, const D: usize>(
    indices: Tensor<B, 1, Int>,
    size: [usize; D],
) -> Tensor<B, 2> {
    let mut columns = Vec::with_capacity(D);
    let mut stride = 1usize;
    for &n in size.iter() {
        let q = indices.clone().div_scalar(stride as i64);
        let r = q.clone() - q.div_scalar(n as i64).mul_scalar(n as i64);
        columns.push(r.float().unsqueeze_dim::<2>(1));
        stride *= n;
    }
    Tensor::cat(columns, 1)
}
