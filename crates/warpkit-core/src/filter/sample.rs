//! Image sampling filter.
//!
//! [`ImageSampler`] resamples a batch of source images at sampling positions
//! given as normalized cube coordinates of a target grid. The mapping from
//! target cube coordinates to source voxel indices is precomputed once in
//! double precision.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::error::{Result, SpatialError};
use crate::image::{Axes, Grid};
use crate::interpolation::{interpolate, Padding, Sampling};
use crate::spatial::AffineMap;

/// Mask values at or above this level after linear resampling are inside.
pub const MASK_THRESHOLD: f64 = 0.5;

/// Sample source images at target grid cube coordinates.
///
/// Sampling positions are ordered `(x, y, z)` and given with respect to
/// [`Axes::from_grid`] of the target grid. Image batches have shape
/// `[N, C, ...source.shape()]` and sampled batches
/// `[N, C, ...target.shape()]`.
#[derive(Debug, Clone)]
pub struct ImageSampler<const D: usize> {
    target: Grid<D>,
    source: Grid<D>,
    sampling: Sampling,
    padding: Padding,
    align_centers: bool,
    cube_to_index: AffineMap<D>,
}

impl<const D: usize> ImageSampler<D> {
    /// Create a new image sampler.
    ///
    /// # Arguments
    /// * `target` - Grid on which sampled images are defined
    /// * `source` - Grid on which input images are defined
    /// * `sampling` - Interpolation mode
    /// * `padding` - Extrapolation mode
    /// * `align_centers` - Map the target cube onto the source cube by its
    ///   linear part only, so that grid centers coincide
    pub fn new(
        target: Grid<D>,
        source: Grid<D>,
        sampling: Sampling,
        padding: Padding,
        align_centers: bool,
    ) -> Result<Self> {
        target.validate()?;
        source.validate()?;

        let mut cube_map = target.transform_map(Axes::from_grid(&target), &source, Axes::from_grid(&source))?;
        if align_centers {
            cube_map = cube_map.linear_part();
        }
        let cube_to_index = cube_map.then(&source.axes_to_index(Axes::from_grid(&source))?);

        tracing::debug!(
            "Created image sampler: target {:?}, source {:?}, sampling={}, padding={}, align_centers={}",
            target.size(),
            source.size(),
            sampling,
            padding,
            align_centers
        );

        Ok(Self {
            target,
            source,
            sampling,
            padding,
            align_centers,
            cube_to_index,
        })
    }

    pub fn target_grid(&self) -> &Grid<D> {
        &self.target
    }

    pub fn source_grid(&self) -> &Grid<D> {
        &self.source
    }

    pub fn sampling(&self) -> Sampling {
        self.sampling
    }

    pub fn padding(&self) -> Padding {
        self.padding
    }

    pub fn align_centers(&self) -> bool {
        self.align_centers
    }

    /// Map from target cube coordinates to source voxel indices.
    pub fn cube_to_index(&self) -> &AffineMap<D> {
        &self.cube_to_index
    }

    /// Sample a batch of source images.
    ///
    /// # Arguments
    /// * `coords` - Target cube coordinates `[N, P, D]` with `P` equal to the
    ///   number of target grid points; a batch of one is shared by all images
    /// * `data` - Source images `[N, C, ...source.shape()]`
    ///
    /// # Returns
    /// Sampled images `[N, C, ...target.shape()]`
    pub fn sample<B: Backend, const R: usize>(&self, coords: Tensor<B, 3>, data: Tensor<B, R>) -> Result<Tensor<B, R>> {
        self.resample(coords, data, self.sampling, self.padding)
    }

    /// Sample a batch of source images together with their masks.
    ///
    /// The mask is resampled linearly with zero padding and binarized at
    /// [`MASK_THRESHOLD`]. Sampled data outside the mask is set to the fill
    /// value of the padding mode.
    ///
    /// # Returns
    /// Tuple of sampled images and sampled masks
    pub fn sample_with_mask<B: Backend, const R: usize>(
        &self,
        coords: Tensor<B, 3>,
        data: Tensor<B, R>,
        mask: Tensor<B, R>,
    ) -> Result<(Tensor<B, R>, Tensor<B, R>)> {
        let data = self.resample(coords.clone(), data, self.sampling, self.padding)?;
        let mask = self.sample_mask(coords, mask)?;
        Ok((self.apply_mask(data, mask.clone()), mask))
    }

    /// Resample a mask with linear interpolation and zero padding and
    /// binarize it at [`MASK_THRESHOLD`].
    pub fn sample_mask<B: Backend, const R: usize>(&self, coords: Tensor<B, 3>, mask: Tensor<B, R>) -> Result<Tensor<B, R>> {
        let mask = self.resample(coords, mask, Sampling::Linear, Padding::Zeros)?;
        Ok(mask.greater_equal_elem(MASK_THRESHOLD).float())
    }

    /// Set sampled data outside a binary mask to the padding fill value.
    ///
    /// The mask may have a single channel which then applies to all channels.
    pub fn apply_mask<B: Backend, const R: usize>(&self, data: Tensor<B, R>, mask: Tensor<B, R>) -> Tensor<B, R> {
        let fill = self.padding.fill_value();
        if fill == 0.0 {
            return data * mask;
        }
        let outside = mask.clone().neg().add_scalar(1.0);
        data * mask + outside.mul_scalar(fill)
    }

    fn resample<B: Backend, const R: usize>(
        &self,
        coords: Tensor<B, 3>,
        data: Tensor<B, R>,
        sampling: Sampling,
        padding: Padding,
    ) -> Result<Tensor<B, R>> {
        let [n, c] = check_batch_shape(&data, &self.source)?;
        let coord_dims = coords.dims();
        if coord_dims[1] != self.target.numel() || coord_dims[2] != D {
            return Err(SpatialError::ShapeMismatch {
                expected: vec![coord_dims[0], self.target.numel(), D],
                actual: coord_dims.to_vec(),
            });
        }

        let flat = data.reshape([n, c, self.source.numel()]);
        let indices = self.cube_to_index.apply_tensor(coords);
        let sampled = interpolate(
            flat,
            self.source.size(),
            indices,
            sampling,
            padding,
            self.source.align_corners(),
        )?;

        let mut shape = [0usize; R];
        shape[0] = sampled.dims()[0];
        shape[1] = c;
        shape[2..].copy_from_slice(&self.target.shape());
        Ok(sampled.reshape(shape))
    }
}

/// Check that `data` is an image batch `[N, C, ...grid.shape()]` and return `[N, C]`.
pub fn check_batch_shape<B: Backend, const R: usize, const D: usize>(
    data: &Tensor<B, R>,
    grid: &Grid<D>,
) -> Result<[usize; 2]> {
    let dims = data.dims();
    if R != D + 2 {
        return Err(SpatialError::dimension_mismatch(format!(
            "image batch of rank {} must have rank {} for a {}-dimensional grid",
            R,
            D + 2,
            D
        )));
    }
    if dims[2..] != grid.shape()[..] {
        let mut expected = vec![dims[0], dims[1]];
        expected.extend_from_slice(&grid.shape());
        return Err(SpatialError::ShapeMismatch {
            expected,
            actual: dims.to_vec(),
        });
    }
    Ok([dims[0], dims[1]])
}
