//! Image transformer.
//!
//! Resamples images at the points of a target grid mapped by a spatial
//! transform into the source domain.

use std::collections::BTreeMap;

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use warpkit_core::{AffineMap, Axes, Grid, ImageSampler};

use super::base::SpatialTransformer;
use super::config::ImageTransformerConfig;
use super::reverse_coords;
use crate::error::{Result, TransformerError};
use crate::transform::{SharedTransform, SpatialTransform};

/// Key of the [`ImageTransformer::sample_batch`] entry used as mask.
pub const MASK_KEY: &str = "mask";

/// Entry of a batch resampled by [`ImageTransformer::sample_batch`].
#[derive(Debug, Clone)]
pub enum SampleEntry<B: Backend, const R: usize, const D: usize> {
    /// Image batch `[N, C, ...]` which is resampled.
    Tensor(Tensor<B, R>),
    /// Grid of the batch, replaced by the target grid.
    Grid(Grid<D>),
}

/// Spatially transform images.
///
/// The transform is evaluated at the points of the target grid. Transformed
/// points are cube coordinates of the target grid at which source images
/// are sampled.
#[derive(Debug, Clone)]
pub struct ImageTransformer<B: Backend, T, const D: usize> {
    base: SpatialTransformer<B, T, D>,
    sampler: ImageSampler<D>,
    flip_coords: bool,
    /// Target grid points in transform axes `[1, P, D]`, flipped if requested.
    grid_coords: Tensor<B, 3>,
    /// Transform axes to target cube, if they differ.
    to_target_cube: Option<AffineMap<D>>,
}

impl<B, T, const D: usize> ImageTransformer<B, T, D>
where
    B: Backend,
    T: SpatialTransform<B, D>,
{
    /// Create a new image transformer.
    ///
    /// # Arguments
    /// * `transform` - Spatial transform or shared transform handle
    /// * `config` - Target and source grids and sampling policy
    /// * `device` - Device on which the target grid points are created
    ///
    /// # Errors
    /// [`TransformerError::DomainMismatch`] if the target grid and the
    /// transform grid do not define the same domain.
    pub fn new(
        transform: impl Into<SharedTransform<B, T, D>>,
        config: ImageTransformerConfig<D>,
        device: &B::Device,
    ) -> Result<Self> {
        let base = SpatialTransformer::new(transform);
        let transform_grid = base.transform().grid();
        let transform_axes = base.transform().axes();

        let target = config.target.unwrap_or_else(|| transform_grid.clone());
        if !transform_grid.same_domain_as(&target) {
            return Err(TransformerError::domain_mismatch(
                "ImageTransformer::new() 'target' and 'transform' grid must define the same domain",
            ));
        }
        let source = config.source.unwrap_or_else(|| target.clone());
        let sampler = ImageSampler::new(
            target.clone(),
            source,
            config.sampling,
            config.padding,
            config.align_centers,
        )?;

        let target_axes = Axes::from_grid(&target);
        let mut grid_coords = target.coords::<B>(config.flip_coords, device).unsqueeze_dim::<3>(0);
        let to_target_cube = if transform_axes != target_axes {
            let to_transform = target.transform_map(target_axes, &transform_grid, transform_axes)?;
            let map = if config.flip_coords {
                to_transform.reversed()
            } else {
                to_transform
            };
            grid_coords = map.apply_tensor(grid_coords);
            Some(transform_grid.transform_map(transform_axes, &target, target_axes)?)
        } else {
            None
        };

        tracing::debug!(
            "Created image transformer: target {:?}, source {:?}, transform axes {}, flip_coords={}",
            target.size(),
            sampler.source_grid().size(),
            transform_axes,
            config.flip_coords
        );

        Ok(Self {
            base,
            sampler,
            flip_coords: config.flip_coords,
            grid_coords,
            to_target_cube,
        })
    }

    /// Resample a batch of source images `[N, C, ...source.shape()]`.
    ///
    /// # Returns
    /// Transformed images `[N, C, ...target.shape()]`
    pub fn sample<const R: usize>(&self, data: Tensor<B, R>) -> Result<Tensor<B, R>> {
        let coords = self.transformed_coords()?;
        Ok(self.sampler.sample(coords, data)?)
    }

    /// Resample a batch of source images and their masks.
    ///
    /// # Returns
    /// Tuple of transformed images and binary masks; image values outside
    /// the mask are set to the padding fill value
    pub fn sample_with_mask<const R: usize>(
        &self,
        data: Tensor<B, R>,
        mask: Tensor<B, R>,
    ) -> Result<(Tensor<B, R>, Tensor<B, R>)> {
        let coords = self.transformed_coords()?;
        Ok(self.sampler.sample_with_mask(coords, data, mask)?)
    }

    /// Resample every tensor of a named batch.
    ///
    /// The transform is evaluated once. An entry keyed [`MASK_KEY`] is
    /// resampled as a mask and applied to all other tensor entries. Grid
    /// entries are replaced by the target grid.
    pub fn sample_batch<const R: usize>(
        &self,
        batch: BTreeMap<String, SampleEntry<B, R, D>>,
    ) -> Result<BTreeMap<String, SampleEntry<B, R, D>>> {
        let coords = self.transformed_coords()?;
        let mask = match batch.get(MASK_KEY) {
            Some(SampleEntry::Tensor(mask)) => Some(self.sampler.sample_mask(coords.clone(), mask.clone())?),
            Some(SampleEntry::Grid(_)) => {
                return Err(TransformerError::invalid_configuration(format!(
                    "ImageTransformer::sample_batch() '{}' entry must be a tensor",
                    MASK_KEY
                )))
            }
            None => None,
        };

        let mut output = BTreeMap::new();
        for (key, entry) in batch {
            let entry = match entry {
                SampleEntry::Grid(_) => SampleEntry::Grid(self.target_grid().clone()),
                SampleEntry::Tensor(_) if key == MASK_KEY => continue,
                SampleEntry::Tensor(data) => {
                    let sampled = self.sampler.sample(coords.clone(), data)?;
                    match &mask {
                        Some(mask) => SampleEntry::Tensor(self.sampler.apply_mask(sampled, mask.clone())),
                        None => SampleEntry::Tensor(sampled),
                    }
                }
            };
            output.insert(key, entry);
        }
        if let Some(mask) = mask {
            output.insert(MASK_KEY.to_string(), SampleEntry::Tensor(mask));
        }
        Ok(output)
    }

    /// Target grid points mapped by the transform, in target cube coordinates `(x, y, z)`.
    pub fn transformed_coords(&self) -> Result<Tensor<B, 3>> {
        let coords = self.base.invoke(self.grid_coords.clone(), true)?;
        let coords = if self.flip_coords {
            reverse_coords(coords)
        } else {
            coords
        };
        Ok(match &self.to_target_cube {
            Some(map) => map.apply_tensor(coords),
            None => coords,
        })
    }

    pub fn target_grid(&self) -> &Grid<D> {
        self.sampler.target_grid()
    }

    pub fn source_grid(&self) -> &Grid<D> {
        self.sampler.source_grid()
    }

    pub fn align_centers(&self) -> bool {
        self.sampler.align_centers()
    }

    pub fn flip_coords(&self) -> bool {
        self.flip_coords
    }

    pub fn sampler(&self) -> &ImageSampler<D> {
        &self.sampler
    }

    /// Cached target grid points passed to the transform.
    pub fn grid_coords(&self) -> &Tensor<B, 3> {
        &self.grid_coords
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

    /// Image transformer with a conditioned copy of the transform.
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
