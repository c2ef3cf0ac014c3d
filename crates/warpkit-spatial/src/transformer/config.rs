//! Transformer configuration.

use warpkit_core::{Axes, Grid, IntoAxes, Padding, Sampling};

use crate::error::Result;

/// Configuration for image transformers.
///
/// # Examples
/// ```rust
/// use warpkit_core::{Grid, Padding};
/// use warpkit_spatial::ImageTransformerConfig;
///
/// let config = ImageTransformerConfig::default()
///     .with_source(Grid::new([128, 128]))
///     .with_padding(Padding::Zeros)
///     .with_flip_coords(true);
/// assert!(config.target.is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ImageTransformerConfig<const D: usize> {
    /// Grid of sampled images, defaults to the transform grid.
    pub target: Option<Grid<D>>,
    /// Grid of input images, defaults to the target grid.
    pub source: Option<Grid<D>>,
    pub sampling: Sampling,
    pub padding: Padding,
    /// Map target onto source cube by its linear part only.
    pub align_centers: bool,
    /// Transform receives coordinates ordered `(z, y, x)`.
    pub flip_coords: bool,
}

impl<const D: usize> ImageTransformerConfig<D> {
    pub fn with_target(mut self, target: Grid<D>) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_source(mut self, source: Grid<D>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_sampling(mut self, sampling: Sampling) -> Self {
        self.sampling = sampling;
        self
    }

    pub fn with_padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_align_centers(mut self, align_centers: bool) -> Self {
        self.align_centers = align_centers;
        self
    }

    pub fn with_flip_coords(mut self, flip_coords: bool) -> Self {
        self.flip_coords = flip_coords;
        self
    }
}

/// Configuration for point set transformers.
///
/// Input points are given with respect to `grid` and `axes`, output points
/// with respect to `to_grid` and `to_axes`. Unset input conventions default
/// to those of the transform, unset output conventions to the input ones.
#[derive(Debug, Clone, Default)]
pub struct PointSetConfig<const D: usize> {
    pub grid: Option<Grid<D>>,
    pub axes: Option<Axes>,
    pub to_grid: Option<Grid<D>>,
    pub to_axes: Option<Axes>,
}

impl<const D: usize> PointSetConfig<D> {
    pub fn with_grid(mut self, grid: Grid<D>) -> Self {
        self.grid = Some(grid);
        self
    }

    /// Set the input axes from an [`Axes`] value or identifier.
    pub fn with_axes(mut self, axes: impl IntoAxes) -> Result<Self> {
        self.axes = Some(Axes::from_arg(axes)?);
        Ok(self)
    }

    pub fn with_to_grid(mut self, to_grid: Grid<D>) -> Self {
        self.to_grid = Some(to_grid);
        self
    }

    /// Set the output axes from an [`Axes`] value or identifier.
    pub fn with_to_axes(mut self, to_axes: impl IntoAxes) -> Result<Self> {
        self.to_axes = Some(Axes::from_arg(to_axes)?);
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransformerError;
    use warpkit_core::SpatialError;

    #[test]
    fn test_image_config_defaults() {
        let config = ImageTransformerConfig::<3>::default();
        assert!(config.target.is_none());
        assert!(config.source.is_none());
        assert_eq!(config.sampling, Sampling::Linear);
        assert_eq!(config.padding, Padding::Border);
        assert!(!config.align_centers);
        assert!(!config.flip_coords);
    }

    #[test]
    fn test_point_set_axes_from_str() {
        let config = PointSetConfig::<2>::default()
            .with_axes("world")
            .unwrap()
            .with_to_axes(Axes::Grid)
            .unwrap();
        assert_eq!(config.axes, Some(Axes::World));
        assert_eq!(config.to_axes, Some(Axes::Grid));

        let result = PointSetConfig::<2>::default().with_to_axes("voxel");
        assert!(matches!(
            result,
            Err(TransformerError::Spatial(SpatialError::InvalidAxes(_)))
        ));
    }
}
