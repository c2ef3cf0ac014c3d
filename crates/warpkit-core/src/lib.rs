//! Grids, coordinate conventions, interpolation and image sampling.
//!
//! `warpkit-core` provides the building blocks shared by spatial transforms:
//! the sampling [`Grid`] and its [`Axes`] conventions, double precision
//! [`AffineMap`]s between them, interpolation kernels with their
//! [`Padding`] policy and the [`ImageSampler`] which resamples image
//! batches at transformed grid coordinates.

pub mod error;
pub mod filter;
pub mod image;
pub mod interpolation;
pub mod spatial;

pub use error::{Result, SpatialError};
pub use filter::ImageSampler;
pub use image::{circle_image, cshape_image, image_batch, unravel_coords, Axes, Grid, Image, IntoAxes, Normalization};
pub use interpolation::{Padding, Sampling};
pub use spatial::{AffineMap, Direction, Point, Spacing, Vector};
