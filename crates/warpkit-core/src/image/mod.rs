//! Image types and operations.
//!
//! This module provides the sampling [`Grid`], the coordinate [`Axes`]
//! conventions defined on it and the [`Image`] type.

pub mod axes;
pub mod grid;
pub mod image;
pub mod synthetic;

pub use axes::{Axes, IntoAxes};
pub use grid::{unravel_coords, Grid, DOMAIN_TOLERANCE};
pub use image::{Image, Normalization};
pub use synthetic::{circle_image, cshape_image, image_batch};
