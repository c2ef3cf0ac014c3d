//! Spatial transforms and transformers.
//!
//! A spatial transform maps points of a target domain to a source domain.
//! Transformers apply such a transform to data:
//!
//! * [`ImageTransformer`] resamples source images at the transformed points
//!   of a target grid.
//! * [`PointSetTransformer`] maps point sets between coordinate conventions
//!   through the transform.
//!
//! Transforms are shared between transformers through a
//! [`SharedTransform`] handle which also drives parameter updates from the
//! transform's conditioning input.

pub mod error;
pub mod transform;
pub mod transformer;

pub use error::{Result, TransformerError};
pub use transform::{
    AffineTransform, DisplacementFieldTransform, IdentityTransform, SharedTransform, SpatialTransform, UpdateMode,
};
pub use transformer::{
    ImageTransformer, ImageTransformerConfig, PointSetConfig, PointSetTransformer, SampleEntry, SpatialTransformer,
};
