//! Spatial transforms.
//!
//! This module provides the [`SpatialTransform`] trait, the
//! [`SharedTransform`] handle through which transformers evaluate
//! transforms, and reference transform implementations.

pub mod affine;
pub mod displacement_field;
pub mod identity;
pub mod shared;
pub mod trait_;

pub use affine::{AffineParams, AffineTransform};
pub use displacement_field::DisplacementFieldTransform;
pub use identity::IdentityTransform;
pub use shared::{PostHook, SharedTransform, UpdateMode};
pub use trait_::SpatialTransform;
