//! Base spatial transformer.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::error::Result;
use crate::transform::{SharedTransform, SpatialTransform, UpdateMode};

/// Wrapper which evaluates a shared spatial transform.
///
/// Conditioning a transformer either mutates the shared transform
/// ([`set_condition`](Self::set_condition)) or forks it into a new
/// transformer ([`with_condition`](Self::with_condition)), leaving the
/// original untouched.
#[derive(Debug)]
pub struct SpatialTransformer<B: Backend, T, const D: usize> {
    transform: SharedTransform<B, T, D>,
}

impl<B, T, const D: usize> SpatialTransformer<B, T, D>
where
    B: Backend,
    T: SpatialTransform<B, D>,
{
    /// Create a transformer for a transform or a shared transform handle.
    pub fn new(transform: impl Into<SharedTransform<B, T, D>>) -> Self {
        Self {
            transform: transform.into(),
        }
    }

    /// Shared handle of the spatial transform.
    pub fn transform(&self) -> &SharedTransform<B, T, D> {
        &self.transform
    }

    /// Current conditioning input of the transform.
    pub fn condition(&self) -> T::Condition {
        self.transform.condition()
    }

    /// Transformer with a conditioned copy of the transform.
    pub fn with_condition(&self, condition: T::Condition) -> Self {
        Self {
            transform: self.transform.fork(condition),
        }
    }

    /// Condition the shared transform in place.
    pub fn set_condition(&self, condition: T::Condition) -> &Self {
        self.transform.set_condition(condition);
        self
    }

    /// Update the transform from its condition.
    pub fn update(&self) -> Result<&Self> {
        self.transform.update()?;
        Ok(self)
    }

    /// Set when the shared transform is updated from its condition.
    ///
    /// The mode belongs to the shared handle, so it applies to every
    /// transformer holding the same transform.
    pub fn set_update_mode(&self, mode: UpdateMode) -> &Self {
        self.transform.set_update_mode(mode);
        self
    }

    /// Evaluate the transform, see [`SharedTransform::invoke`].
    pub fn invoke(&self, points: Tensor<B, 3>, grid: bool) -> Result<Tensor<B, 3>> {
        tracing::trace!("Evaluating spatial transform at {:?} points", points.dims());
        self.transform.invoke(points, grid)
    }
}

impl<B: Backend, T, const D: usize> Clone for SpatialTransformer<B, T, D> {
    fn clone(&self) -> Self {
        Self {
            transform: self.transform.clone(),
        }
    }
}
