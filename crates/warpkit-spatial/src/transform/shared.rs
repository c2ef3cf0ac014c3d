//! Shared transform handle.
//!
//! Transformers do not own their transform. They hold a [`SharedTransform`],
//! a reference counted handle, so that several transformers may evaluate
//! the same transform and see each other's parameter changes.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use serde::{Deserialize, Serialize};
use warpkit_core::{Axes, Grid};

use super::trait_::SpatialTransform;
use crate::error::{Result, TransformerError};

/// When a shared transform updates its parameters from its condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateMode {
    /// Update before every evaluation.
    #[default]
    Auto,
    /// Update only on explicit [`SharedTransform::update`] calls.
    Manual,
}

impl fmt::Display for UpdateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateMode::Auto => f.write_str("auto"),
            UpdateMode::Manual => f.write_str("manual"),
        }
    }
}

impl FromStr for UpdateMode {
    type Err = TransformerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(UpdateMode::Auto),
            "manual" => Ok(UpdateMode::Manual),
            _ => Err(TransformerError::invalid_configuration(format!(
                "update mode '{}' is not one of 'auto', 'manual'",
                s
            ))),
        }
    }
}

/// Callback invoked with the output of every transform evaluation.
pub type PostHook<B> = Rc<dyn Fn(&Tensor<B, 3>)>;

struct Inner<B: Backend, T> {
    transform: T,
    mode: UpdateMode,
    post_hooks: Vec<PostHook<B>>,
}

/// Reference counted, interior mutable handle to a spatial transform.
///
/// Cloning the handle shares the transform. Use [`fork`](Self::fork) for an
/// independent copy.
pub struct SharedTransform<B: Backend, T, const D: usize> {
    inner: Rc<RefCell<Inner<B, T>>>,
}

impl<B, T, const D: usize> SharedTransform<B, T, D>
where
    B: Backend,
    T: SpatialTransform<B, D>,
{
    /// Wrap a transform in a new handle with automatic updates.
    pub fn new(transform: T) -> Self {
        Self::with_state(transform, UpdateMode::Auto, Vec::new())
    }

    fn with_state(transform: T, mode: UpdateMode, post_hooks: Vec<PostHook<B>>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                transform,
                mode,
                post_hooks,
            })),
        }
    }

    /// Evaluate the transform.
    ///
    /// In [`UpdateMode::Auto`] the transform is updated from its condition
    /// first. Post hooks run after the evaluation in registration order.
    pub fn invoke(&self, points: Tensor<B, 3>, grid: bool) -> Result<Tensor<B, 3>> {
        let (output, hooks) = {
            let mut inner = self.inner.borrow_mut();
            if inner.mode == UpdateMode::Auto {
                tracing::trace!("Updating transform before evaluation");
                inner.transform.update()?;
            }
            let output = inner.transform.transform_points(points, grid);
            (output, inner.post_hooks.clone())
        };
        for hook in hooks.iter() {
            hook(&output);
        }
        Ok(output)
    }

    /// Update the transform from its condition.
    pub fn update(&self) -> Result<()> {
        tracing::trace!("Updating transform");
        self.inner.borrow_mut().transform.update()
    }

    /// When the transform is updated from its condition.
    pub fn update_mode(&self) -> UpdateMode {
        self.inner.borrow().mode
    }

    /// Switch between automatic and manual updates for every holder of this handle.
    pub fn set_update_mode(&self, mode: UpdateMode) {
        self.inner.borrow_mut().mode = mode;
    }

    /// Register a callback run with the output of every evaluation.
    pub fn add_post_hook(&self, hook: impl Fn(&Tensor<B, 3>) + 'static) {
        self.inner.borrow_mut().post_hooks.push(Rc::new(hook));
    }

    /// Current conditioning input of the transform.
    pub fn condition(&self) -> T::Condition {
        self.inner.borrow().transform.condition()
    }

    /// Condition the shared transform; visible through every clone of this handle.
    pub fn set_condition(&self, condition: T::Condition) {
        self.inner.borrow_mut().transform.set_condition(condition);
    }

    /// Independent copy of the transform with a new condition.
    ///
    /// The copy starts with the update mode and post hooks of this handle.
    pub fn fork(&self, condition: T::Condition) -> Self {
        let inner = self.inner.borrow();
        let mut transform = inner.transform.clone();
        transform.set_condition(condition);
        Self::with_state(transform, inner.mode, inner.post_hooks.clone())
    }

    /// Whether both handles share the same transform.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Immutable access to the transform.
    pub fn borrow(&self) -> Ref<'_, T> {
        Ref::map(self.inner.borrow(), |inner| &inner.transform)
    }

    /// Mutable access to the transform, e.g. to assign new parameters.
    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        RefMut::map(self.inner.borrow_mut(), |inner| &mut inner.transform)
    }

    /// Copy of the grid defining the transform domain.
    pub fn grid(&self) -> Grid<D> {
        self.borrow().grid().clone()
    }

    /// Coordinate axes of points the transform is evaluated at.
    pub fn axes(&self) -> Axes {
        self.borrow().axes()
    }
}

impl<B: Backend, T, const D: usize> Clone for SharedTransform<B, T, D> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<B, T, const D: usize> From<T> for SharedTransform<B, T, D>
where
    B: Backend,
    T: SpatialTransform<B, D>,
{
    fn from(transform: T) -> Self {
        Self::new(transform)
    }
}

impl<B: Backend, T: fmt::Debug, const D: usize> fmt::Debug for SharedTransform<B, T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("SharedTransform")
            .field("transform", &inner.transform)
            .field("mode", &inner.mode)
            .field("post_hooks", &inner.post_hooks.len())
            .finish()
    }
}
