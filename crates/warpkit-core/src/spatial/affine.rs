//! Affine coordinate maps.
//!
//! Every conversion between grid coordinate systems (index, cube, world) is
//! affine. Maps are composed in double precision on the CPU and applied to
//! coordinate tensors in one fused multiply-add.

use burn::tensor::backend::Backend;
use burn::tensor::{Shape, Tensor, TensorData};
use nalgebra::{SMatrix, SVector};

use super::Point;

/// Affine map `y = A x + b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineMap<const D: usize> {
    linear: SMatrix<f64, D, D>,
    offset: SVector<f64, D>,
}

impl<const D: usize> AffineMap<D> {
    /// Create a new affine map from its linear part and offset.
    pub fn new(linear: SMatrix<f64, D, D>, offset: SVector<f64, D>) -> Self {
        Self { linear, offset }
    }

    /// Identity map.
    pub fn identity() -> Self {
        Self::new(SMatrix::identity(), SVector::zeros())
    }

    /// Pure translation.
    pub fn from_translation(offset: SVector<f64, D>) -> Self {
        Self::new(SMatrix::identity(), offset)
    }

    /// Pure linear map.
    pub fn from_linear(linear: SMatrix<f64, D, D>) -> Self {
        Self::new(linear, SVector::zeros())
    }

    /// Linear part `A`.
    pub fn linear(&self) -> &SMatrix<f64, D, D> {
        &self.linear
    }

    /// Offset `b`.
    pub fn offset(&self) -> &SVector<f64, D> {
        &self.offset
    }

    /// Same map with the translation removed.
    pub fn linear_part(&self) -> Self {
        Self::from_linear(self.linear)
    }

    /// Composition which applies `self` first and `next` second.
    pub fn then(&self, next: &Self) -> Self {
        Self::new(
            next.linear * self.linear,
            next.linear * self.offset + next.offset,
        )
    }

    /// Inverse map, if the linear part is invertible.
    pub fn try_inverse(&self) -> Option<Self> {
        let inv = self.linear.try_inverse()?;
        Some(Self::new(inv, -(inv * self.offset)))
    }

    /// Same map acting on coordinate tuples given in reverse order,
    /// i.e. `(z, y, x)` instead of `(x, y, z)`.
    pub fn reversed(&self) -> Self {
        let mut linear = SMatrix::<f64, D, D>::zeros();
        let mut offset = SVector::<f64, D>::zeros();
        for r in 0..D {
            offset[r] = self.offset[D - 1 - r];
            for c in 0..D {
                linear[(r, c)] = self.linear[(D - 1 - r, D - 1 - c)];
            }
        }
        Self::new(linear, offset)
    }

    /// Whether this map is exactly the identity.
    pub fn is_identity(&self) -> bool {
        self.linear == SMatrix::<f64, D, D>::identity() && self.offset == SVector::<f64, D>::zeros()
    }

    /// Apply the map to a single point.
    pub fn apply(&self, point: &Point<D>) -> Point<D> {
        Point::from(self.linear * point.coords + self.offset)
    }

    /// Apply the map to a coordinate tensor of shape `[..., D]`.
    ///
    /// Leading dimensions are preserved. The identity map returns the input
    /// tensor untouched.
    pub fn apply_tensor<B: Backend, const R: usize>(&self, points: Tensor<B, R>) -> Tensor<B, R> {
        if self.is_identity() {
            return points;
        }
        let dims = points.dims();
        let device = points.device();
        let n = dims[..R - 1].iter().product::<usize>();
        let flat = points.reshape([n, D]);

        // Row vectors: y = x @ A^T + b
        let rotated = if self.linear == SMatrix::<f64, D, D>::identity() {
            flat
        } else {
            let mut a_t = Vec::with_capacity(D * D);
            for r in 0..D {
                for c in 0..D {
                    a_t.push(self.linear[(c, r)] as f32);
                }
            }
            let a_t = Tensor::<B, 1>::from_data(TensorData::new(a_t, Shape::new([D * D])), &device)
                .reshape([D, D]);
            flat.matmul(a_t)
        };

        let offset: Vec<f32> = (0..D).map(|i| self.offset[i] as f32).collect();
        let offset = Tensor::<B, 1>::from_data(TensorData::new(offset, Shape::new([D])), &device)
            .reshape([1, D]);

        (rotated + offset).reshape(dims)
    }
}

impl<const D: usize> Default for AffineMap<D> {
    fn default() -> Self {
        Self::identity()
    }
}
