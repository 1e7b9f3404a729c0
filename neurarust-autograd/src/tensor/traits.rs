// src/tensor/traits.rs

use crate::error::NeuraRustError;
use crate::tensor::{Element, Tensor};
use approx::{AbsDiffEq, RelativeEq};
use std::fmt::{self, Debug, Display};

/// The tensor interface the autograd engine consumes.
///
/// The engine treats implementors as opaque values: it only queries shapes, builds
/// all-zeros/all-ones seeds, and accumulates gradients element-wise. Element-wise methods
/// must fail on mismatched shapes instead of broadcasting, because silent broadcasting
/// during gradient accumulation would corrupt the gradients of every upstream value.
pub trait GradTensor: Clone + Debug + Send + Sync + 'static {
    /// Returns the dimensions of the tensor.
    fn shape(&self) -> &[usize];

    /// Creates an all-zeros tensor with the given shape.
    fn zeros(shape: &[usize]) -> Self;

    /// Creates an all-ones tensor with the given shape.
    fn ones(shape: &[usize]) -> Self;

    fn add(&self, other: &Self) -> Result<Self, NeuraRustError>;

    fn sub(&self, other: &Self) -> Result<Self, NeuraRustError>;

    fn mul(&self, other: &Self) -> Result<Self, NeuraRustError>;

    fn same_shape(&self, other: &Self) -> bool {
        self.shape() == other.shape()
    }
}

impl<T: Element> GradTensor for Tensor<T> {
    fn shape(&self) -> &[usize] {
        Tensor::shape(self)
    }

    fn zeros(shape: &[usize]) -> Self {
        crate::tensor::zeros(shape)
    }

    fn ones(shape: &[usize]) -> Self {
        crate::tensor::ones(shape)
    }

    fn add(&self, other: &Self) -> Result<Self, NeuraRustError> {
        Tensor::add(self, other)
    }

    fn sub(&self, other: &Self) -> Result<Self, NeuraRustError> {
        Tensor::sub(self, other)
    }

    fn mul(&self, other: &Self) -> Result<Self, NeuraRustError> {
        Tensor::mul(self, other)
    }
}

impl<T: Element + Display> Display for Tensor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, value) in self.data().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", value)?;
        }
        write!(f, "] shape={:?}", self.shape())
    }
}

// Approximate comparison, used by tests and gradient checking.
// Tensors with different shapes are never approximately equal.

impl<T: Element + AbsDiffEq<Epsilon = T>> AbsDiffEq for Tensor<T> {
    type Epsilon = T;

    fn default_epsilon() -> T {
        T::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: T) -> bool {
        self.shape() == other.shape()
            && self
                .data()
                .iter()
                .zip(other.data().iter())
                .all(|(a, b)| a.abs_diff_eq(b, epsilon))
    }
}

impl<T: Element + RelativeEq<Epsilon = T>> RelativeEq for Tensor<T> {
    fn default_max_relative() -> T {
        T::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: T, max_relative: T) -> bool {
        self.shape() == other.shape()
            && self
                .data()
                .iter()
                .zip(other.data().iter())
                .all(|(a, b)| a.relative_eq(b, epsilon, max_relative))
    }
}
