// src/tensor/mod.rs

use crate::error::NeuraRustError;
use num_traits::Float;
use std::fmt::Debug;

pub mod create;
mod shape_methods;
mod traits;

pub use create::{from_vec, full, ones, ones_like, rand, randn, zeros, zeros_like};
pub use traits::GradTensor;

/// Element types a [`Tensor`] can hold.
///
/// Blanket-implemented for every float type satisfying the bounds (`f32`, `f64`).
pub trait Element: Float + Debug + Send + Sync + 'static {}

impl<T: Float + Debug + Send + Sync + 'static> Element for T {}

/// Dense, row-major, CPU-resident multi-dimensional array.
///
/// This is the reference implementation of [`GradTensor`] used by the operator catalog,
/// the tests and the demos. The autograd engine itself never looks inside it: it only
/// goes through the [`GradTensor`] trait.
///
/// A `Tensor` owns its buffer exclusively; `clone()` copies the data.
/// A tensor of shape `[]` holds exactly one element.
#[derive(Clone, PartialEq)]
pub struct Tensor<T> {
    data: Vec<T>,
    shape: Vec<usize>,
}

impl<T: Element> Tensor<T> {
    /// Creates a new tensor from row-major data and a shape.
    ///
    /// # Errors
    /// Returns `NeuraRustError::TensorCreationError` if `data.len()` differs from the number
    /// of elements implied by `shape`.
    pub fn new(data: Vec<T>, shape: Vec<usize>) -> Result<Self, NeuraRustError> {
        let numel: usize = shape.iter().product();
        if data.len() != numel {
            return Err(NeuraRustError::TensorCreationError {
                data_len: data.len(),
                shape,
            });
        }
        Ok(Tensor { data, shape })
    }

    /// Creates a one-element tensor of shape `[1]`.
    pub fn scalar(value: T) -> Self {
        Tensor {
            data: vec![value],
            shape: vec![1],
        }
    }

    /// Creates a tensor of the given shape where every element is `value`.
    pub fn filled(shape: &[usize], value: T) -> Self {
        let numel = shape.iter().product();
        Tensor {
            data: vec![value; numel],
            shape: shape.to_vec(),
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    pub fn numel(&self) -> usize {
        self.data.len()
    }

    /// Row-major view of the elements.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.data.clone()
    }

    /// Returns the single element of a one-element tensor.
    pub fn item(&self) -> Result<T, NeuraRustError> {
        match self.data.as_slice() {
            [value] => Ok(*value),
            _ => Err(NeuraRustError::ShapeMismatch {
                expected: vec![1],
                actual: self.shape.clone(),
                operation: "item".to_string(),
            }),
        }
    }

    /// Applies `f` to every element, producing a new tensor of the same shape.
    pub fn map<F: Fn(T) -> T>(&self, f: F) -> Self {
        Tensor {
            data: self.data.iter().map(|&x| f(x)).collect(),
            shape: self.shape.clone(),
        }
    }

    /// Combines two tensors of identical shape element by element.
    /// Broadcasting is deliberately not supported.
    fn zip_with<F: Fn(T, T) -> T>(
        &self,
        other: &Self,
        operation: &str,
        f: F,
    ) -> Result<Self, NeuraRustError> {
        if self.shape != other.shape {
            return Err(NeuraRustError::ShapeMismatch {
                expected: self.shape.clone(),
                actual: other.shape.clone(),
                operation: operation.to_string(),
            });
        }
        let data = self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(&a, &b)| f(a, b))
            .collect();
        Ok(Tensor {
            data,
            shape: self.shape.clone(),
        })
    }

    pub fn add(&self, other: &Self) -> Result<Self, NeuraRustError> {
        self.zip_with(other, "add", |a, b| a + b)
    }

    pub fn sub(&self, other: &Self) -> Result<Self, NeuraRustError> {
        self.zip_with(other, "sub", |a, b| a - b)
    }

    pub fn mul(&self, other: &Self) -> Result<Self, NeuraRustError> {
        self.zip_with(other, "mul", |a, b| a * b)
    }

    pub fn neg(&self) -> Self {
        self.map(|x| -x)
    }

    /// Multiplies every element by `factor`.
    pub fn scale(&self, factor: T) -> Self {
        self.map(|x| x * factor)
    }

    /// Sum of all elements, as a tensor of shape `[1]`.
    pub fn sum(&self) -> Self {
        let total = self.data.iter().fold(T::zero(), |acc, &x| acc + x);
        Tensor::scalar(total)
    }
}

impl<T: Debug> Debug for Tensor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Tensor(shape={:?}, data={:?})", self.shape, self.data)
    }
}
