// src/tensor/create.rs

use crate::error::NeuraRustError;
use crate::tensor::{Element, Tensor};
use rand::distributions::Standard;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

/// Creates a new tensor filled with zeros with the specified shape.
pub fn zeros<T: Element>(shape: &[usize]) -> Tensor<T> {
    Tensor::filled(shape, T::zero())
}

/// Creates a new tensor filled with ones with the specified shape.
pub fn ones<T: Element>(shape: &[usize]) -> Tensor<T> {
    Tensor::filled(shape, T::one())
}

/// Creates a new tensor filled with a specific value with the specified shape.
pub fn full<T: Element>(shape: &[usize], value: T) -> Tensor<T> {
    Tensor::filled(shape, value)
}

/// Creates a new tensor filled with zeros, having the same shape as the input tensor.
pub fn zeros_like<T: Element>(tensor: &Tensor<T>) -> Tensor<T> {
    zeros(tensor.shape())
}

/// Creates a new tensor filled with ones, having the same shape as the input tensor.
pub fn ones_like<T: Element>(tensor: &Tensor<T>) -> Tensor<T> {
    ones(tensor.shape())
}

/// Creates a tensor from a `Vec` and a shape.
pub fn from_vec<T: Element>(data_vec: Vec<T>, shape: Vec<usize>) -> Result<Tensor<T>, NeuraRustError> {
    Tensor::new(data_vec, shape)
}

// The RNG is supplied by the caller so that tests and demos can seed it.

/// Uniform samples in `[0, 1)`.
pub fn rand<T, R>(shape: &[usize], rng: &mut R) -> Tensor<T>
where
    T: Element,
    R: Rng,
    Standard: Distribution<T>,
{
    let numel = shape.iter().product();
    let data_vec: Vec<T> = (0..numel).map(|_| rng.gen::<T>()).collect();
    Tensor {
        data: data_vec,
        shape: shape.to_vec(),
    }
}

/// Samples from the standard normal distribution.
pub fn randn<T, R>(shape: &[usize], rng: &mut R) -> Tensor<T>
where
    T: Element,
    R: Rng,
    StandardNormal: Distribution<T>,
{
    let numel = shape.iter().product();
    let data_vec: Vec<T> = (0..numel).map(|_| StandardNormal.sample(rng)).collect();
    Tensor {
        data: data_vec,
        shape: shape.to_vec(),
    }
}

#[cfg(test)]
#[path = "create_test.rs"]
mod tests;
