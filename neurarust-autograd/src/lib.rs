//! NeuraRust autograd: a reverse-mode automatic differentiation engine.
//!
//! The engine ([`autograd`]) is generic over any tensor type implementing
//! [`tensor::GradTensor`]; [`tensor::Tensor`] is the reference CPU implementation and
//! [`ops`] a small catalog of operations built on it.

pub mod autograd;
pub mod error;
pub mod ops;
pub mod tensor;

pub use autograd::{AutogradConfig, BackwardStrategy, Function, Graph, ValueId};
pub use error::NeuraRustError;
pub use tensor::Tensor;
// Re-export traits required by public functions/structs
pub use num_traits;
