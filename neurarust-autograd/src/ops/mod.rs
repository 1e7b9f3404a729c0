//! # Reference operator catalog
//!
//! Concrete [`Function`](crate::autograd::Function) implementations over the CPU
//! [`Tensor`](crate::tensor::Tensor). The engine knows none of them by name: each one is
//! wired into a graph purely through [`Graph::apply`](crate::autograd::Graph::apply) or
//! [`Graph::apply_multi`](crate::autograd::Graph::apply_multi).
//!
//! Every operation comes as a struct implementing `Function` plus an `xxx_op` helper that
//! builds the struct and invokes it on a graph.
//!
//! - [`arithmetic`]: element-wise add, sub, mul, neg.
//! - [`reduction`]: sum of all elements.
//! - [`shape`]: split (multi-output) and concat (variadic) along the leading axis.
//! - [`indexing`]: take (gather by an index tensor).

pub mod arithmetic;
pub mod indexing;
pub mod reduction;
pub mod shape;

pub use arithmetic::{add_op, mul_op, neg_op, sub_op, Add, Mul, Neg, Sub};
pub use indexing::{take_op, Take};
pub use reduction::{sum_op, Sum};
pub use shape::{concat_op, split_op, Concat, Split};

use crate::error::NeuraRustError;

/// Extracts the two operands of a binary operation.
pub(crate) fn binary<'a, T>(name: &str, inputs: &[&'a T]) -> Result<(&'a T, &'a T), NeuraRustError> {
    match inputs {
        [a, b] => Ok((*a, *b)),
        _ => Err(NeuraRustError::ArityMismatch {
            operation: name.to_string(),
            expected: 2,
            actual: inputs.len(),
        }),
    }
}

/// Extracts the single operand of a unary operation.
pub(crate) fn unary<'a, T>(name: &str, inputs: &[&'a T]) -> Result<&'a T, NeuraRustError> {
    match inputs {
        [a] => Ok(*a),
        _ => Err(NeuraRustError::ArityMismatch {
            operation: name.to_string(),
            expected: 1,
            actual: inputs.len(),
        }),
    }
}
