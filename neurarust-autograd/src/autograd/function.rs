use crate::error::NeuraRustError;
use crate::tensor::GradTensor;
use std::fmt::{self, Debug};

/// Number of inputs an operation accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly this many inputs.
    Exactly(usize),
    /// Any number of inputs (e.g. concatenation).
    Variadic,
}

impl Arity {
    /// Checks `actual` against the declared arity.
    pub fn accepts(&self, actual: usize) -> bool {
        match self {
            Arity::Exactly(expected) => *expected == actual,
            Arity::Variadic => true,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exactly(n) => write!(f, "{}", n),
            Arity::Variadic => write!(f, "any number of"),
        }
    }
}

/// Defines the contract every differentiable operation implements.
///
/// A `Function` is constructed by the caller right before use and handed to
/// [`Graph::apply`](crate::autograd::Graph::apply) or
/// [`Graph::apply_multi`](crate::autograd::Graph::apply_multi). The graph runs the forward
/// computation and, when gradient tracking is active, keeps the function as the *creator*
/// of the produced values so that its backward rule can be invoked later.
///
/// Operations never mutate their inputs; they allocate and return new tensors. The only
/// state they keep is whatever they cache during `forward` for use in `backward`
/// (input shapes, input copies, section sizes, ...).
///
/// Single-output operations implement [`forward`](Function::forward) and
/// [`backward`](Function::backward). Operations that fan out into several values (split,
/// chunk) implement [`forward_multi`](Function::forward_multi) and
/// [`backward_multi`](Function::backward_multi) instead. Every unimplemented method fails
/// with `NeuraRustError::UnsupportedOperation` naming the concrete type.
///
/// The `Debug + Send + Sync` bounds match the rest of the crate: graphs can be moved to
/// another thread as a whole.
pub trait Function<T: GradTensor>: Debug + Send + Sync {
    /// Human-readable name used in error messages and logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Number of inputs this operation must be invoked with.
    fn required_inputs(&self) -> Arity;

    /// Computes one output from the input tensors.
    fn forward(&mut self, inputs: &[&T]) -> Result<T, NeuraRustError> {
        let _ = inputs;
        Err(unsupported(self.name(), "forward"))
    }

    /// Computes several outputs from the input tensors.
    fn forward_multi(&mut self, inputs: &[&T]) -> Result<Vec<T>, NeuraRustError> {
        let _ = inputs;
        Err(unsupported(self.name(), "forward_multi"))
    }

    /// Given dL/dOutput, returns dL/dInput for every recorded input, in input order.
    ///
    /// `None` marks an input that is not differentiable through this operation (an index
    /// operand, for instance). It is distinct from a zero gradient: the engine neither
    /// accumulates nor propagates anything along that edge.
    fn backward(&self, grad_output: &T) -> Result<Vec<Option<T>>, NeuraRustError> {
        let _ = grad_output;
        Err(unsupported(self.name(), "backward"))
    }

    /// Multi-output counterpart of [`backward`](Function::backward).
    ///
    /// Receives exactly one gradient per output, in output order. Outputs that received no
    /// gradient are passed as all-zeros tensors of the output's shape.
    fn backward_multi(&self, grad_outputs: &[T]) -> Result<Vec<Option<T>>, NeuraRustError> {
        let _ = grad_outputs;
        Err(unsupported(self.name(), "backward_multi"))
    }
}

fn unsupported(operation: &str, method: &str) -> NeuraRustError {
    NeuraRustError::UnsupportedOperation(format!("{} does not implement {}", operation, method))
}

#[cfg(test)]
#[path = "function_test.rs"]
mod tests;
