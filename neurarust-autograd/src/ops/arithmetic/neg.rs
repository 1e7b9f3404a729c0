use crate::autograd::{Arity, Function, Graph, ValueId};
use crate::error::NeuraRustError;
use crate::ops::unary;
use crate::tensor::{Element, Tensor};

/// Element-wise negation.
#[derive(Debug, Default)]
pub struct Neg;

impl<T: Element> Function<Tensor<T>> for Neg {
    fn name(&self) -> &str {
        "Neg"
    }

    fn required_inputs(&self) -> Arity {
        Arity::Exactly(1)
    }

    fn forward(&mut self, inputs: &[&Tensor<T>]) -> Result<Tensor<T>, NeuraRustError> {
        Ok(unary("Neg", inputs)?.neg())
    }

    fn backward(&self, grad_output: &Tensor<T>) -> Result<Vec<Option<Tensor<T>>>, NeuraRustError> {
        Ok(vec![Some(grad_output.neg())])
    }
}

pub fn neg_op<T: Element>(
    graph: &mut Graph<Tensor<T>>,
    a: ValueId,
) -> Result<ValueId, NeuraRustError> {
    graph.apply(Neg, &[a])
}

#[cfg(test)]
#[path = "neg_test.rs"]
mod tests;
