use crate::autograd::{Arity, Function, Graph, ValueId};
use crate::error::NeuraRustError;
use crate::ops::binary;
use crate::tensor::{Element, Tensor};

/// Element-wise subtraction `a - b`.
#[derive(Debug, Default)]
pub struct Sub;

impl<T: Element> Function<Tensor<T>> for Sub {
    fn name(&self) -> &str {
        "Sub"
    }

    fn required_inputs(&self) -> Arity {
        Arity::Exactly(2)
    }

    fn forward(&mut self, inputs: &[&Tensor<T>]) -> Result<Tensor<T>, NeuraRustError> {
        let (a, b) = binary("Sub", inputs)?;
        a.sub(b)
    }

    fn backward(&self, grad_output: &Tensor<T>) -> Result<Vec<Option<Tensor<T>>>, NeuraRustError> {
        Ok(vec![Some(grad_output.clone()), Some(grad_output.neg())])
    }
}

pub fn sub_op<T: Element>(
    graph: &mut Graph<Tensor<T>>,
    a: ValueId,
    b: ValueId,
) -> Result<ValueId, NeuraRustError> {
    graph.apply(Sub, &[a, b])
}

#[cfg(test)]
#[path = "sub_test.rs"]
mod tests;
