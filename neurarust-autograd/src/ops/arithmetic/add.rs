use crate::autograd::{Arity, Function, Graph, ValueId};
use crate::error::NeuraRustError;
use crate::ops::binary;
use crate::tensor::{Element, Tensor};

/// Element-wise addition. Both operands must have the same shape.
#[derive(Debug, Default)]
pub struct Add;

impl<T: Element> Function<Tensor<T>> for Add {
    fn name(&self) -> &str {
        "Add"
    }

    fn required_inputs(&self) -> Arity {
        Arity::Exactly(2)
    }

    fn forward(&mut self, inputs: &[&Tensor<T>]) -> Result<Tensor<T>, NeuraRustError> {
        let (a, b) = binary("Add", inputs)?;
        a.add(b)
    }

    fn backward(&self, grad_output: &Tensor<T>) -> Result<Vec<Option<Tensor<T>>>, NeuraRustError> {
        // d(a + b)/da = d(a + b)/db = 1
        Ok(vec![Some(grad_output.clone()), Some(grad_output.clone())])
    }
}

/// Records `a + b` on `graph`.
pub fn add_op<T: Element>(
    graph: &mut Graph<Tensor<T>>,
    a: ValueId,
    b: ValueId,
) -> Result<ValueId, NeuraRustError> {
    graph.apply(Add, &[a, b])
}

#[cfg(test)]
#[path = "add_test.rs"]
mod tests;
