use crate::autograd::{Arity, Function, Graph, ValueId};
use crate::error::NeuraRustError;
use crate::ops::unary;
use crate::tensor::{Element, Tensor};

/// Sums every element into a tensor of shape `[1]`.
#[derive(Debug, Default)]
pub struct Sum {
    input_shape: Vec<usize>,
}

impl Sum {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T: Element> Function<Tensor<T>> for Sum {
    fn name(&self) -> &str {
        "Sum"
    }

    fn required_inputs(&self) -> Arity {
        Arity::Exactly(1)
    }

    fn forward(&mut self, inputs: &[&Tensor<T>]) -> Result<Tensor<T>, NeuraRustError> {
        let input = unary("Sum", inputs)?;
        self.input_shape = input.shape().to_vec();
        Ok(input.sum())
    }

    fn backward(&self, grad_output: &Tensor<T>) -> Result<Vec<Option<Tensor<T>>>, NeuraRustError> {
        // Every input element contributes once: broadcast the scalar gradient back.
        let value = grad_output.item()?;
        Ok(vec![Some(Tensor::filled(&self.input_shape, value))])
    }
}

pub fn sum_op<T: Element>(
    graph: &mut Graph<Tensor<T>>,
    a: ValueId,
) -> Result<ValueId, NeuraRustError> {
    graph.apply(Sum::new(), &[a])
}

#[cfg(test)]
#[path = "sum_test.rs"]
mod tests;
