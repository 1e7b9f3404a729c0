use crate::autograd::{Arity, Function, Graph, ValueId};
use crate::error::NeuraRustError;
use crate::ops::binary;
use crate::tensor::{Element, Tensor};

/// Gathers elements of `data` by flat index.
///
/// Inputs are `[data, indices]`, where `indices` holds whole, non-negative numbers stored
/// in the element type. The output has shape `[indices.numel()]`. The index operand is not
/// differentiable: its gradient slot is always `None`.
#[derive(Debug, Default)]
pub struct Take {
    indices: Vec<usize>,
    input_shape: Vec<usize>,
}

impl Take {
    pub fn new() -> Self {
        Self::default()
    }
}

fn to_indices<T: Element>(indices: &Tensor<T>) -> Result<Vec<usize>, NeuraRustError> {
    indices
        .data()
        .iter()
        .map(|&raw| {
            raw.to_usize()
                .filter(|_| raw.fract() == T::zero())
                .ok_or_else(|| NeuraRustError::SliceError {
                    message: format!("take: {:?} is not a valid index", raw),
                })
        })
        .collect()
}

impl<T: Element> Function<Tensor<T>> for Take {
    fn name(&self) -> &str {
        "Take"
    }

    fn required_inputs(&self) -> Arity {
        Arity::Exactly(2)
    }

    fn forward(&mut self, inputs: &[&Tensor<T>]) -> Result<Tensor<T>, NeuraRustError> {
        let (data, indices) = binary("Take", inputs)?;
        let indices = to_indices(indices)?;
        let output = data.gather(&indices)?;
        self.indices = indices;
        self.input_shape = data.shape().to_vec();
        Ok(output)
    }

    fn backward(&self, grad_output: &Tensor<T>) -> Result<Vec<Option<Tensor<T>>>, NeuraRustError> {
        let grad_data = Tensor::scatter_add(&self.input_shape, &self.indices, grad_output)?;
        Ok(vec![Some(grad_data), None])
    }
}

pub fn take_op<T: Element>(
    graph: &mut Graph<Tensor<T>>,
    data: ValueId,
    indices: ValueId,
) -> Result<ValueId, NeuraRustError> {
    graph.apply(Take::new(), &[data, indices])
}

#[cfg(test)]
#[path = "take_test.rs"]
mod tests;
