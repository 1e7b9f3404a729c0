use crate::autograd::{Arity, Function, Graph, ValueId};
use crate::error::NeuraRustError;
use crate::tensor::{Element, Tensor};

/// Concatenates any number of tensors along the leading axis.
#[derive(Debug, Default)]
pub struct Concat {
    // Leading extent of each input, recorded during forward.
    sections: Vec<usize>,
}

impl Concat {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T: Element> Function<Tensor<T>> for Concat {
    fn name(&self) -> &str {
        "Concat"
    }

    fn required_inputs(&self) -> Arity {
        Arity::Variadic
    }

    fn forward(&mut self, inputs: &[&Tensor<T>]) -> Result<Tensor<T>, NeuraRustError> {
        let output = Tensor::concat_leading(inputs)?;
        self.sections = inputs
            .iter()
            .map(|t| t.shape().first().copied().unwrap_or(1))
            .collect();
        Ok(output)
    }

    fn backward(&self, grad_output: &Tensor<T>) -> Result<Vec<Option<Tensor<T>>>, NeuraRustError> {
        let inner: usize = grad_output.shape().iter().skip(1).product();
        let data = grad_output.data();
        let mut offset = 0;
        let mut grads = Vec::with_capacity(self.sections.len());
        for &rows in &self.sections {
            let len = rows * inner;
            let chunk = data.get(offset..offset + len).ok_or(NeuraRustError::IndexOutOfBounds {
                index: offset + len,
                len: data.len(),
            })?;
            let mut shape = grad_output.shape().to_vec();
            shape[0] = rows;
            grads.push(Some(Tensor::new(chunk.to_vec(), shape)?));
            offset += len;
        }
        Ok(grads)
    }
}

pub fn concat_op<T: Element>(
    graph: &mut Graph<Tensor<T>>,
    parts: &[ValueId],
) -> Result<ValueId, NeuraRustError> {
    graph.apply(Concat::new(), parts)
}

#[cfg(test)]
#[path = "concat_test.rs"]
mod tests;
