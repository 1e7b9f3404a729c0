use crate::autograd::{Arity, Function, Graph, ValueId};
use crate::error::NeuraRustError;
use crate::ops::unary;
use crate::tensor::{Element, Tensor};

/// Splits a tensor into `sections` equal parts along its leading axis.
///
/// This is the catalog's multi-output operation: one invocation yields `sections`
/// values, and its backward rule concatenates their gradients back together.
#[derive(Debug)]
pub struct Split {
    sections: usize,
}

impl Split {
    pub fn new(sections: usize) -> Self {
        Split { sections }
    }
}

impl<T: Element> Function<Tensor<T>> for Split {
    fn name(&self) -> &str {
        "Split"
    }

    fn required_inputs(&self) -> Arity {
        Arity::Exactly(1)
    }

    fn forward_multi(&mut self, inputs: &[&Tensor<T>]) -> Result<Vec<Tensor<T>>, NeuraRustError> {
        unary("Split", inputs)?.split_leading(self.sections)
    }

    fn backward_multi(
        &self,
        grad_outputs: &[Tensor<T>],
    ) -> Result<Vec<Option<Tensor<T>>>, NeuraRustError> {
        if grad_outputs.len() != self.sections {
            return Err(NeuraRustError::GradientCountMismatch {
                operation: "Split".to_string(),
                expected: self.sections,
                actual: grad_outputs.len(),
            });
        }
        let parts: Vec<&Tensor<T>> = grad_outputs.iter().collect();
        Ok(vec![Some(Tensor::concat_leading(&parts)?)])
    }
}

pub fn split_op<T: Element>(
    graph: &mut Graph<Tensor<T>>,
    a: ValueId,
    sections: usize,
) -> Result<Vec<ValueId>, NeuraRustError> {
    graph.apply_multi(Split::new(sections), &[a])
}

#[cfg(test)]
#[path = "split_test.rs"]
mod tests;
