use crate::autograd::{Arity, Function, Graph, ValueId};
use crate::error::NeuraRustError;
use crate::ops::binary;
use crate::tensor::{Element, Tensor};

/// Element-wise multiplication.
///
/// Keeps copies of both operands from the forward pass, since each one's gradient is the
/// output gradient scaled by the other.
#[derive(Debug)]
pub struct Mul<T: Element> {
    a: Option<Tensor<T>>,
    b: Option<Tensor<T>>,
}

impl<T: Element> Mul<T> {
    pub fn new() -> Self {
        Mul { a: None, b: None }
    }
}

impl<T: Element> Default for Mul<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Element> Function<Tensor<T>> for Mul<T> {
    fn name(&self) -> &str {
        "Mul"
    }

    fn required_inputs(&self) -> Arity {
        Arity::Exactly(2)
    }

    fn forward(&mut self, inputs: &[&Tensor<T>]) -> Result<Tensor<T>, NeuraRustError> {
        let (a, b) = binary("Mul", inputs)?;
        let output = a.mul(b)?;
        self.a = Some(a.clone());
        self.b = Some(b.clone());
        Ok(output)
    }

    fn backward(&self, grad_output: &Tensor<T>) -> Result<Vec<Option<Tensor<T>>>, NeuraRustError> {
        let (a, b) = match (&self.a, &self.b) {
            (Some(a), Some(b)) => (a, b),
            _ => {
                return Err(NeuraRustError::InvariantViolated(
                    "Mul::backward called before forward".to_string(),
                ))
            }
        };
        // grad_a = grad_output * b, grad_b = grad_output * a
        let grad_a = grad_output.mul(b)?;
        let grad_b = grad_output.mul(a)?;
        Ok(vec![Some(grad_a), Some(grad_b)])
    }
}

pub fn mul_op<T: Element>(
    graph: &mut Graph<Tensor<T>>,
    a: ValueId,
    b: ValueId,
) -> Result<ValueId, NeuraRustError> {
    graph.apply(Mul::new(), &[a, b])
}

#[cfg(test)]
#[path = "mul_test.rs"]
mod tests;
