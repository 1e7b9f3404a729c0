use super::*;
use crate::autograd::grad_check::{check_grad, GradCheckError};
use crate::tensor::Tensor;
use approx::assert_relative_eq;

fn create_test_tensor(data: Vec<f64>, shape: Vec<usize>) -> Tensor<f64> {
    Tensor::new(data, shape).expect("Failed to create test tensor")
}

#[test]
fn test_mul_forward() {
    let mut graph = Graph::new();
    let a = graph.leaf(create_test_tensor(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]), false);
    let b = graph.leaf(create_test_tensor(vec![5.0, 6.0, 7.0, 8.0], vec![2, 2]), false);
    let c = mul_op(&mut graph, a, b).unwrap();
    let result = graph.tensor(c).unwrap();
    assert_eq!(result.data(), &[5.0, 12.0, 21.0, 32.0]);
    assert_eq!(result.shape(), &[2, 2]);
}

#[test]
fn test_mul_backward() {
    let mut graph = Graph::new();
    let a = graph.leaf(create_test_tensor(vec![2.0, -1.0], vec![2]), true);
    let b = graph.leaf(create_test_tensor(vec![3.0, 4.0], vec![2]), true);
    let c = mul_op(&mut graph, a, b).unwrap();
    graph.backward(c).unwrap();

    let grad_a = graph.grad(a).unwrap().unwrap();
    let grad_b = graph.grad(b).unwrap().unwrap();
    assert_relative_eq!(grad_a.data()[0], 3.0);
    assert_relative_eq!(grad_a.data()[1], 4.0);
    assert_relative_eq!(grad_b.data()[0], 2.0);
    assert_relative_eq!(grad_b.data()[1], -1.0);
}

#[test]
fn test_mul_only_one_operand_requires_grad() {
    let mut graph = Graph::new();
    let a = graph.leaf(create_test_tensor(vec![2.0], vec![1]), true);
    let b = graph.leaf(create_test_tensor(vec![5.0], vec![1]), false);
    let c = mul_op(&mut graph, a, b).unwrap();
    graph.backward(c).unwrap();
    assert_eq!(graph.grad(a).unwrap().unwrap().data(), &[5.0]);
    assert!(graph.grad(b).unwrap().is_none());
}

#[test]
fn test_mul_backward_before_forward_is_invariant_violation() {
    let op: Mul<f64> = Mul::new();
    let result = op.backward(&create_test_tensor(vec![1.0], vec![1]));
    assert!(matches!(result, Err(NeuraRustError::InvariantViolated(_))));
}

#[test]
fn test_mul_grad_check() {
    let inputs = vec![
        create_test_tensor(vec![1.5, -0.5, 2.0, 0.25], vec![4]),
        create_test_tensor(vec![-2.0, 3.0, 0.5, 1.0], vec![4]),
    ];
    let result = check_grad(|g, ids| mul_op(g, ids[0], ids[1]), &inputs, 1e-6, 1e-6);
    assert!(result.is_ok(), "Mul grad check failed: {:?}", result.err());
}

#[derive(Debug)]
struct WrongMul;

impl Function<Tensor<f64>> for WrongMul {
    fn required_inputs(&self) -> Arity {
        Arity::Exactly(2)
    }

    fn forward(&mut self, inputs: &[&Tensor<f64>]) -> Result<Tensor<f64>, NeuraRustError> {
        inputs[0].mul(inputs[1])
    }

    fn backward(&self, grad_output: &Tensor<f64>) -> Result<Vec<Option<Tensor<f64>>>, NeuraRustError> {
        // Deliberately wrong: ignores the other operand.
        Ok(vec![Some(grad_output.clone()), Some(grad_output.clone())])
    }
}

#[test]
fn test_grad_check_detects_wrong_backward() {
    let inputs = vec![
        create_test_tensor(vec![2.0], vec![1]),
        create_test_tensor(vec![3.0], vec![1]),
    ];
    let result = check_grad(|g, ids| g.apply(WrongMul, ids), &inputs, 1e-6, 1e-6);
    match result {
        Err(GradCheckError::GradientMismatch {
            input_index,
            element_index,
            analytical_grad,
            numerical_grad,
            ..
        }) => {
            assert_eq!(input_index, 0);
            assert_eq!(element_index, 0);
            assert_relative_eq!(analytical_grad, 1.0);
            assert_relative_eq!(numerical_grad, 3.0, epsilon = 1e-4);
        }
        other => panic!("Expected GradientMismatch, got {:?}", other),
    }
}
