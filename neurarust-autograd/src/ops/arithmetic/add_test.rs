use super::*;
use crate::autograd::grad_check::check_grad;
use crate::tensor::Tensor;

fn create_test_tensor(data: Vec<f64>, shape: Vec<usize>) -> Tensor<f64> {
    Tensor::new(data, shape).expect("Failed to create test tensor")
}

#[test]
fn test_add_forward() {
    let mut graph = Graph::new();
    let a = graph.leaf(create_test_tensor(vec![1.0, 2.0, 3.0], vec![3]), false);
    let b = graph.leaf(create_test_tensor(vec![4.0, 5.0, 6.0], vec![3]), false);
    let c = add_op(&mut graph, a, b).unwrap();
    assert_eq!(graph.tensor(c).unwrap().data(), &[5.0, 7.0, 9.0]);
}

#[test]
fn test_add_shape_mismatch() {
    let mut graph = Graph::new();
    let a = graph.leaf(create_test_tensor(vec![1.0, 2.0], vec![2]), true);
    let b = graph.leaf(create_test_tensor(vec![1.0, 2.0, 3.0], vec![3]), true);
    let result = add_op(&mut graph, a, b);
    assert!(matches!(result, Err(NeuraRustError::ShapeMismatch { .. })));
    assert_eq!(graph.len(), 2);
    assert_eq!(graph.live_operations(), 0);
}

#[test]
fn test_add_backward() {
    let mut graph = Graph::new();
    let a = graph.leaf(create_test_tensor(vec![1.0, 2.0], vec![2]), true);
    let b = graph.leaf(create_test_tensor(vec![3.0, 4.0], vec![2]), true);
    let c = add_op(&mut graph, a, b).unwrap();
    graph.set_grad(c, Some(create_test_tensor(vec![0.5, -1.0], vec![2]))).unwrap();
    graph.backward(c).unwrap();
    assert_eq!(graph.grad(a).unwrap().unwrap().data(), &[0.5, -1.0]);
    assert_eq!(graph.grad(b).unwrap().unwrap().data(), &[0.5, -1.0]);
}

#[test]
fn test_add_grad_check() {
    let inputs = vec![
        create_test_tensor(vec![0.3, -1.2, 2.5, 0.0], vec![2, 2]),
        create_test_tensor(vec![1.1, 0.4, -0.7, 3.0], vec![2, 2]),
    ];
    let result = check_grad(|g, ids| add_op(g, ids[0], ids[1]), &inputs, 1e-6, 1e-6);
    assert!(result.is_ok(), "Add grad check failed: {:?}", result.err());
}
