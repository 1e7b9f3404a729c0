use super::*;
use crate::autograd::grad_check::check_grad;
use crate::ops::mul_op;

#[test]
fn test_concat_variadic_forward() {
    let mut graph = Graph::new();
    let a = graph.leaf(Tensor::new(vec![1.0, 2.0], vec![1, 2]).unwrap(), true);
    let b = graph.leaf(Tensor::new(vec![3.0, 4.0, 5.0, 6.0], vec![2, 2]).unwrap(), false);
    let c = graph.leaf(Tensor::new(vec![7.0, 8.0], vec![1, 2]).unwrap(), true);
    let out = concat_op(&mut graph, &[a, b, c]).unwrap();
    let tensor = graph.tensor(out).unwrap();
    assert_eq!(tensor.shape(), &[4, 2]);
    assert_eq!(tensor.data(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
}

#[test]
fn test_concat_empty_is_error() {
    let mut graph: Graph<Tensor<f64>> = Graph::new();
    assert_eq!(concat_op(&mut graph, &[]), Err(NeuraRustError::EmptyTensorList));
}

#[test]
fn test_concat_backward_splits_gradient() {
    let mut graph = Graph::new();
    let a = graph.leaf(Tensor::new(vec![1.0], vec![1]).unwrap(), true);
    let b = graph.leaf(Tensor::new(vec![2.0, 3.0], vec![2]).unwrap(), true);
    let out = concat_op(&mut graph, &[a, b]).unwrap();
    graph
        .set_grad(out, Some(Tensor::new(vec![10.0, 20.0, 30.0], vec![3]).unwrap()))
        .unwrap();
    graph.backward(out).unwrap();
    assert_eq!(graph.grad(a).unwrap().unwrap().data(), &[10.0]);
    assert_eq!(graph.grad(b).unwrap().unwrap().data(), &[20.0, 30.0]);
}

#[test]
fn test_concat_grad_check() {
    let inputs = vec![
        Tensor::new(vec![0.5, -1.0], vec![2]).unwrap(),
        Tensor::new(vec![2.0, 0.25, 1.5], vec![3]).unwrap(),
        Tensor::new(vec![1.0, -2.0, 3.0, 0.5, 0.1], vec![5]).unwrap(),
    ];
    let result = check_grad(
        |g, ids| {
            let joined = concat_op(g, &ids[..2])?;
            mul_op(g, joined, ids[2])
        },
        &inputs,
        1e-6,
        1e-6,
    );
    assert!(result.is_ok(), "Concat grad check failed: {:?}", result.err());
}
