use super::*;
use crate::autograd::grad_check::check_grad;
use crate::ops::{mul_op, sum_op};

#[test]
fn test_split_forward() {
    let mut graph = Graph::new();
    let a = graph.leaf(Tensor::new((1..=6).map(f64::from).collect(), vec![3, 2]).unwrap(), true);
    let parts = split_op(&mut graph, a, 3).unwrap();
    assert_eq!(parts.len(), 3);
    assert_eq!(graph.tensor(parts[1]).unwrap().data(), &[3.0, 4.0]);
    assert_eq!(graph.tensor(parts[2]).unwrap().shape(), &[1, 2]);

    // All outputs share one creator.
    let creator = graph.creator(parts[0]).unwrap().unwrap();
    for part in &parts {
        assert_eq!(graph.creator(*part).unwrap(), Some(creator));
    }
    assert_eq!(graph.live_operations(), 1);
}

#[test]
fn test_split_uneven_is_error() {
    let mut graph = Graph::new();
    let a = graph.leaf(Tensor::new(vec![1.0, 2.0, 3.0], vec![3]).unwrap(), true);
    assert!(matches!(
        split_op(&mut graph, a, 2),
        Err(NeuraRustError::SliceError { .. })
    ));
    assert_eq!(graph.len(), 1);
}

#[test]
fn test_split_single_branch_backward_routes_zeros() {
    let mut graph = Graph::new();
    let a = graph.leaf(Tensor::new(vec![1.0, 2.0, 3.0, 4.0], vec![4]).unwrap(), true);
    let parts = split_op(&mut graph, a, 2).unwrap();
    let s = sum_op(&mut graph, parts[1]).unwrap();
    graph.backward(s).unwrap();
    assert_eq!(graph.grad(a).unwrap().unwrap().data(), &[0.0, 0.0, 1.0, 1.0]);
    assert!(graph.grad(parts[0]).unwrap().is_none());
}

#[test]
fn test_split_not_a_single_output_op() {
    let mut graph = Graph::new();
    let a = graph.leaf(Tensor::new(vec![1.0, 2.0], vec![2]).unwrap(), true);
    let result = graph.apply(Split::new(2), &[a]);
    match result {
        Err(NeuraRustError::UnsupportedOperation(message)) => {
            assert!(message.contains("Split"));
            assert!(message.contains("forward"));
        }
        other => panic!("Expected UnsupportedOperation, got {:?}", other),
    }
}

#[test]
fn test_split_grad_check() {
    let inputs = vec![
        Tensor::new(vec![0.5, -1.0, 2.0, 0.25, 1.5, -0.75], vec![3, 2]).unwrap(),
        Tensor::new(vec![1.0, 2.0], vec![1, 2]).unwrap(),
    ];
    // (x0 * w) + (x2 * w), with x1 unused.
    let result = check_grad(
        |g, ids| {
            let parts = split_op(g, ids[0], 3)?;
            let left = mul_op(g, parts[0], ids[1])?;
            let right = mul_op(g, parts[2], ids[1])?;
            crate::ops::add_op(g, left, right)
        },
        &inputs,
        1e-6,
        1e-6,
    );
    assert!(result.is_ok(), "Split grad check failed: {:?}", result.err());
}
