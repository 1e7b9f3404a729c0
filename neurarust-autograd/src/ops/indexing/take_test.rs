use super::*;

#[test]
fn test_take_forward() {
    let mut graph = Graph::new();
    let data = graph.leaf(Tensor::new(vec![10.0, 20.0, 30.0, 40.0], vec![2, 2]).unwrap(), false);
    let idx = graph.leaf(Tensor::new(vec![3.0, 0.0], vec![2]).unwrap(), false);
    let out = take_op(&mut graph, data, idx).unwrap();
    assert_eq!(graph.tensor(out).unwrap().data(), &[40.0, 10.0]);
}

#[test]
fn test_take_index_operand_gets_no_gradient() {
    let mut graph = Graph::new();
    let data = graph.leaf(Tensor::new(vec![1.0, 2.0, 3.0], vec![3]).unwrap(), true);
    // Even if the index tensor is marked as requiring grad, the None edge skips it.
    let idx = graph.leaf(Tensor::new(vec![2.0, 2.0, 0.0], vec![3]).unwrap(), true);
    let out = take_op(&mut graph, data, idx).unwrap();
    graph.backward(out).unwrap();

    // Repeated index 2 accumulates, index 1 is never picked.
    assert_eq!(graph.grad(data).unwrap().unwrap().data(), &[1.0, 0.0, 2.0]);
    assert!(graph.grad(idx).unwrap().is_none());
}

#[test]
fn test_take_rejects_bad_indices() {
    let mut graph = Graph::new();
    let data = graph.leaf(Tensor::new(vec![1.0, 2.0], vec![2]).unwrap(), true);
    let negative = graph.leaf(Tensor::new(vec![-1.0], vec![1]).unwrap(), false);
    let fractional = graph.leaf(Tensor::new(vec![0.5], vec![1]).unwrap(), false);
    let too_large = graph.leaf(Tensor::new(vec![5.0], vec![1]).unwrap(), false);

    assert!(matches!(
        take_op(&mut graph, data, negative),
        Err(NeuraRustError::SliceError { .. })
    ));
    assert!(matches!(
        take_op(&mut graph, data, fractional),
        Err(NeuraRustError::SliceError { .. })
    ));
    assert_eq!(
        take_op(&mut graph, data, too_large),
        Err(NeuraRustError::IndexOutOfBounds { index: 5, len: 2 })
    );
    assert_eq!(graph.live_operations(), 0);
}
