use super::*;
use crate::autograd::BackwardStrategy;
use crate::ops::{add_op, mul_op};
use crate::tensor::Tensor;

fn scalar(value: f64) -> Tensor<f64> {
    Tensor::scalar(value)
}

#[test]
fn test_leaf_defaults() {
    let mut graph = Graph::new();
    let x = graph.leaf_named("x", scalar(3.0), true);
    assert!(graph.contains(x));
    assert!(graph.is_leaf(x).unwrap());
    assert!(graph.requires_grad(x).unwrap());
    assert_eq!(graph.creator(x).unwrap(), None);
    assert_eq!(graph.name(x).unwrap(), Some("x"));
    assert!(graph.grad(x).unwrap().is_none());
    assert_eq!(graph.len(), 1);

    graph.set_name(x, "input").unwrap();
    assert_eq!(graph.name(x).unwrap(), Some("input"));
}

#[test]
fn test_set_grad_checks_shape_before_storing() {
    let mut graph = Graph::new();
    let x = graph.leaf(Tensor::new(vec![1.0, 2.0], vec![2]).unwrap(), true);
    let result = graph.set_grad(x, Some(Tensor::new(vec![1.0, 2.0, 3.0], vec![3]).unwrap()));
    assert_eq!(
        result,
        Err(NeuraRustError::GradientShapeMismatch {
            expected: vec![2],
            actual: vec![3],
        })
    );
    assert!(graph.grad(x).unwrap().is_none());

    // Same element count, different shape: still rejected, never reshaped.
    let result = graph.set_grad(x, Some(Tensor::new(vec![1.0, 2.0], vec![2, 1]).unwrap()));
    assert!(matches!(result, Err(NeuraRustError::GradientShapeMismatch { .. })));

    graph.set_grad(x, Some(Tensor::new(vec![0.5, 0.5], vec![2]).unwrap())).unwrap();
    assert_eq!(graph.grad(x).unwrap().unwrap().data(), &[0.5, 0.5]);
    graph.clear_grad(x).unwrap();
    assert!(graph.grad(x).unwrap().is_none());
}

#[test]
fn test_set_grad_on_non_differentiable_value_is_discarded() {
    let mut graph = Graph::new();
    let x = graph.leaf(scalar(1.0), false);
    graph.set_grad(x, Some(scalar(5.0))).unwrap();
    assert!(graph.grad(x).unwrap().is_none());
}

#[test]
fn test_set_requires_grad_false_clears_grad() {
    let mut graph = Graph::new();
    let x = graph.leaf(scalar(1.0), true);
    graph.set_grad(x, Some(scalar(2.0))).unwrap();
    graph.set_requires_grad(x, false).unwrap();
    assert!(!graph.requires_grad(x).unwrap());
    assert!(graph.grad(x).unwrap().is_none());
}

#[test]
fn test_accumulate_grad_sums() {
    let mut graph = Graph::new();
    let x = graph.leaf(Tensor::new(vec![0.0, 0.0], vec![2]).unwrap(), true);
    let g = Tensor::new(vec![1.0, 2.0], vec![2]).unwrap();
    assert!(graph.accumulate_grad(x, &g).unwrap());
    assert!(graph.accumulate_grad(x, &g).unwrap());
    assert_eq!(graph.grad(x).unwrap().unwrap().data(), &[2.0, 4.0]);

    let frozen = graph.leaf(scalar(1.0), false);
    assert!(!graph.accumulate_grad(frozen, &scalar(1.0)).unwrap());
    assert!(graph.grad(frozen).unwrap().is_none());
}

#[test]
fn test_clear_grads_clears_every_value() {
    let mut graph = Graph::new();
    let a = graph.leaf(scalar(2.0), true);
    let b = graph.leaf(scalar(3.0), true);
    let c = mul_op(&mut graph, a, b).unwrap();
    graph.backward(c).unwrap();
    assert!(graph.grad(a).unwrap().is_some());
    graph.clear_grads();
    for id in [a, b, c] {
        assert!(graph.grad(id).unwrap().is_none());
    }
}

#[test]
fn test_update_tensor_is_shape_checked() {
    let mut graph = Graph::new();
    let w = graph.leaf(Tensor::new(vec![1.0, 2.0], vec![2]).unwrap(), true);
    graph.update_tensor(w, Tensor::new(vec![0.5, 1.5], vec![2]).unwrap()).unwrap();
    assert_eq!(graph.tensor(w).unwrap().data(), &[0.5, 1.5]);
    assert!(matches!(
        graph.update_tensor(w, scalar(1.0)),
        Err(NeuraRustError::ShapeMismatch { .. })
    ));
}

#[test]
fn test_release_frees_slot_and_invalidates_id() {
    let mut graph = Graph::new();
    let a = graph.leaf(scalar(2.0), true);
    let b = graph.leaf(scalar(3.0), true);
    let c = add_op(&mut graph, a, b).unwrap();

    // `a` is still an input of the live Add.
    assert_eq!(
        graph.release(a),
        Err(NeuraRustError::ValueInUse { value: a, uses: 1 })
    );

    // Releasing the output drops its creator, which frees the inputs.
    let tensor = graph.release(c).unwrap();
    assert_eq!(tensor.item().unwrap(), 5.0);
    assert_eq!(graph.live_operations(), 0);
    assert!(!graph.contains(c));
    assert_eq!(graph.tensor(c).err(), Some(NeuraRustError::UnknownValue(c)));

    graph.release(a).unwrap();
    let reused = graph.leaf(scalar(7.0), true);
    assert!(!graph.contains(a));
    assert!(graph.contains(reused));
    assert_eq!(graph.len(), 2);
}

#[test]
fn test_with_training_mode_restores_previous_mode() {
    let mut graph = Graph::new();
    let x = graph.leaf(scalar(1.0), true);
    let y = graph.with_training_mode(false, |g| {
        assert!(!g.is_training());
        add_op(g, x, x)
    });
    assert!(graph.is_training());
    assert_eq!(graph.creator(y.unwrap()).unwrap(), None);

    // Restored even when the closure fails.
    let missing = ValueId(RawId {
        index: 99,
        generation: 0,
    });
    let failed = graph.with_training_mode(false, |g| add_op(g, x, missing));
    assert!(failed.is_err());
    assert!(graph.is_training());
}

#[test]
fn test_config_is_per_graph() {
    let mut training: Graph<Tensor<f64>> = Graph::new();
    let mut inference: Graph<Tensor<f64>> =
        Graph::with_config(AutogradConfig::new().with_training(false));
    assert!(training.is_training());
    assert!(!inference.is_training());

    inference.set_training(true);
    training.set_training(false);
    assert!(inference.is_training());
    assert!(!training.is_training());

    training.set_config(AutogradConfig::default().with_strategy(BackwardStrategy::Iterative));
    assert_eq!(training.config().strategy, BackwardStrategy::Iterative);
    assert!(training.config().training);
}

#[test]
fn test_operation_accessors() {
    let mut graph = Graph::new();
    let a = graph.leaf(scalar(2.0), true);
    let b = graph.leaf(scalar(3.0), false);
    let c = mul_op(&mut graph, a, b).unwrap();
    let op = graph.creator(c).unwrap().unwrap();
    assert_eq!(graph.operation_name(op), Some("Mul"));
    assert_eq!(graph.operation_inputs(op), Some(&[a, b][..]));
    assert_eq!(graph.operation_outputs(op), Some(&Outputs::Single(c)));
    assert!(!graph.operation_outputs(op).unwrap().is_multi());
}
