use approx::assert_relative_eq;
use neurarust_autograd::autograd::{Graph, ValueId};
use neurarust_autograd::tensor::Tensor;

// Added allow(dead_code) because usage across different test crates isn't detected.
#[allow(dead_code)]
pub fn create_test_tensor(data: Vec<f64>, shape: Vec<usize>) -> Tensor<f64> {
    Tensor::new(data, shape).expect("Test tensor creation failed")
}

#[allow(dead_code)]
pub fn scalar(value: f64) -> Tensor<f64> {
    Tensor::scalar(value)
}

/// Asserts that `id` holds a gradient approximately equal to `expected`.
#[allow(dead_code)]
pub fn assert_grad_eq(graph: &Graph<Tensor<f64>>, id: ValueId, expected: &[f64]) {
    let grad = graph
        .grad(id)
        .expect("value should exist")
        .unwrap_or_else(|| panic!("{:?} should have a gradient", id));
    assert_eq!(grad.numel(), expected.len(), "gradient size for {:?}", id);
    for (actual, expected) in grad.data().iter().zip(expected) {
        assert_relative_eq!(*actual, *expected, epsilon = 1e-12);
    }
}
