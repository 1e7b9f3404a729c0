use crate::autograd::config::AutogradConfig;
use crate::autograd::graph::{Graph, ValueId};
use crate::error::NeuraRustError;
use crate::tensor::Tensor;
use approx::{abs_diff_eq, relative_eq};
use thiserror::Error;

/// Error type specifically for gradient checking failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GradCheckError {
    #[error("Gradient check failed for input {input_index}, element {element_index}: analytical {analytical_grad} != numerical {numerical_grad}. Difference: {difference}")]
    GradientMismatch {
        input_index: usize,
        element_index: usize,
        analytical_grad: f64,
        numerical_grad: f64,
        difference: f64,
    },
    #[error("Forward function execution failed during gradient check: {0}")]
    ForwardPassError(NeuraRustError),
    #[error("Backward pass execution failed during gradient check: {0}")]
    BackwardPassError(NeuraRustError),
    #[error("Tensor error during intermediate calculation: {0}")]
    TensorError(NeuraRustError),
    #[error("Input {input_index} requires grad but has no gradient after the backward pass")]
    MissingAnalyticalGrad { input_index: usize },
    #[error("Numerical gradient is NaN or infinite for input {input_index}, element {element_index}. Loss+: {loss_plus}, Loss-: {loss_minus}")]
    NumericalGradNaNOrInfinite {
        input_index: usize,
        element_index: usize,
        loss_plus: f64,
        loss_minus: f64,
    },
    #[error("Analytical gradient is NaN or infinite for input {input_index}, element {element_index}. Value: {value}")]
    AnalyticalGradNaNOrInfinite {
        input_index: usize,
        element_index: usize,
        value: f64,
    },
}

impl From<NeuraRustError> for GradCheckError {
    fn from(err: NeuraRustError) -> Self {
        GradCheckError::TensorError(err)
    }
}

/// Checks analytical gradients against numerical gradients using central finite
/// differences.
///
/// `build` receives a fresh graph and one leaf per entry of `inputs` and returns the
/// output value. The scalar loss is the sum of the output's elements, so the analytical
/// pass is a plain `backward` with the all-ones seed.
///
/// Every element of every input is perturbed by `+/- epsilon`; the perturbed forward
/// passes run with training disabled, so no graph edges are built for them. An element
/// passes when the two gradients agree within `tolerance`, absolutely or relatively.
pub fn check_grad<F>(
    build: F,
    inputs: &[Tensor<f64>],
    epsilon: f64,
    tolerance: f64,
) -> Result<(), GradCheckError>
where
    F: Fn(&mut Graph<Tensor<f64>>, &[ValueId]) -> Result<ValueId, NeuraRustError>,
{
    // --- Analytical gradients ---
    let mut graph = Graph::new();
    let ids: Vec<ValueId> = inputs
        .iter()
        .map(|input| graph.leaf(input.clone(), true))
        .collect();
    let output = build(&mut graph, &ids).map_err(GradCheckError::ForwardPassError)?;
    graph
        .backward(output)
        .map_err(GradCheckError::BackwardPassError)?;

    for (input_index, input) in inputs.iter().enumerate() {
        let analytical = graph
            .grad(ids[input_index])?
            .cloned()
            .ok_or(GradCheckError::MissingAnalyticalGrad { input_index })?;

        // --- Numerical gradients, element by element ---
        for element_index in 0..input.numel() {
            let loss_plus = perturbed_loss(&build, inputs, input_index, element_index, epsilon)?;
            let loss_minus = perturbed_loss(&build, inputs, input_index, element_index, -epsilon)?;
            if !loss_plus.is_finite() || !loss_minus.is_finite() {
                return Err(GradCheckError::NumericalGradNaNOrInfinite {
                    input_index,
                    element_index,
                    loss_plus,
                    loss_minus,
                });
            }
            let numerical_grad = (loss_plus - loss_minus) / (2.0 * epsilon);

            let analytical_grad = analytical.data()[element_index];
            if !analytical_grad.is_finite() {
                return Err(GradCheckError::AnalyticalGradNaNOrInfinite {
                    input_index,
                    element_index,
                    value: analytical_grad,
                });
            }

            let close = abs_diff_eq!(analytical_grad, numerical_grad, epsilon = tolerance)
                || relative_eq!(analytical_grad, numerical_grad, max_relative = tolerance);
            if !close {
                return Err(GradCheckError::GradientMismatch {
                    input_index,
                    element_index,
                    analytical_grad,
                    numerical_grad,
                    difference: (analytical_grad - numerical_grad).abs(),
                });
            }
        }
    }
    Ok(())
}

fn perturbed_loss<F>(
    build: &F,
    inputs: &[Tensor<f64>],
    input_index: usize,
    element_index: usize,
    delta: f64,
) -> Result<f64, GradCheckError>
where
    F: Fn(&mut Graph<Tensor<f64>>, &[ValueId]) -> Result<ValueId, NeuraRustError>,
{
    let mut graph = Graph::with_config(AutogradConfig::new().with_training(false));
    let mut ids = Vec::with_capacity(inputs.len());
    for (i, input) in inputs.iter().enumerate() {
        let mut data = input.to_vec();
        if i == input_index {
            data[element_index] += delta;
        }
        let tensor = Tensor::new(data, input.shape().to_vec())?;
        ids.push(graph.leaf(tensor, false));
    }
    let output = build(&mut graph, &ids).map_err(GradCheckError::ForwardPassError)?;
    Ok(graph.tensor(output)?.data().iter().sum())
}
