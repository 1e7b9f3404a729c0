// Trains a scalar recurrent cell h_t = w * h_{t-1} + b * x_t with truncated
// backpropagation through time.
//
// Run with `RUST_LOG=info cargo run --example truncated_bptt`
// (`RUST_LOG=debug` also shows the engine's backward and severing logs).

use neurarust_autograd::autograd::{Graph, ValueId};
use neurarust_autograd::ops::{add_op, mul_op, sub_op, sum_op};
use neurarust_autograd::tensor::{randn, Tensor};
use neurarust_autograd::NeuraRustError;
use rand::rngs::StdRng;
use rand::SeedableRng;

const TRUE_W: f64 = 0.7;
const TRUE_B: f64 = 0.3;
const SEQUENCE_LEN: usize = 400;
const WINDOW: usize = 8;
const EPOCHS: usize = 30;
const LEARNING_RATE: f64 = 0.02;

/// Generates inputs and the targets produced by the true cell.
fn make_sequence(rng: &mut StdRng) -> (Vec<f64>, Vec<f64>) {
    let inputs = randn::<f64, _>(&[SEQUENCE_LEN], rng).to_vec();
    let mut targets = Vec::with_capacity(SEQUENCE_LEN);
    let mut h = 0.0;
    for &x in &inputs {
        h = TRUE_W * h + TRUE_B * x;
        targets.push(h);
    }
    (inputs, targets)
}

/// p = p - lr * grad(p)
fn sgd_step(graph: &mut Graph<Tensor<f64>>, params: &[ValueId], lr: f64) -> Result<(), NeuraRustError> {
    for &param in params {
        let update = match graph.grad(param)? {
            Some(grad) => grad.scale(lr),
            None => continue,
        };
        let next = graph.tensor(param)?.sub(&update)?;
        graph.update_tensor(param, next)?;
    }
    Ok(())
}

fn run_epoch(
    graph: &mut Graph<Tensor<f64>>,
    params: &[ValueId],
    inputs: &[f64],
    targets: &[f64],
) -> Result<f64, NeuraRustError> {
    let (w, b) = (params[0], params[1]);
    let mut h = graph.leaf(Tensor::scalar(0.0), false);
    let mut total_loss = 0.0;

    for (chunk_inputs, chunk_targets) in inputs.chunks(WINDOW).zip(targets.chunks(WINDOW)) {
        let mut window = Vec::new();
        let mut acc = graph.leaf(Tensor::scalar(0.0), false);
        for (&x, &y) in chunk_inputs.iter().zip(chunk_targets) {
            let x = graph.leaf(Tensor::scalar(x), false);
            let y = graph.leaf(Tensor::scalar(y), false);
            let wh = mul_op(graph, w, h)?;
            let bx = mul_op(graph, b, x)?;
            let next = add_op(graph, wh, bx)?;
            let diff = sub_op(graph, next, y)?;
            let sq = mul_op(graph, diff, diff)?;
            let sum = add_op(graph, acc, sq)?;
            window.extend([x, y, wh, bx, diff, sq, acc, h]);
            acc = sum;
            h = next;
        }
        window.push(acc);
        let loss = sum_op(graph, acc)?;
        total_loss += graph.tensor(loss)?.item()?;

        graph.backward(loss)?;
        sgd_step(graph, params, LEARNING_RATE)?;
        graph.clear_grads();

        // Truncate: the carried state becomes a leaf, and the window can be freed.
        let severed = graph.unchain_backward(loss)?;
        log::debug!("Severed {} operation(s) at window boundary", severed);
        graph.release(loss)?;
        for id in window {
            graph.release(id)?;
        }
    }
    graph.release(h)?;
    Ok(total_loss / inputs.len() as f64)
}

fn main() -> Result<(), NeuraRustError> {
    env_logger::init();

    let mut rng = StdRng::seed_from_u64(42);
    let (inputs, targets) = make_sequence(&mut rng);

    let mut graph: Graph<Tensor<f64>> = Graph::new();
    let w = graph.leaf_named("w", Tensor::scalar(0.1), true);
    let b = graph.leaf_named("b", Tensor::scalar(0.0), true);
    let params = [w, b];

    for epoch in 0..EPOCHS {
        let loss = run_epoch(&mut graph, &params, &inputs, &targets)?;
        log::info!(
            "epoch {:>2}: mse={:.6} w={:.4} b={:.4} (values alive: {})",
            epoch,
            loss,
            graph.tensor(w)?.item()?,
            graph.tensor(b)?.item()?,
            graph.len()
        );
    }

    println!(
        "learned w={:.4} (true {}), b={:.4} (true {})",
        graph.tensor(w)?.item()?,
        TRUE_W,
        graph.tensor(b)?.item()?,
        TRUE_B
    );
    Ok(())
}
