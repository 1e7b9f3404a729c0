//! Backward traversal.
//!
//! Two strategies walk the graph from a terminal value back to the leaves:
//!
//! * **Recursive**: a depth-first recursion with visited sets local to the call computes a
//!   reverse topological order of the reachable operations. Each operation then runs
//!   exactly once, after every consumer of its outputs has contributed, so shared
//!   sub-expressions (diamonds) and multi-output siblings are fully summed before their
//!   creator's backward rule is invoked. Recursion depth grows with graph depth.
//! * **Iterative**: an explicit stack of `(value, incoming contribution)` pairs and no
//!   visited set. An operation runs once per path that reaches it and only propagates
//!   that path's contribution. Final gradients are the same (backward rules are linear in
//!   the output gradient and accumulation is a sum), but an operation reached through
//!   `k` paths runs `k` times. In exchange the call stack stays flat, which matters for
//!   long unrolled recurrent graphs.
//!
//! Both strategies accumulate into every value they reach that requires grad, and a
//! `None` returned by a backward rule skips that edge entirely. Backward rules only ever
//! see the gradient flowing from the root in the current call: whatever an intermediate
//! value stored from earlier calls (or from [`Graph::set_grad`]) is kept but never
//! propagated again.

use crate::autograd::config::BackwardStrategy;
use crate::autograd::graph::{Graph, OpId, Outputs, ValueId};
use crate::error::NeuraRustError;
use crate::tensor::GradTensor;
use std::collections::{HashMap, HashSet};

/// Summary of a finished backward call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackwardReport {
    pub strategy: BackwardStrategy,
    /// Number of times a backward rule (`backward` or `backward_multi`) was invoked.
    pub operations_invoked: usize,
}

impl<T: GradTensor> Graph<T> {
    /// Propagates gradients from `root` using the configured [`BackwardStrategy`].
    ///
    /// If `root` already holds a gradient it is used as the upstream gradient, otherwise
    /// the root is seeded with all-ones. Calling this on a value that does not require
    /// grad (an output produced in inference mode, for example) does nothing.
    ///
    /// Gradients accumulate: call [`Graph::clear_grads`] between independent passes.
    pub fn backward(&mut self, root: ValueId) -> Result<BackwardReport, NeuraRustError> {
        match self.config.strategy {
            BackwardStrategy::Recursive => self.backward_recursive(root),
            BackwardStrategy::Iterative => self.backward_iterative(root),
        }
    }

    /// Recursive, single-visit traversal. See the [module docs](self).
    pub fn backward_recursive(&mut self, root: ValueId) -> Result<BackwardReport, NeuraRustError> {
        let strategy = BackwardStrategy::Recursive;
        let seed = match self.seed_root(root)? {
            Some(seed) => seed,
            None => {
                return Ok(BackwardReport {
                    strategy,
                    operations_invoked: 0,
                })
            }
        };

        let mut visited_values = HashSet::new();
        let mut visited_ops = HashSet::new();
        let mut order = Vec::new();
        self.topo_visit(root, &mut visited_values, &mut visited_ops, &mut order)?;

        // Gradients received during this call, keyed by value.
        let mut pending = HashMap::new();
        pending.insert(root, seed);
        let mut processed = HashSet::with_capacity(order.len());
        let mut invoked = 0;
        for op in order.into_iter().rev() {
            if !processed.insert(op) {
                return Err(NeuraRustError::InvariantViolated(format!(
                    "operation {:?} scheduled twice in one backward pass",
                    op
                )));
            }
            if self.run_creator(op, &mut pending)? {
                invoked += 1;
            }
        }
        Ok(self.finish(root, strategy, invoked))
    }

    /// Stack-based traversal without a visited set. See the [module docs](self).
    pub fn backward_iterative(&mut self, root: ValueId) -> Result<BackwardReport, NeuraRustError> {
        let strategy = BackwardStrategy::Iterative;
        let seed = match self.seed_root(root)? {
            Some(seed) => seed,
            None => {
                return Ok(BackwardReport {
                    strategy,
                    operations_invoked: 0,
                })
            }
        };

        let mut invoked = 0;
        let mut stack = vec![(root, seed)];
        while let Some((value, grad)) = stack.pop() {
            let op = match self.values.get(value.0) {
                Some(node) if node.requires_grad => match node.creator {
                    Some(op) => op,
                    None => continue,
                },
                Some(_) => continue,
                None => {
                    return Err(NeuraRustError::InvariantViolated(format!(
                        "value {:?} reached during backward is no longer in the graph",
                        value
                    )))
                }
            };

            let (inputs, input_grads) = {
                let node = self.ops.get(op.0).ok_or_else(|| missing_op(op))?;
                let input_grads = match &node.outputs {
                    Outputs::Single(_) => node.function.backward(&grad)?,
                    Outputs::Multi(outputs) => {
                        let position =
                            outputs.iter().position(|o| *o == value).ok_or_else(|| {
                                NeuraRustError::InvariantViolated(format!(
                                    "{:?} names {:?} as creator but is not among its outputs",
                                    value, op
                                ))
                            })?;
                        let mut grads: Vec<T> =
                            node.output_shapes.iter().map(|s| T::zeros(s)).collect();
                        grads[position] = grad;
                        node.function.backward_multi(&grads)?
                    }
                };
                check_gradient_count(node.function.name(), node.inputs.len(), &input_grads)?;
                (node.inputs.clone(), input_grads)
            };
            invoked += 1;

            for (input, input_grad) in self.route(&inputs, input_grads)? {
                let has_creator = self
                    .values
                    .get(input.0)
                    .map_or(false, |node| node.creator.is_some());
                if has_creator {
                    stack.push((input, input_grad));
                }
            }
        }
        Ok(self.finish(root, strategy, invoked))
    }

    /// Seeds the terminal value. Returns `None` when it does not take part in autograd.
    fn seed_root(&mut self, root: ValueId) -> Result<Option<T>, NeuraRustError> {
        let node = self.value_node_mut(root)?;
        if !node.requires_grad {
            node.grad = None;
            log::debug!(
                "backward() called on {:?}, which does not require grad; nothing to do",
                root
            );
            return Ok(None);
        }
        let seed = match &node.grad {
            Some(grad) => grad.clone(),
            None => {
                let ones = T::ones(node.tensor.shape());
                node.grad = Some(ones.clone());
                ones
            }
        };
        Ok(Some(seed))
    }

    /// Post-order DFS over creators: an operation is pushed after the creators of all of
    /// its inputs.
    fn topo_visit(
        &mut self,
        value: ValueId,
        visited_values: &mut HashSet<ValueId>,
        visited_ops: &mut HashSet<OpId>,
        order: &mut Vec<OpId>,
    ) -> Result<(), NeuraRustError> {
        if !visited_values.insert(value) {
            return Ok(());
        }
        let node = self.values.get_mut(value.0).ok_or_else(|| {
            NeuraRustError::InvariantViolated(format!(
                "value {:?} reached during backward is no longer in the graph",
                value
            ))
        })?;
        if !node.requires_grad {
            node.grad = None;
            return Ok(());
        }
        let op = match node.creator {
            Some(op) => op,
            None => return Ok(()),
        };
        if !visited_ops.insert(op) {
            return Ok(());
        }
        let inputs = self
            .ops
            .get(op.0)
            .map(|node| node.inputs.clone())
            .ok_or_else(|| missing_op(op))?;
        for input in inputs {
            self.topo_visit(input, visited_values, visited_ops, order)?;
        }
        order.push(op);
        Ok(())
    }

    /// Runs the backward rule of `op` on the gradients its outputs received in this call,
    /// then adds what it produced to `pending`.
    /// Returns `false` if none of its outputs received a gradient.
    fn run_creator(
        &mut self,
        op: OpId,
        pending: &mut HashMap<ValueId, T>,
    ) -> Result<bool, NeuraRustError> {
        let (inputs, input_grads) = {
            let node = self.ops.get(op.0).ok_or_else(|| missing_op(op))?;
            let input_grads = match &node.outputs {
                Outputs::Single(output) => match self.attached_grad(*output, op, pending) {
                    Some(grad) => node.function.backward(grad)?,
                    None => return Ok(false),
                },
                Outputs::Multi(outputs) => {
                    if outputs.is_empty() {
                        return Err(NeuraRustError::InvariantViolated(format!(
                            "multi-output operation {} has no outputs",
                            node.function.name()
                        )));
                    }
                    let mut received = false;
                    let grads: Vec<T> = outputs
                        .iter()
                        .zip(&node.output_shapes)
                        .map(|(output, shape)| match self.attached_grad(*output, op, pending) {
                            Some(grad) => {
                                received = true;
                                grad.clone()
                            }
                            None => T::zeros(shape),
                        })
                        .collect();
                    if !received {
                        return Ok(false);
                    }
                    node.function.backward_multi(&grads)?
                }
            };
            check_gradient_count(node.function.name(), node.inputs.len(), &input_grads)?;
            log::trace!("Ran backward of {} ({:?})", node.function.name(), op);
            (node.inputs.clone(), input_grads)
        };
        for (input, grad) in self.route(&inputs, input_grads)? {
            let total = match pending.remove(&input) {
                Some(previous) => previous.add(&grad)?,
                None => grad,
            };
            pending.insert(input, total);
        }
        Ok(true)
    }

    /// This call's gradient of `output` if it is still attached to `op` and takes part in
    /// autograd.
    fn attached_grad<'a>(
        &self,
        output: ValueId,
        op: OpId,
        pending: &'a HashMap<ValueId, T>,
    ) -> Option<&'a T> {
        self.values
            .get(output.0)
            .filter(|node| node.creator == Some(op) && node.requires_grad)
            .and_then(|_| pending.get(&output))
    }

    /// Accumulates each non-`None` gradient into its input and returns the pairs that
    /// were actually stored.
    fn route(
        &mut self,
        inputs: &[ValueId],
        grads: Vec<Option<T>>,
    ) -> Result<Vec<(ValueId, T)>, NeuraRustError> {
        let mut propagated = Vec::with_capacity(inputs.len());
        for (input, grad) in inputs.iter().zip(grads) {
            let grad = match grad {
                Some(grad) => grad,
                None => continue,
            };
            if self.accumulate_grad(*input, &grad)? {
                propagated.push((*input, grad));
            }
        }
        Ok(propagated)
    }

    fn finish(&mut self, root: ValueId, strategy: BackwardStrategy, invoked: usize) -> BackwardReport {
        if !self.config.retain_grad {
            for (_, node) in self.values.iter_mut() {
                if node.creator.is_some() {
                    node.grad = None;
                }
            }
        }
        log::debug!(
            "backward({:?}) finished: strategy={:?}, {} operation invocation(s)",
            root,
            strategy,
            invoked
        );
        BackwardReport {
            strategy,
            operations_invoked: invoked,
        }
    }
}

fn missing_op(op: OpId) -> NeuraRustError {
    NeuraRustError::InvariantViolated(format!(
        "operation {:?} scheduled for backward is no longer in the graph",
        op
    ))
}

fn check_gradient_count<T>(
    operation: &str,
    expected: usize,
    grads: &[Option<T>],
) -> Result<(), NeuraRustError> {
    if grads.len() == expected {
        Ok(())
    } else {
        Err(NeuraRustError::GradientCountMismatch {
            operation: operation.to_string(),
            expected,
            actual: grads.len(),
        })
    }
}

#[cfg(test)]
#[path = "backward_test.rs"]
mod tests;
