//! Graph severing ("unchaining").
//!
//! Severing bounds how far a backward pass can reach and releases the operations (and
//! whatever they cached during forward) that are no longer needed. Recurrent models call
//! [`Graph::unchain_backward`] on their hidden state every few steps to implement
//! truncated backpropagation through time.
//!
//! Every method here is idempotent: severing something already severed, or a leaf, is a
//! no-op.

use crate::autograd::graph::{Graph, OpId, ValueId};
use crate::error::NeuraRustError;
use crate::tensor::GradTensor;

impl<T: GradTensor> Graph<T> {
    /// Drops a single operation out of the graph.
    ///
    /// Its recorded inputs stop counting it as a user and its outputs become leaves.
    /// Returns `false` if the operation was already severed.
    pub fn unchain_op(&mut self, op: OpId) -> bool {
        let node = match self.ops.remove(op.0) {
            Some(node) => node,
            None => return false,
        };
        for (position, input) in node.inputs.iter().enumerate() {
            if node.inputs[..position].contains(input) {
                continue;
            }
            if let Some(value) = self.values.get_mut(input.0) {
                value.uses = value.uses.saturating_sub(1);
            }
        }
        for output in node.outputs.as_slice() {
            if let Some(value) = self.values.get_mut(output.0) {
                if value.creator == Some(op) {
                    value.creator = None;
                }
            }
        }
        log::trace!("Unchained operation {:?} ({})", op, node.function.name());
        true
    }

    /// Severs a value from its creator, turning it into a leaf.
    ///
    /// The creator itself is dropped once none of its outputs point to it any more, so
    /// detaching one output of a multi-output operation keeps the operation alive for
    /// its siblings.
    pub fn detach_from_graph(&mut self, id: ValueId) -> Result<(), NeuraRustError> {
        let op = match self.value_node_mut(id)?.creator.take() {
            Some(op) => op,
            None => return Ok(()),
        };
        let still_referenced = match self.ops.get(op.0) {
            Some(node) => node.outputs.as_slice().iter().any(|output| {
                self.values
                    .get(output.0)
                    .map_or(false, |value| value.creator == Some(op))
            }),
            None => false,
        };
        if !still_referenced {
            self.unchain_op(op);
        }
        Ok(())
    }

    /// Severs the whole upstream chain of `id`: its creator, the creators of that
    /// creator's inputs, and so on up to the leaves.
    ///
    /// Walks with an explicit stack so arbitrarily deep (unrolled) graphs are safe.
    /// Returns the number of operations severed.
    pub fn unchain_backward(&mut self, id: ValueId) -> Result<usize, NeuraRustError> {
        self.value_node(id)?;
        let mut severed = 0;
        let mut stack = vec![id];
        while let Some(value) = stack.pop() {
            let op = match self.values.get(value.0).and_then(|node| node.creator) {
                Some(op) => op,
                None => continue,
            };
            let inputs = self
                .ops
                .get(op.0)
                .map(|node| node.inputs.clone())
                .unwrap_or_default();
            if self.unchain_op(op) {
                severed += 1;
            }
            stack.extend(inputs);
        }
        log::debug!("unchain_backward({:?}) severed {} operation(s)", id, severed);
        Ok(severed)
    }
}

#[cfg(test)]
#[path = "sever_test.rs"]
mod tests;
