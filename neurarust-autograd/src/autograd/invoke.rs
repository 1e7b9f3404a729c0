//! Invocation entry points: run an operation forward and wire it into the graph.

use crate::autograd::function::{Arity, Function};
use crate::autograd::graph::{Graph, OpId, OpNode, Outputs, ValueId, ValueNode};
use crate::error::NeuraRustError;
use crate::tensor::GradTensor;

impl<T: GradTensor> Graph<T> {
    /// Invokes a single-output operation on `inputs` and returns the produced value.
    ///
    /// Steps:
    /// 1. validate arity and that every input id is live (fails before any mutation);
    /// 2. run [`Function::forward`] on the unwrapped tensors;
    /// 3. wrap the result in a new value;
    /// 4. if the graph is in training mode **and** at least one input requires grad, record
    ///    inputs/output on the operation and make it the output's creator. Otherwise the
    ///    operation is dropped and the output is an ungraphed leaf with
    ///    `requires_grad = false`.
    ///
    /// # Errors
    /// `ArityMismatch`, `MissingInput`, or whatever the forward computation returns.
    ///
    /// # Panics
    /// If the graph already holds `u32::MAX` live values or operations.
    pub fn apply<F>(&mut self, function: F, inputs: &[ValueId]) -> Result<ValueId, NeuraRustError>
    where
        F: Function<T> + 'static,
    {
        self.apply_boxed(Box::new(function), inputs)
    }

    /// Object-safe form of [`Graph::apply`].
    pub fn apply_boxed(
        &mut self,
        mut function: Box<dyn Function<T>>,
        inputs: &[ValueId],
    ) -> Result<ValueId, NeuraRustError> {
        let tensors = self.unwrap_inputs(function.as_ref(), inputs)?;
        let output = function.forward(&tensors)?;

        let record = self.should_record(inputs);
        let shape = output.shape().to_vec();
        let output_id = ValueId(self.values.insert(ValueNode::new(output, record)));
        if record {
            self.record(function, inputs, Outputs::Single(output_id), vec![shape]);
        } else {
            log::trace!(
                "{}: graph recording skipped, output {:?} is a leaf",
                function.name(),
                output_id
            );
        }
        Ok(output_id)
    }

    /// Invokes a multi-output operation (split, chunk, ...) and returns its outputs in order.
    ///
    /// Same validation and recording rules as [`Graph::apply`]. All outputs share the one
    /// operation as creator, so that the backward rule receives one gradient per output.
    pub fn apply_multi<F>(
        &mut self,
        function: F,
        inputs: &[ValueId],
    ) -> Result<Vec<ValueId>, NeuraRustError>
    where
        F: Function<T> + 'static,
    {
        self.apply_multi_boxed(Box::new(function), inputs)
    }

    /// Object-safe form of [`Graph::apply_multi`].
    pub fn apply_multi_boxed(
        &mut self,
        mut function: Box<dyn Function<T>>,
        inputs: &[ValueId],
    ) -> Result<Vec<ValueId>, NeuraRustError> {
        let tensors = self.unwrap_inputs(function.as_ref(), inputs)?;
        let outputs = function.forward_multi(&tensors)?;

        let record = self.should_record(inputs) && !outputs.is_empty();
        let shapes: Vec<Vec<usize>> = outputs.iter().map(|t| t.shape().to_vec()).collect();
        let output_ids: Vec<ValueId> = outputs
            .into_iter()
            .map(|tensor| ValueId(self.values.insert(ValueNode::new(tensor, record))))
            .collect();
        if record {
            self.record(function, inputs, Outputs::Multi(output_ids.clone()), shapes);
        } else {
            log::trace!(
                "{}: graph recording skipped for {} output(s)",
                function.name(),
                output_ids.len()
            );
        }
        Ok(output_ids)
    }

    /// Checks arity and resolves input ids to tensors.
    fn unwrap_inputs(
        &self,
        function: &dyn Function<T>,
        inputs: &[ValueId],
    ) -> Result<Vec<&T>, NeuraRustError> {
        let arity = function.required_inputs();
        if !arity.accepts(inputs.len()) {
            let expected = match arity {
                Arity::Exactly(expected) => expected,
                Arity::Variadic => inputs.len(),
            };
            return Err(NeuraRustError::ArityMismatch {
                operation: function.name().to_string(),
                expected,
                actual: inputs.len(),
            });
        }
        inputs
            .iter()
            .enumerate()
            .map(|(index, id)| {
                self.values
                    .get(id.0)
                    .map(|node| &node.tensor)
                    .ok_or_else(|| NeuraRustError::MissingInput {
                        operation: function.name().to_string(),
                        index,
                    })
            })
            .collect()
    }

    fn should_record(&self, inputs: &[ValueId]) -> bool {
        self.config.training
            && inputs.iter().any(|id| {
                self.values
                    .get(id.0)
                    .map_or(false, |node| node.requires_grad)
            })
    }

    fn record(
        &mut self,
        function: Box<dyn Function<T>>,
        inputs: &[ValueId],
        outputs: Outputs,
        output_shapes: Vec<Vec<usize>>,
    ) -> OpId {
        log::trace!(
            "{}: recording edge {:?} -> {:?}",
            function.name(),
            inputs,
            outputs.as_slice()
        );
        let output_ids = outputs.as_slice().to_vec();
        let op = OpId(self.ops.insert(OpNode {
            function,
            inputs: inputs.to_vec(),
            outputs,
            output_shapes,
        }));
        for (position, input) in inputs.iter().enumerate() {
            // `add(a, a)` is one use of `a`.
            if inputs[..position].contains(input) {
                continue;
            }
            if let Some(node) = self.values.get_mut(input.0) {
                node.uses += 1;
            }
        }
        for output in output_ids {
            if let Some(node) = self.values.get_mut(output.0) {
                node.creator = Some(op);
            }
        }
        op
    }
}

#[cfg(test)]
#[path = "invoke_test.rs"]
mod tests;
