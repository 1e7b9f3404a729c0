use crate::autograd::arena::{Arena, RawId};
use crate::autograd::config::AutogradConfig;
use crate::autograd::function::Function;
use crate::error::NeuraRustError;
use crate::tensor::GradTensor;
use std::fmt;

/// Handle to a value (a tensor at a position in the graph).
///
/// Ids are cheap `Copy` handles into the [`Graph`] arena. Once a value is released its id
/// stops resolving, even if the slot is later reused.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValueId(pub(crate) RawId);

/// Handle to an operation node recorded in the graph.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OpId(pub(crate) RawId);

impl fmt::Debug for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValueId({}v{})", self.0.index, self.0.generation)
    }
}

impl fmt::Debug for OpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OpId({}v{})", self.0.index, self.0.generation)
    }
}

/// The values an operation produced, tagged once at construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outputs {
    Single(ValueId),
    Multi(Vec<ValueId>),
}

impl Outputs {
    pub fn as_slice(&self) -> &[ValueId] {
        match self {
            Outputs::Single(id) => std::slice::from_ref(id),
            Outputs::Multi(ids) => ids,
        }
    }

    pub fn is_multi(&self) -> bool {
        matches!(self, Outputs::Multi(_))
    }
}

/// Internal storage for a value.
#[derive(Debug)]
pub(crate) struct ValueNode<T> {
    pub(crate) tensor: T,
    /// Same shape as `tensor` whenever present.
    pub(crate) grad: Option<T>,
    pub(crate) requires_grad: bool,
    /// `None` for leaves and severed values.
    pub(crate) creator: Option<OpId>,
    pub(crate) name: Option<String>,
    /// Number of distinct live operations recording this value as an input. An
    /// operation listing the value in several input positions counts once.
    pub(crate) uses: usize,
}

impl<T> ValueNode<T> {
    pub(crate) fn new(tensor: T, requires_grad: bool) -> Self {
        ValueNode {
            tensor,
            grad: None,
            requires_grad,
            creator: None,
            name: None,
            uses: 0,
        }
    }
}

/// Internal storage for an operation wired into the graph.
pub(crate) struct OpNode<T: GradTensor> {
    pub(crate) function: Box<dyn Function<T>>,
    pub(crate) inputs: Vec<ValueId>,
    pub(crate) outputs: Outputs,
    /// Shapes of the outputs at construction, used to synthesize zero gradients for
    /// outputs that did not receive one.
    pub(crate) output_shapes: Vec<Vec<usize>>,
}

impl<T: GradTensor> fmt::Debug for OpNode<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpNode")
            .field("function", &self.function.name())
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .finish()
    }
}

/// Arena owning every value and operation of a computation graph.
///
/// Values reference their creator and operations reference their inputs/outputs by index,
/// so the mutual value <-> operation links never form ownership cycles. Dropping the graph
/// frees everything; [`Graph::release`] and the severing methods free individual parts.
///
/// A `Graph` is single-threaded and non-reentrant, but owns all of its state (including
/// its [`AutogradConfig`]), so independent graphs can live on different threads.
pub struct Graph<T: GradTensor> {
    pub(crate) values: Arena<ValueNode<T>>,
    pub(crate) ops: Arena<OpNode<T>>,
    pub(crate) config: AutogradConfig,
}

impl<T: GradTensor> Default for Graph<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: GradTensor> fmt::Debug for Graph<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("values", &self.values.len())
            .field("operations", &self.ops.len())
            .field("config", &self.config)
            .finish()
    }
}

impl<T: GradTensor> Graph<T> {
    pub fn new() -> Self {
        Self::with_config(AutogradConfig::default())
    }

    pub fn with_config(config: AutogradConfig) -> Self {
        Graph {
            values: Arena::new(),
            ops: Arena::new(),
            config,
        }
    }

    pub fn config(&self) -> &AutogradConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: AutogradConfig) {
        self.config = config;
    }

    /// Enables or disables graph recording for subsequent invocations.
    /// Edges that were already recorded are left untouched.
    pub fn set_training(&mut self, training: bool) {
        log::debug!("Graph training mode set to {}", training);
        self.config.training = training;
    }

    pub fn is_training(&self) -> bool {
        self.config.training
    }

    /// Runs `f` with the training mode temporarily set to `training`, then restores the
    /// previous mode whatever `f` returns.
    ///
    /// `graph.with_training_mode(false, |g| ...)` is the inference ("no grad") scope.
    pub fn with_training_mode<R, F>(&mut self, training: bool, f: F) -> R
    where
        F: FnOnce(&mut Self) -> R,
    {
        let previous = self.config.training;
        self.config.training = training;
        let result = f(self);
        self.config.training = previous;
        result
    }

    // --- Values ---

    /// Wraps a tensor as a leaf value (no creator).
    ///
    /// # Panics
    /// If `u32::MAX` values are live at once.
    pub fn leaf(&mut self, tensor: T, requires_grad: bool) -> ValueId {
        ValueId(self.values.insert(ValueNode::new(tensor, requires_grad)))
    }

    /// Like [`Graph::leaf`], with a human-readable name.
    pub fn leaf_named(&mut self, name: &str, tensor: T, requires_grad: bool) -> ValueId {
        let mut node = ValueNode::new(tensor, requires_grad);
        node.name = Some(name.to_string());
        ValueId(self.values.insert(node))
    }

    pub(crate) fn value_node(&self, id: ValueId) -> Result<&ValueNode<T>, NeuraRustError> {
        self.values.get(id.0).ok_or(NeuraRustError::UnknownValue(id))
    }

    pub(crate) fn value_node_mut(
        &mut self,
        id: ValueId,
    ) -> Result<&mut ValueNode<T>, NeuraRustError> {
        self.values.get_mut(id.0).ok_or(NeuraRustError::UnknownValue(id))
    }

    /// Returns `true` if `id` refers to a live value of this graph.
    pub fn contains(&self, id: ValueId) -> bool {
        self.values.get(id.0).is_some()
    }

    /// Number of live values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.len() == 0
    }

    /// Number of operations still wired into the graph.
    pub fn live_operations(&self) -> usize {
        self.ops.len()
    }

    pub fn tensor(&self, id: ValueId) -> Result<&T, NeuraRustError> {
        Ok(&self.value_node(id)?.tensor)
    }

    /// Replaces the tensor of a value, e.g. for an optimizer step on a parameter.
    ///
    /// The new tensor must have the same shape as the old one. The stored gradient is kept.
    pub fn update_tensor(&mut self, id: ValueId, tensor: T) -> Result<(), NeuraRustError> {
        let node = self.value_node_mut(id)?;
        if !node.tensor.same_shape(&tensor) {
            return Err(NeuraRustError::ShapeMismatch {
                expected: node.tensor.shape().to_vec(),
                actual: tensor.shape().to_vec(),
                operation: "update_tensor".to_string(),
            });
        }
        node.tensor = tensor;
        Ok(())
    }

    pub fn grad(&self, id: ValueId) -> Result<Option<&T>, NeuraRustError> {
        Ok(self.value_node(id)?.grad.as_ref())
    }

    /// Sets (or clears, with `None`) the gradient of a value.
    ///
    /// # Errors
    /// Returns `NeuraRustError::GradientShapeMismatch` if the gradient's shape differs from
    /// the value's tensor shape. Nothing is stored in that case.
    ///
    /// A gradient offered to a value with `requires_grad = false` is discarded.
    pub fn set_grad(&mut self, id: ValueId, grad: Option<T>) -> Result<(), NeuraRustError> {
        let node = self.value_node_mut(id)?;
        match grad {
            None => node.grad = None,
            Some(grad) => {
                check_grad_shape(&node.tensor, &grad)?;
                if node.requires_grad {
                    node.grad = Some(grad);
                } else {
                    log::debug!("Discarding gradient offered to {:?}: requires_grad is false", id);
                }
            }
        }
        Ok(())
    }

    /// Adds `grad` into the stored gradient of `id` (or stores it if there is none).
    ///
    /// Returns `Ok(false)` without storing anything if the value does not require grad.
    pub(crate) fn accumulate_grad(&mut self, id: ValueId, grad: &T) -> Result<bool, NeuraRustError> {
        let node = self.value_node_mut(id)?;
        check_grad_shape(&node.tensor, grad)?;
        if !node.requires_grad {
            return Ok(false);
        }
        let summed = match &node.grad {
            Some(existing) => existing.add(grad)?,
            None => grad.clone(),
        };
        node.grad = Some(summed);
        Ok(true)
    }

    pub fn clear_grad(&mut self, id: ValueId) -> Result<(), NeuraRustError> {
        self.value_node_mut(id)?.grad = None;
        Ok(())
    }

    /// Clears the gradient of every value, typically between training iterations.
    pub fn clear_grads(&mut self) {
        for (_, node) in self.values.iter_mut() {
            node.grad = None;
        }
    }

    pub fn requires_grad(&self, id: ValueId) -> Result<bool, NeuraRustError> {
        Ok(self.value_node(id)?.requires_grad)
    }

    /// Sets the `requires_grad` flag. Turning it off drops any stored gradient.
    pub fn set_requires_grad(&mut self, id: ValueId, requires_grad: bool) -> Result<(), NeuraRustError> {
        let node = self.value_node_mut(id)?;
        if requires_grad && node.creator.is_some() {
            log::debug!("Setting requires_grad=true on non-leaf value {:?}", id);
        }
        node.requires_grad = requires_grad;
        if !requires_grad {
            node.grad = None;
        }
        Ok(())
    }

    /// The operation that produced this value, if it is still attached.
    pub fn creator(&self, id: ValueId) -> Result<Option<OpId>, NeuraRustError> {
        Ok(self.value_node(id)?.creator)
    }

    pub fn is_leaf(&self, id: ValueId) -> Result<bool, NeuraRustError> {
        Ok(self.value_node(id)?.creator.is_none())
    }

    pub fn name(&self, id: ValueId) -> Result<Option<&str>, NeuraRustError> {
        Ok(self.value_node(id)?.name.as_deref())
    }

    pub fn set_name(&mut self, id: ValueId, name: &str) -> Result<(), NeuraRustError> {
        self.value_node_mut(id)?.name = Some(name.to_string());
        Ok(())
    }

    /// Removes a value from the arena and returns its tensor.
    ///
    /// A value that still has a creator is detached first. Values that a live operation
    /// records as input cannot be released; sever that operation first.
    pub fn release(&mut self, id: ValueId) -> Result<T, NeuraRustError> {
        let uses = self.value_node(id)?.uses;
        if uses > 0 {
            return Err(NeuraRustError::ValueInUse { value: id, uses });
        }
        self.detach_from_graph(id)?;
        let node = self
            .values
            .remove(id.0)
            .ok_or(NeuraRustError::UnknownValue(id))?;
        Ok(node.tensor)
    }

    // --- Operations ---

    /// Inputs recorded on a live operation.
    pub fn operation_inputs(&self, op: OpId) -> Option<&[ValueId]> {
        self.ops.get(op.0).map(|node| node.inputs.as_slice())
    }

    /// Outputs recorded on a live operation.
    pub fn operation_outputs(&self, op: OpId) -> Option<&Outputs> {
        self.ops.get(op.0).map(|node| &node.outputs)
    }

    pub fn operation_name(&self, op: OpId) -> Option<&str> {
        self.ops.get(op.0).map(|node| node.function.name())
    }
}

fn check_grad_shape<T: GradTensor>(tensor: &T, grad: &T) -> Result<(), NeuraRustError> {
    if tensor.same_shape(grad) {
        Ok(())
    } else {
        Err(NeuraRustError::GradientShapeMismatch {
            expected: tensor.shape().to_vec(),
            actual: grad.shape().to_vec(),
        })
    }
}

#[cfg(test)]
#[path = "graph_test.rs"]
mod tests;
