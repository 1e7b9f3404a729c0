use crate::autograd::ValueId;
use thiserror::Error;

/// Custom error type for the NeuraRust autograd engine.
///
/// Variants fall into two families:
/// - contract violations, caused by the caller (wrong arity, stale ids,
///   mis-shaped gradients, unsupported multi-output calls, ...);
/// - [`NeuraRustError::InvariantViolated`], raised when the engine detects that its own
///   bookkeeping is inconsistent. Seeing this variant means an engine bug, not a user error.
///
/// A `None` gradient returned by a backward rule is *not* an error and never maps to a variant.
#[derive(Error, Debug, PartialEq, Clone)]
pub enum NeuraRustError {
    #[error("Arity mismatch for operation {operation}: expected {expected} inputs, got {actual}")]
    ArityMismatch {
        operation: String,
        expected: usize,
        actual: usize,
    },

    #[error("Missing input {index} for operation {operation}: the value does not exist in this graph")]
    MissingInput { operation: String, index: usize },

    #[error("Unknown value {0:?}: it was released or belongs to another graph")]
    UnknownValue(ValueId),

    #[error("Value {value:?} is still recorded as input by {uses} operation(s)")]
    ValueInUse { value: ValueId, uses: usize },

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Operation {operation} returned {actual} gradients, but {expected} inputs are recorded")]
    GradientCountMismatch {
        operation: String,
        expected: usize,
        actual: usize,
    },

    #[error("Gradient shape mismatch: expected {expected:?}, got {actual:?}")]
    GradientShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("Shape mismatch: expected {expected:?}, got {actual:?} during operation {operation}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
        operation: String,
    },

    #[error("Tensor creation error: data length {data_len} does not match shape {shape:?}")]
    TensorCreationError { data_len: usize, shape: Vec<usize> },

    #[error("Index out of bounds: index {index} for length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Slice error: {message}")]
    SliceError { message: String },

    #[error("Cannot concatenate an empty list of tensors")]
    EmptyTensorList,

    #[error("Invariant violated: {0}")]
    InvariantViolated(String),
}
