//! Reverse-mode automatic differentiation.
//!
//! A [`Graph`] owns every value and every recorded operation of a computation. Model code
//! creates leaves, invokes [`Function`]s through [`Graph::apply`] / [`Graph::apply_multi`]
//! (which record the edges when training), then calls [`Graph::backward`] on the terminal
//! value to accumulate gradients into every upstream value that requires them.

mod arena;
pub mod backward;
pub mod config;
pub mod function;
pub mod grad_check;
pub mod graph;
mod invoke;
mod sever;

pub use backward::BackwardReport;
pub use config::{AutogradConfig, BackwardStrategy};
pub use function::{Arity, Function};
pub use grad_check::{check_grad, GradCheckError};
pub use graph::{Graph, OpId, Outputs, ValueId};
