pub mod take;

pub use take::{take_op, Take};
