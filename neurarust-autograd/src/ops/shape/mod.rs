pub mod concat;
pub mod split;

pub use concat::{concat_op, Concat};
pub use split::{split_op, Split};
