//! Internal implementation details.

pub(crate) mod circular;

pub use circular::ResolutionPanic;
pub(crate) use circular::{raise, with_circular_catch};
