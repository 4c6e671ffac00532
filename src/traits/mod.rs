//! Core traits for the container.

pub mod dispose;
pub mod resolver;

pub use dispose::Dispose;
pub use resolver::{Resolver, ResolverCore};
