//! Error types for the container.

use thiserror::Error;

/// Dependency injection errors
///
/// An unregistered service is *not* an error: resolution yields an absent
/// value instead. The variants below are configuration mistakes or misuse of
/// a lifetime.
///
/// # Examples
///
/// ```rust
/// use picnic_ioc::{Container, DiError, Resolver};
///
/// let container = Container::new();
/// assert!(container.try_resolve::<String>().unwrap().is_none());
///
/// container.dispose();
/// match container.try_resolve::<String>() {
///     Err(DiError::Disposed(what)) => assert_eq!(what, "container"),
///     other => panic!("unexpected: {:?}", other),
/// }
/// ```
///
/// ```rust
/// use picnic_ioc::DiError;
///
/// let circular = DiError::Circular(vec!["ServiceA", "ServiceB", "ServiceA"]);
/// assert_eq!(circular.to_string(), "Circular dependency: ServiceA -> ServiceB -> ServiceA");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiError {
    /// Stored instance did not downcast to the requested contract
    #[error("Type mismatch for: {0}")]
    TypeMismatch(&'static str),
    /// Circular dependency detected (includes path)
    #[error("Circular dependency: {}", .0.join(" -> "))]
    Circular(Vec<&'static str>),
    /// Maximum recursion depth exceeded
    #[error("Max depth {0} exceeded")]
    DepthExceeded(usize),
    /// Resolution against a container or scope that was already disposed
    #[error("Cannot resolve from a disposed {0}")]
    Disposed(&'static str),
    /// Constructor parameter had no registration (strict mode only)
    #[error("No registration for {dependency} required by {consumer}")]
    Unresolved {
        dependency: &'static str,
        consumer: &'static str,
    },
}

/// Result type for container operations
pub type DiResult<T> = Result<T, DiError>;
