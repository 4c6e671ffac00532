//! Disposal trait for resource cleanup.

/// Trait for synchronous resource disposal.
///
/// Implement this trait for services that need structured teardown (flushing
/// caches, closing connections) and mark the binding with
/// [`Registered::disposable`](crate::Registered::disposable). When the
/// lifetime that cached an instance is disposed, `dispose` is called exactly
/// once per cached instance, most recently created first.
///
/// Transient instances are never cached and therefore never disposed by the
/// container.
///
/// # Examples
///
/// ```
/// use picnic_ioc::{Container, Dispose, Resolver};
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use std::sync::Arc;
///
/// struct Cache {
///     flushed: AtomicBool,
/// }
///
/// impl Dispose for Cache {
///     fn dispose(&self) {
///         self.flushed.store(true, Ordering::SeqCst);
///     }
/// }
///
/// let container = Container::new();
/// container
///     .register::<Cache, _>(|_| Arc::new(Cache { flushed: AtomicBool::new(false) }))
///     .per_scope()
///     .disposable();
///
/// let scope = container.create_scope();
/// let cache = scope.resolve_required::<Cache>();
/// scope.dispose();
/// assert!(cache.flushed.load(Ordering::SeqCst));
/// ```
pub trait Dispose: Send + Sync + 'static {
    /// Perform synchronous cleanup of resources.
    fn dispose(&self);
}
