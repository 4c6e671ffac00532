//! Scope-level lifetime.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use crate::cache::{CacheKey, ObjectCache};
use crate::config::ContainerOptions;
use crate::error::{DiError, DiResult};
use crate::internal::with_circular_catch;
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::registration::{AnyArc, Binding};
use crate::traits::ResolverCore;

use super::{Container, ContainerInner};

/// A lifetime in which per-scope services are instantiated once.
///
/// Singletons resolved through a scope come from the container, so every
/// scope shares them. Per-scope services are cached here and released when
/// the scope is disposed, either explicitly or on drop. Transients are built
/// fresh, with their own dependencies resolved against this scope.
///
/// A scope does not keep its container alive. Once the last `Container`
/// handle is dropped the container disposes its singletons, and the scope
/// reports [`DiError::Disposed`] from then on.
///
/// # Examples
///
/// ```
/// use picnic_ioc::{Container, Resolver};
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// struct RequestId(usize);
///
/// let counter = Arc::new(AtomicUsize::new(0));
/// let container = Container::new();
/// let c = counter.clone();
/// container
///     .register(move |_| Arc::new(RequestId(c.fetch_add(1, Ordering::SeqCst))))
///     .per_scope();
///
/// let scope1 = container.create_scope();
/// let scope2 = container.create_scope();
///
/// let a = scope1.resolve_required::<RequestId>();
/// let b = scope1.resolve_required::<RequestId>();
/// let c = scope2.resolve_required::<RequestId>();
///
/// assert!(Arc::ptr_eq(&a, &b));
/// assert!(!Arc::ptr_eq(&a, &c));
/// ```
pub struct Scope {
    container: Weak<ContainerInner>,
    options: ContainerOptions,
    cache: ObjectCache,
    disposed: AtomicBool,
}

impl Scope {
    pub(crate) fn new(container: &Container) -> Self {
        Self {
            container: Arc::downgrade(&container.inner),
            options: container.options().clone(),
            cache: ObjectCache::new(),
            disposed: AtomicBool::new(false),
        }
    }

    /// The container this scope delegates singletons to, while it is alive.
    pub fn container(&self) -> Option<Container> {
        self.container.upgrade().map(|inner| Container { inner })
    }

    /// Disposes the per-scope instances cached by this scope.
    ///
    /// Idempotent. Singletons are owned by the container and untouched.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        let released = self.cache.dispose();
        tracing::debug!(released, "scope disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    fn get_or_create_per_scope(&self, key: &Key, binding: &Binding) -> DiResult<AnyArc> {
        let cache_key = CacheKey {
            key: *key,
            binding: binding.id,
        };
        self.cache
            .get_or_create(cache_key, binding.disposer.as_ref(), || Container::create(self, key, binding))
    }
}

impl ResolverCore for Scope {
    fn resolve_any(&self, key: &Key) -> DiResult<Option<AnyArc>> {
        if self.is_disposed() {
            return Err(DiError::Disposed("scope"));
        }
        let container = match self.container() {
            Some(container) if !container.is_disposed() => container,
            _ => return Err(DiError::Disposed("container")),
        };
        let Some(binding) = container.binding(key) else {
            return Ok(None);
        };

        with_circular_catch(key.display_name(), self.options.depth_limit(), || match binding.lifetime {
            Lifetime::Transient => Container::create(self, key, &binding),
            Lifetime::Singleton => container.get_or_create_singleton(key, &binding),
            Lifetime::PerScope => self.get_or_create_per_scope(key, &binding),
        })
        .map(Some)
    }

    fn options(&self) -> &ContainerOptions {
        &self.options
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("cached", &self.cache.len())
            .field("container_alive", &(self.container.strong_count() > 0))
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
