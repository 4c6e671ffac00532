//! Fluent handle returned by every registration.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::registration::{downcast, AnyArc, BindingId, DisposeFn};
use crate::traits::Dispose;

use super::Container;

/// Ties one registration to its container so it can be configured further.
///
/// The handle is short lived: it borrows the container and refers to the
/// exact binding it created. If the identity is registered again, the handle
/// becomes stale and further calls on it do nothing.
///
/// # Examples
///
/// ```
/// use picnic_ioc::{Container, Lifetime, Resolver};
/// use std::sync::Arc;
///
/// let container = Container::new();
/// let handle = container.register(|_| Arc::new(String::from("config")));
/// assert_eq!(handle.lifetime(), Some(Lifetime::Transient));
///
/// let handle = handle.as_singleton();
/// assert_eq!(handle.lifetime(), Some(Lifetime::Singleton));
///
/// let a = container.resolve_required::<String>();
/// let b = container.resolve_required::<String>();
/// assert!(Arc::ptr_eq(&a, &b));
/// ```
pub struct Registered<'c, I: ?Sized> {
    container: &'c Container,
    key: Key,
    binding: BindingId,
    _contract: PhantomData<fn() -> Arc<I>>,
}

impl<'c, I> Registered<'c, I>
where
    I: ?Sized + Send + Sync + 'static,
{
    pub(crate) fn new(container: &'c Container, binding: BindingId) -> Self {
        Self {
            container,
            key: Key::of::<I>(),
            binding,
            _contract: PhantomData,
        }
    }

    /// One instance per container, shared by every scope.
    pub fn as_singleton(self) -> Self {
        self.route(Lifetime::Singleton)
    }

    /// One instance per scope. Resolved directly from the container this
    /// behaves like a singleton.
    pub fn per_scope(self) -> Self {
        self.route(Lifetime::PerScope)
    }

    /// A fresh instance on every resolution (the default).
    pub fn transient(self) -> Self {
        self.route(Lifetime::Transient)
    }

    /// Current lifetime of this binding, `None` once it has been replaced.
    pub fn lifetime(&self) -> Option<Lifetime> {
        self.container.binding_lifetime(&self.key, self.binding)
    }

    /// Whether this handle still refers to the active binding of `I`.
    pub fn is_current(&self) -> bool {
        self.lifetime().is_some()
    }

    fn route(self, lifetime: Lifetime) -> Self {
        let updated = self
            .container
            .update_binding(&self.key, self.binding, |binding| binding.lifetime = lifetime);
        if updated {
            tracing::debug!(service = self.key.display_name(), ?lifetime, "lifetime changed");
            self.container.propagate_registration(&self.key);
        }
        self
    }
}

impl<'c, I> Registered<'c, I>
where
    I: ?Sized + Dispose,
{
    /// Call [`Dispose::dispose`] on cached instances of this binding when
    /// the lifetime that owns them is disposed.
    pub fn disposable(self) -> Self {
        let hook: DisposeFn = Arc::new(|any: &AnyArc| {
            if let Some(instance) = downcast::<I>(any) {
                instance.dispose();
            }
        });
        self.container
            .update_binding(&self.key, self.binding, move |binding| binding.disposer = Some(hook));
        self
    }
}

impl<I: ?Sized> fmt::Debug for Registered<'_, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registered")
            .field("service", &self.key.display_name())
            .field("binding", &self.binding)
            .finish()
    }
}
