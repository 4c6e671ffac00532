//! The container and its lifetimes.
//!
//! [`Container`] owns the factory table and acts as the container-level
//! lifetime: singleton and per-scope bindings resolved from it share the
//! container cache. [`Scope`] is the scope-level lifetime. Both implement
//! [`ResolverCore`], which is where the lifetime tag of a binding is routed
//! to the right cache.

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::cache::{CacheKey, ObjectCache};
use crate::config::ContainerOptions;
use crate::construct::{synthesize, Construct};
use crate::error::{DiError, DiResult};
use crate::internal::with_circular_catch;
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::metadata::{Injectable, MemberInfo, METADATA};
use crate::registration::{erase, AnyArc, Binding, BindingId, Factory, Registry};
use crate::tracker::AutoInjectTracker;
use crate::traits::ResolverCore;

pub mod context;
pub mod registered;
pub mod scope;

pub use context::ResolverContext;
pub use registered::Registered;
pub use scope::Scope;

/// Inversion of control container.
///
/// Holds one factory per service identity and resolves services according
/// to the lifetime of their binding. Cloning a `Container` is cheap and
/// yields another handle to the same registrations and caches.
///
/// # Thread Safety
///
/// Registration, resolution, and injection may happen from any thread.
/// The factory table lock is never held while a factory runs, so factories
/// are free to resolve their own dependencies.
///
/// Circular dependencies are detected per thread. Two threads that start
/// building the singletons of one cycle at the same moment (one from each
/// end) wait on each other's cache slot and deadlock instead of reporting
/// [`DiError::Circular`]. Resolve one member of such a cycle first, or break
/// the cycle.
///
/// # Examples
///
/// ```
/// use picnic_ioc::{Container, Resolver};
/// use std::sync::Arc;
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// struct English;
/// impl Greeter for English {
///     fn greet(&self) -> String {
///         "hello".into()
///     }
/// }
///
/// let container = Container::new();
/// container.register::<dyn Greeter, _>(|_| Arc::new(English)).as_singleton();
///
/// let greeter = container.resolve_required::<dyn Greeter>();
/// assert_eq!(greeter.greet(), "hello");
/// ```
#[derive(Clone)]
pub struct Container {
    inner: Arc<ContainerInner>,
}

struct ContainerInner {
    registry: RwLock<Registry>,
    singletons: ObjectCache,
    tracker: AutoInjectTracker,
    options: ContainerOptions,
    disposed: AtomicBool,
}

impl ContainerInner {
    fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        let released = self.singletons.dispose();
        self.tracker.clear();
        tracing::info!(released, "container disposed");
    }
}

impl Drop for ContainerInner {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl Container {
    /// Creates an empty container with default options.
    pub fn new() -> Self {
        Self::with_options(ContainerOptions::default())
    }

    pub fn with_options(options: ContainerOptions) -> Self {
        tracing::debug!(strict = options.is_strict(), max_depth = options.depth_limit(), "container created");
        Self {
            inner: Arc::new(ContainerInner {
                registry: RwLock::new(Registry::default()),
                singletons: ObjectCache::new(),
                tracker: AutoInjectTracker::new(),
                options,
                disposed: AtomicBool::new(false),
            }),
        }
    }

    pub fn options(&self) -> &ContainerOptions {
        &self.inner.options
    }

    /// Registers a factory for the contract `I`.
    ///
    /// The binding starts out transient; use the returned handle to make it
    /// a singleton or per-scope. Registering `I` again replaces the previous
    /// binding.
    pub fn register<I, F>(&self, factory: F) -> Registered<'_, I>
    where
        I: ?Sized + Send + Sync + 'static,
        F: Fn(&ResolverContext<'_>) -> Arc<I> + Send + Sync + 'static,
    {
        let factory: Factory = Arc::new(move |ctx: &ResolverContext<'_>| Ok(erase(factory(ctx))));
        self.bind::<I>(factory, std::any::type_name::<I>())
    }

    /// Registers an existing object; every resolution yields that object.
    ///
    /// The object is treated like any other cached value: if the binding is
    /// promoted to a cached lifetime and marked
    /// [`disposable`](Registered::disposable), the owning cache disposes it
    /// after it has been resolved, even though the caller created it.
    pub fn register_instance<I>(&self, instance: Arc<I>) -> Registered<'_, I>
    where
        I: ?Sized + Send + Sync + 'static,
    {
        let factory: Factory = Arc::new(move |_: &ResolverContext<'_>| Ok(erase(instance.clone())));
        self.bind::<I>(factory, std::any::type_name::<I>())
    }

    /// Registers `C` under its own identity, built by its [`Construct`] impl.
    pub fn register_type<C: Construct>(&self) -> Registered<'_, C> {
        self.bind::<C>(synthesize::<C, C, _>(|instance| instance), std::any::type_name::<C>())
    }

    /// Registers the implementation `C` for the contract `I`.
    ///
    /// `upcast` converts the constructed value to the contract, normally a
    /// plain unsizing coercion:
    ///
    /// ```
    /// use picnic_ioc::{constructor, Container, Resolver};
    /// use std::sync::Arc;
    ///
    /// trait Clock: Send + Sync {
    ///     fn now(&self) -> u64;
    /// }
    ///
    /// #[derive(Default)]
    /// struct FixedClock;
    /// impl Clock for FixedClock {
    ///     fn now(&self) -> u64 {
    ///         42
    ///     }
    /// }
    ///
    /// constructor!(FixedClock => FixedClock::default);
    ///
    /// let container = Container::new();
    /// container.register_type_as::<dyn Clock, FixedClock, _>(|c| c as Arc<dyn Clock>);
    /// assert_eq!(container.resolve_required::<dyn Clock>().now(), 42);
    /// ```
    pub fn register_type_as<I, C, U>(&self, upcast: U) -> Registered<'_, I>
    where
        I: ?Sized + Send + Sync + 'static,
        C: Construct,
        U: Fn(Arc<C>) -> Arc<I> + Send + Sync + 'static,
    {
        self.bind::<I>(synthesize::<I, C, U>(upcast), std::any::type_name::<C>())
    }

    /// Whether a binding exists for `I`.
    pub fn contains<I: ?Sized + 'static>(&self) -> bool {
        self.inner.registry.read().contains_key(&Key::of::<I>())
    }

    pub fn lifetime_of<I: ?Sized + 'static>(&self) -> Option<Lifetime> {
        self.inner.registry.read().get(&Key::of::<I>()).map(|binding| binding.lifetime)
    }

    /// Number of registered identities.
    pub fn len(&self) -> usize {
        self.inner.registry.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Creates a scope in which per-scope services are instantiated once.
    pub fn create_scope(&self) -> Scope {
        tracing::debug!("scope created");
        Scope::new(self)
    }

    /// Disposes every instance cached by the container.
    ///
    /// Disposal hooks run once, most recently created instance first.
    /// Calling this again does nothing; resolving afterwards fails with
    /// [`DiError::Disposed`]. Scopes are independent and are not disposed.
    pub fn dispose(&self) {
        self.inner.dispose();
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::Acquire)
    }

    /// Populates the explicit-inject members of `object`, then performs
    /// [`auto_inject_object`](Self::auto_inject_object) on it.
    ///
    /// A member whose dependency fails to resolve is left untouched. The
    /// remaining members are still assigned and the first error is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use picnic_ioc::{Container, Injectable, Injected, MetadataBuilder};
    /// use std::sync::Arc;
    ///
    /// #[derive(Default)]
    /// struct Label {
    ///     text: Injected<String>,
    ///     counter: Injected<u32>,
    /// }
    ///
    /// impl Injectable for Label {
    ///     fn describe(members: &mut MetadataBuilder<Self>) {
    ///         members.inject("text", |l| &l.text).auto_inject("counter", |l| &l.counter);
    ///     }
    /// }
    ///
    /// let container = Container::new();
    /// container.register_instance(Arc::new(String::from("score")));
    ///
    /// let label = Arc::new(Label::default());
    /// container.inject_object(&label).unwrap();
    /// assert_eq!(label.text.get().as_deref().map(String::as_str), Some("score"));
    /// assert!(label.counter.get().is_none());
    ///
    /// // Registering the auto-inject dependency later reaches the live object
    /// container.register_instance(Arc::new(7u32));
    /// assert_eq!(label.counter.get().as_deref(), Some(&7));
    /// ```
    pub fn inject_object<T: Injectable>(&self, object: &Arc<T>) -> DiResult<()> {
        let explicit = METADATA.explicit_members::<T>();
        let explicit = self.assign_members(&**object, &explicit);
        let auto = self.auto_inject_object(object);
        explicit.and(auto)
    }

    /// Populates the auto-inject members of `object` and records it as a
    /// dependent of each member's identity, so any later registration of
    /// that identity injects `object` again.
    ///
    /// Members whose dependency is not registered are set to `None`. A
    /// member whose dependency fails to resolve keeps its value and is still
    /// tracked; the first such error is returned once every member was tried.
    pub fn auto_inject_object<T: Injectable>(&self, object: &Arc<T>) -> DiResult<()> {
        let auto = METADATA.auto_members::<T>();
        for member in auto.iter() {
            self.inner.tracker.track(member.dependency(), object);
        }
        self.assign_members(&**object, &auto)
    }

    /// Re-injects every live object that was auto-injected with `D`.
    ///
    /// Every dependent is visited even when some fail; the first error is
    /// returned.
    pub fn auto_inject_all<D: ?Sized + 'static>(&self) -> DiResult<()> {
        self.auto_inject_dependents(&Key::of::<D>())
    }

    /// Number of live objects currently tracked as dependents of `D`.
    pub fn injected_dependents<D: ?Sized + 'static>(&self) -> usize {
        self.inner.tracker.count(&Key::of::<D>())
    }

    fn bind<I: ?Sized + Send + Sync + 'static>(&self, factory: Factory, implementation: &'static str) -> Registered<'_, I> {
        let key = Key::of::<I>();
        let binding = Binding::new(factory, implementation);
        let id = binding.id;

        let replaced = self.inner.registry.write().insert(key, binding);
        tracing::debug!(
            service = key.display_name(),
            implementation,
            replaced = replaced.is_some(),
            "registered"
        );

        self.propagate_registration(&key);
        Registered::new(self, id)
    }

    /// Snapshot of the binding for `key`; the registry lock is released
    /// before the caller runs the factory.
    pub(crate) fn binding(&self, key: &Key) -> Option<Binding> {
        self.inner.registry.read().get(key).cloned()
    }

    pub(crate) fn binding_lifetime(&self, key: &Key, id: BindingId) -> Option<Lifetime> {
        self.inner
            .registry
            .read()
            .get(key)
            .filter(|binding| binding.id == id)
            .map(|binding| binding.lifetime)
    }

    /// Applies `update` to the binding `id` of `key`, if it is still current.
    pub(crate) fn update_binding(&self, key: &Key, id: BindingId, update: impl FnOnce(&mut Binding)) -> bool {
        let mut registry = self.inner.registry.write();
        match registry.current_mut(key, id) {
            Some(binding) => {
                update(binding);
                true
            }
            None => {
                tracing::warn!(service = key.display_name(), "registration was replaced, ignoring change");
                false
            }
        }
    }

    /// Re-injects dependents of `key` after its binding changed.
    ///
    /// Registration itself never fails, so errors here are logged.
    pub(crate) fn propagate_registration(&self, key: &Key) {
        if let Err(error) = self.auto_inject_dependents(key) {
            tracing::warn!(service = key.display_name(), %error, "auto-inject propagation failed");
        }
    }

    fn auto_inject_dependents(&self, key: &Key) -> DiResult<()> {
        let dependents = self.inner.tracker.live_dependents(key);
        if dependents.is_empty() {
            return Ok(());
        }

        tracing::debug!(service = key.display_name(), dependents = dependents.len(), "re-injecting dependents");
        let mut first_error = None;
        for dependent in dependents {
            let Some(members) = METADATA.auto_members_of(dependent.type_id) else {
                continue;
            };
            if let Err(error) = self.assign_members(&*dependent.object, &members) {
                tracing::warn!(
                    service = key.display_name(),
                    dependent = dependent.type_name,
                    %error,
                    "dependent could not be re-injected"
                );
                first_error.get_or_insert(error);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Assigns every member it can resolve and returns the first failure.
    fn assign_members(&self, object: &(dyn Any + Send + Sync), members: &[MemberInfo]) -> DiResult<()> {
        let mut first_error = None;
        for member in members {
            match self.resolve_any(&member.dependency()) {
                Ok(value) => member.assign(object, value.as_ref()),
                Err(error) => {
                    first_error.get_or_insert(error);
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Runs the binding's factory against `resolver`.
    pub(crate) fn create(resolver: &dyn ResolverCore, key: &Key, binding: &Binding) -> DiResult<AnyArc> {
        tracing::trace!(service = key.display_name(), implementation = binding.implementation, "constructing");
        (binding.factory)(&ResolverContext::new(resolver, key.display_name()))
    }

    /// Container-cached instance of a singleton binding, built against the
    /// container.
    pub(crate) fn get_or_create_singleton(&self, key: &Key, binding: &Binding) -> DiResult<AnyArc> {
        let cache_key = CacheKey {
            key: *key,
            binding: binding.id,
        };
        self.inner
            .singletons
            .get_or_create(cache_key, binding.disposer.as_ref(), || Self::create(self, key, binding))
    }

    fn check_alive(&self) -> DiResult<()> {
        if self.is_disposed() {
            return Err(DiError::Disposed("container"));
        }
        Ok(())
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolverCore for Container {
    fn resolve_any(&self, key: &Key) -> DiResult<Option<AnyArc>> {
        self.check_alive()?;
        let Some(binding) = self.binding(key) else {
            return Ok(None);
        };

        with_circular_catch(key.display_name(), self.inner.options.depth_limit(), || match binding.lifetime {
            Lifetime::Transient => Self::create(self, key, &binding),
            // Per-scope collapses to singleton outside a scope
            Lifetime::Singleton | Lifetime::PerScope => self.get_or_create_singleton(key, &binding),
        })
        .map(Some)
    }

    fn options(&self) -> &ContainerOptions {
        &self.inner.options
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("registrations", &self.len())
            .field("cached", &self.inner.singletons.len())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
