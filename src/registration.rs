//! Service registration types.
//!
//! The registry is the canonical factory table: one [`Binding`] per service
//! identity. A binding pairs the factory with the lifetime tag it is routed
//! by, so promoting a registration to singleton or per-scope only rewrites
//! the tag; the factory itself is never re-wrapped.

use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::container::ResolverContext;
use crate::error::DiResult;
use crate::key::Key;
use crate::lifetime::Lifetime;

/// Type-erased instance as stored in caches and returned by `get_service`.
///
/// The payload is always an `Arc<I>` for the identity `I` it was resolved
/// under, which lets trait-object identities share the concrete path.
pub type AnyArc = Arc<dyn Any + Send + Sync>;

/// Erased factory: builds one instance against the calling lifetime.
pub(crate) type Factory = Arc<dyn for<'a> Fn(&ResolverContext<'a>) -> DiResult<AnyArc> + Send + Sync>;

/// Erased disposal hook for instances of one binding.
pub(crate) type DisposeFn = Arc<dyn Fn(&AnyArc) + Send + Sync>;

#[inline]
pub(crate) fn erase<T: ?Sized + Send + Sync + 'static>(value: Arc<T>) -> AnyArc {
    Arc::new(value)
}

#[inline]
pub(crate) fn downcast<T: ?Sized + Send + Sync + 'static>(any: &AnyArc) -> Option<Arc<T>> {
    any.downcast_ref::<Arc<T>>().cloned()
}

/// Identifier minted for every registration.
///
/// Caches are keyed by identity *and* binding id, so replacing a binding
/// never lets the new one observe an instance built by the old factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct BindingId(u64);

impl BindingId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        BindingId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// One entry of the factory table.
#[derive(Clone)]
pub(crate) struct Binding {
    pub(crate) id: BindingId,
    pub(crate) lifetime: Lifetime,
    pub(crate) factory: Factory,
    pub(crate) disposer: Option<DisposeFn>,
    /// Implementation type name for diagnostics
    pub(crate) implementation: &'static str,
}

impl Binding {
    pub(crate) fn new(factory: Factory, implementation: &'static str) -> Self {
        Self {
            id: BindingId::next(),
            lifetime: Lifetime::Transient,
            factory,
            disposer: None,
            implementation,
        }
    }
}

/// Factory table keyed by service identity.
#[derive(Default)]
pub(crate) struct Registry {
    bindings: HashMap<Key, Binding>,
}

impl Registry {
    /// Install `binding`, replacing any previous binding for `key`.
    pub(crate) fn insert(&mut self, key: Key, binding: Binding) -> Option<Binding> {
        self.bindings.insert(key, binding)
    }

    #[inline(always)]
    pub(crate) fn get(&self, key: &Key) -> Option<&Binding> {
        self.bindings.get(key)
    }

    /// Mutable access to the binding for `key`, only if it is still `id`.
    pub(crate) fn current_mut(&mut self, key: &Key, id: BindingId) -> Option<&mut Binding> {
        self.bindings.get_mut(key).filter(|binding| binding.id == id)
    }

    pub(crate) fn contains_key(&self, key: &Key) -> bool {
        self.bindings.contains_key(key)
    }

    pub(crate) fn len(&self) -> usize {
        self.bindings.len()
    }
}
