//! Injection metadata for already-constructed objects.
//!
//! Types opt in by implementing [`Injectable`], listing their injectable
//! members once through a [`MetadataBuilder`]. Each member is an
//! [`Injected<D>`] slot reached by a plain accessor function; the builder
//! turns it into a type-erased assignment closure. Embedded "base" structs
//! are flattened into the owner's list when the metadata is built, so
//! injection never walks a hierarchy at runtime.
//!
//! Metadata is memoized per concrete type for the life of the process, in
//! two independent tables: one for explicit-inject members and one for
//! auto-inject members.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::key::Key;
use crate::registration::{downcast, AnyArc};

type AssignFn = Arc<dyn Fn(&(dyn Any + Send + Sync), Option<&AnyArc>) + Send + Sync>;
pub(crate) type Members = Arc<[MemberInfo]>;

pub(crate) static METADATA: Lazy<TypeMetadataCache> = Lazy::new(TypeMetadataCache::default);

/// A member slot populated by the container.
///
/// Slots use interior mutability so an object can be injected, and later
/// re-injected, through a shared `Arc` handle.
///
/// # Examples
///
/// ```
/// use picnic_ioc::Injected;
/// use std::sync::Arc;
///
/// let slot: Injected<str> = Injected::new();
/// assert!(!slot.is_set());
/// slot.set(Some(Arc::from("ready")));
/// assert_eq!(slot.get().as_deref(), Some("ready"));
/// ```
pub struct Injected<D: ?Sized> {
    value: RwLock<Option<Arc<D>>>,
}

impl<D: ?Sized> Injected<D> {
    pub fn new() -> Self {
        Self {
            value: RwLock::new(None),
        }
    }

    /// Current value, `None` until a registration for `D` was available.
    pub fn get(&self) -> Option<Arc<D>> {
        self.value.read().clone()
    }

    pub fn is_set(&self) -> bool {
        self.value.read().is_some()
    }

    /// Overwrite the slot. The container assigns absent values too, so a
    /// member is cleared when its dependency is not registered.
    pub fn set(&self, value: Option<Arc<D>>) {
        *self.value.write() = value;
    }
}

impl<D: ?Sized> Default for Injected<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: ?Sized> fmt::Debug for Injected<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Injected")
            .field("dependency", &std::any::type_name::<D>())
            .field("set", &self.is_set())
            .finish()
    }
}

/// Which injection discipline a member belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InjectKind {
    /// Populated by `inject_object` only
    Explicit,
    /// Populated by `inject_object` and `auto_inject_object`, and
    /// re-populated whenever its dependency is registered again
    Auto,
}

/// One injectable member of a type.
#[derive(Clone)]
pub struct MemberInfo {
    name: &'static str,
    dependency: Key,
    kind: InjectKind,
    assign: AssignFn,
}

impl MemberInfo {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Identity resolved for this member.
    pub fn dependency(&self) -> Key {
        self.dependency
    }

    pub fn kind(&self) -> InjectKind {
        self.kind
    }

    /// Store `value` into this member of `object`.
    ///
    /// Objects of another type and values of another identity are ignored.
    pub(crate) fn assign(&self, object: &(dyn Any + Send + Sync), value: Option<&AnyArc>) {
        (self.assign)(object, value)
    }
}

impl fmt::Debug for MemberInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberInfo")
            .field("name", &self.name)
            .field("dependency", &self.dependency)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Types whose members the container can populate after construction.
///
/// # Examples
///
/// ```
/// use picnic_ioc::{type_metadata, Injectable, Injected, MetadataBuilder};
///
/// trait Clock: Send + Sync {}
/// trait Logger: Send + Sync {}
///
/// #[derive(Default)]
/// struct Panel {
///     clock: Injected<dyn Clock>,
/// }
///
/// impl Injectable for Panel {
///     fn describe(members: &mut MetadataBuilder<Self>) {
///         members.inject("clock", |p| &p.clock);
///     }
/// }
///
/// #[derive(Default)]
/// struct Widget {
///     logger: Injected<dyn Logger>,
///     panel: Panel,
/// }
///
/// impl Injectable for Widget {
///     fn describe(members: &mut MetadataBuilder<Self>) {
///         members.auto_inject("logger", |w| &w.logger).base(|w| &w.panel);
///     }
/// }
///
/// let meta = type_metadata::<Widget>();
/// assert_eq!(meta.explicit_members().iter().map(|m| m.name()).collect::<Vec<_>>(), ["clock"]);
/// assert_eq!(meta.auto_members().iter().map(|m| m.name()).collect::<Vec<_>>(), ["logger"]);
/// ```
pub trait Injectable: Sized + Send + Sync + 'static {
    /// List the type's injectable members, own members first, then bases.
    fn describe(members: &mut MetadataBuilder<Self>);
}

/// Collects the member table of `T`.
pub struct MetadataBuilder<T> {
    members: Vec<MemberInfo>,
    _owner: PhantomData<fn(&T)>,
}

impl<T: Injectable> MetadataBuilder<T> {
    fn new() -> Self {
        Self {
            members: Vec::new(),
            _owner: PhantomData,
        }
    }

    /// Add an explicit-inject member.
    pub fn inject<D>(&mut self, name: &'static str, field: fn(&T) -> &Injected<D>) -> &mut Self
    where
        D: ?Sized + Send + Sync + 'static,
    {
        self.member(name, InjectKind::Explicit, field)
    }

    /// Add an auto-inject member.
    pub fn auto_inject<D>(&mut self, name: &'static str, field: fn(&T) -> &Injected<D>) -> &mut Self
    where
        D: ?Sized + Send + Sync + 'static,
    {
        self.member(name, InjectKind::Auto, field)
    }

    /// Flatten the members of an embedded base struct into this type.
    pub fn base<B: Injectable>(&mut self, field: fn(&T) -> &B) -> &mut Self {
        let mut inner = MetadataBuilder::<B>::new();
        B::describe(&mut inner);

        for member in inner.members {
            let assign_base = member.assign.clone();
            let assign: AssignFn = Arc::new(move |object: &(dyn Any + Send + Sync), value: Option<&AnyArc>| {
                if let Some(owner) = object.downcast_ref::<T>() {
                    let base: &(dyn Any + Send + Sync) = field(owner);
                    assign_base(base, value);
                }
            });
            self.members.push(MemberInfo { assign, ..member });
        }
        self
    }

    fn member<D>(&mut self, name: &'static str, kind: InjectKind, field: fn(&T) -> &Injected<D>) -> &mut Self
    where
        D: ?Sized + Send + Sync + 'static,
    {
        let assign: AssignFn = Arc::new(move |object: &(dyn Any + Send + Sync), value: Option<&AnyArc>| {
            if let Some(owner) = object.downcast_ref::<T>() {
                field(owner).set(value.and_then(downcast::<D>));
            }
        });
        self.members.push(MemberInfo {
            name,
            dependency: Key::of::<D>(),
            kind,
            assign,
        });
        self
    }
}

/// Snapshot of a type's injection metadata.
#[derive(Debug, Clone)]
pub struct TypeMetadata {
    type_name: &'static str,
    explicit: Members,
    auto: Members,
}

impl TypeMetadata {
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn explicit_members(&self) -> &[MemberInfo] {
        &self.explicit
    }

    pub fn auto_members(&self) -> &[MemberInfo] {
        &self.auto
    }
}

/// Metadata of `T`, computed on first request and cached for the process.
pub fn type_metadata<T: Injectable>() -> TypeMetadata {
    TypeMetadata {
        type_name: std::any::type_name::<T>(),
        explicit: METADATA.explicit_members::<T>(),
        auto: METADATA.auto_members::<T>(),
    }
}

#[derive(Default)]
pub(crate) struct TypeMetadataCache {
    explicit: RwLock<HashMap<TypeId, Members>>,
    auto: RwLock<HashMap<TypeId, Members>>,
}

impl TypeMetadataCache {
    pub(crate) fn explicit_members<T: Injectable>(&self) -> Members {
        Self::memoize::<T>(&self.explicit, InjectKind::Explicit)
    }

    pub(crate) fn auto_members<T: Injectable>(&self) -> Members {
        Self::memoize::<T>(&self.auto, InjectKind::Auto)
    }

    /// Auto-inject members of an already-described type.
    pub(crate) fn auto_members_of(&self, type_id: TypeId) -> Option<Members> {
        self.auto.read().get(&type_id).cloned()
    }

    fn memoize<T: Injectable>(table: &RwLock<HashMap<TypeId, Members>>, kind: InjectKind) -> Members {
        let type_id = TypeId::of::<T>();
        if let Some(members) = table.read().get(&type_id) {
            return members.clone();
        }

        // Built outside the lock; a racing builder produces the same table
        let mut builder = MetadataBuilder::<T>::new();
        T::describe(&mut builder);
        let members: Members = builder
            .members
            .into_iter()
            .filter(|member| member.kind == kind)
            .collect();

        table.write().entry(type_id).or_insert(members).clone()
    }
}
