//! Binding lifetimes.

/// Lifetime tag stored with every binding in the factory table.
///
/// The tag decides which cache, if any, a resolution is routed to. It is
/// chosen through the registration handle returned by `Container::register*`
/// and can be changed later; the last write wins.
///
/// # Examples
///
/// ```rust
/// use picnic_ioc::{Container, Lifetime, Resolver};
/// use std::sync::Arc;
///
/// struct Database { url: String }
/// struct Repository { db_url: String }
/// struct RequestModel { id: u32 }
///
/// let container = Container::new();
///
/// // Singleton: one instance for the whole container
/// container
///     .register::<Database, _>(|_| Arc::new(Database { url: "postgres://localhost".into() }))
///     .as_singleton();
///
/// // PerScope: one instance per scope
/// container
///     .register::<Repository, _>(|r| {
///         let db = r.resolve_required::<Database>();
///         Arc::new(Repository { db_url: db.url.clone() })
///     })
///     .per_scope();
///
/// // Transient: new instance every time
/// container.register::<RequestModel, _>(|_| Arc::new(RequestModel { id: 12345 }));
///
/// assert_eq!(container.lifetime_of::<Repository>(), Some(Lifetime::PerScope));
///
/// let db1 = container.resolve_required::<Database>();
/// let scope1 = container.create_scope();
/// let db2 = scope1.resolve_required::<Database>();
/// assert!(Arc::ptr_eq(&db1, &db2));
///
/// let repo1a = scope1.resolve_required::<Repository>();
/// let repo1b = scope1.resolve_required::<Repository>();
/// assert!(Arc::ptr_eq(&repo1a, &repo1b));
///
/// let scope2 = container.create_scope();
/// let repo2 = scope2.resolve_required::<Repository>();
/// assert!(!Arc::ptr_eq(&repo1a, &repo2));
///
/// let model1 = scope1.resolve_required::<RequestModel>();
/// let model2 = scope1.resolve_required::<RequestModel>();
/// assert!(!Arc::ptr_eq(&model1, &model2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Lifetime {
    /// New instance per resolution, never cached
    ///
    /// This is the lifetime of a fresh registration.
    #[default]
    Transient,
    /// Single instance per container, cached until the container is disposed
    ///
    /// Singleton instances always live in the container cache, even when the
    /// first resolution happens inside a scope.
    Singleton,
    /// Single instance per scope, cached for the scope's lifetime
    ///
    /// Resolved directly from the container (outside any scope) a per-scope
    /// binding behaves as a singleton.
    PerScope,
}

impl Lifetime {
    /// Whether resolutions under this lifetime are memoized somewhere.
    pub fn is_cached(self) -> bool {
        !matches!(self, Lifetime::Transient)
    }
}
