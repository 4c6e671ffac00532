//! Resolver context for factory functions.

use crate::config::ContainerOptions;
use crate::error::DiResult;
use crate::key::Key;
use crate::registration::AnyArc;
use crate::traits::ResolverCore;

/// Context passed to factory functions for resolving dependencies.
///
/// A context wraps the lifetime the current construction runs against: the
/// container for singletons, the resolving scope for per-scope and
/// transient bindings. Factories never see which one it is.
///
/// # Examples
///
/// ```
/// use picnic_ioc::{Container, Resolver};
/// use std::sync::Arc;
///
/// struct Database { url: String }
/// struct UserService { db: Arc<Database> }
///
/// let container = Container::new();
/// container
///     .register(|_| Arc::new(Database { url: "postgres://localhost".into() }))
///     .as_singleton();
/// container.register(|ctx| {
///     // ctx is a ResolverContext that provides access to other services
///     Arc::new(UserService { db: ctx.resolve_required::<Database>() })
/// });
///
/// let users = container.resolve_required::<UserService>();
/// assert_eq!(users.db.url, "postgres://localhost");
/// ```
pub struct ResolverContext<'a> {
    resolver: &'a dyn ResolverCore,
    consumer: &'static str,
}

impl<'a> ResolverContext<'a> {
    pub(crate) fn new(resolver: &'a dyn ResolverCore, consumer: &'static str) -> Self {
        Self { resolver, consumer }
    }

    /// Name of the service whose factory received this context.
    pub fn consumer_name(&self) -> &'static str {
        self.consumer
    }
}

impl ResolverCore for ResolverContext<'_> {
    fn resolve_any(&self, key: &Key) -> DiResult<Option<AnyArc>> {
        self.resolver.resolve_any(key)
    }

    fn options(&self) -> &ContainerOptions {
        self.resolver.options()
    }

    fn consumer(&self) -> Option<&'static str> {
        Some(self.consumer)
    }
}
