//! Resolver traits for service resolution.

use std::sync::Arc;

use crate::config::ContainerOptions;
use crate::error::{DiError, DiResult};
use crate::internal::raise;
use crate::key::Key;
use crate::registration::{downcast, AnyArc};

/// Core resolver trait for object-safe service resolution.
///
/// Implemented by the two lifetimes, [`Container`](crate::Container) and
/// [`Scope`](crate::Scope), and by the [`ResolverContext`](crate::ResolverContext)
/// handed to factories. Each decides where cached instances for the
/// resolved binding live.
///
/// Most users should use the [`Resolver`] trait instead, which provides
/// typed generic methods built on top of this trait.
pub trait ResolverCore: Send + Sync {
    /// Resolves `key` against this lifetime.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(AnyArc))` - The instance, wrapped as `Arc<dyn Any>`
    /// * `Ok(None)` - No binding is registered for `key`
    /// * `Err(DiError)` - Circular dependency, disposed lifetime, depth limit, ...
    fn resolve_any(&self, key: &Key) -> DiResult<Option<AnyArc>>;

    /// Options of the owning container.
    fn options(&self) -> &ContainerOptions;

    /// Name of the service currently being constructed, if any.
    fn consumer(&self) -> Option<&'static str> {
        None
    }
}

/// High-level resolver interface with generic methods for typed resolution.
///
/// # Examples
///
/// ```
/// use picnic_ioc::{Container, Resolver};
/// use std::sync::Arc;
///
/// trait Logger: Send + Sync {
///     fn log(&self, msg: &str) -> String;
/// }
///
/// struct ConsoleLogger;
/// impl Logger for ConsoleLogger {
///     fn log(&self, msg: &str) -> String {
///         format!("LOG: {}", msg)
///     }
/// }
///
/// let container = Container::new();
/// container.register_instance(Arc::new(42usize));
/// container.register::<dyn Logger, _>(|_| Arc::new(ConsoleLogger));
///
/// assert_eq!(*container.resolve_required::<usize>(), 42);
/// let logger = container.resolve_required::<dyn Logger>();
/// assert_eq!(logger.log("hi"), "LOG: hi");
///
/// // Unregistered services are absent, not an error
/// assert!(container.resolve::<String>().is_none());
/// ```
pub trait Resolver: ResolverCore {
    /// Resolves the contract `T`.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(Arc<T>))` - The resolved instance
    /// * `Ok(None)` - `T` is not registered
    /// * `Err(DiError)` - Resolution error
    fn try_resolve<T: ?Sized + Send + Sync + 'static>(&self) -> DiResult<Option<Arc<T>>> {
        let key = Key::of::<T>();
        match self.resolve_any(&key)? {
            Some(any) => downcast::<T>(&any)
                .map(Some)
                .ok_or(DiError::TypeMismatch(key.display_name())),
            None => Ok(None),
        }
    }

    /// Resolves `T`, yielding `None` when it is not registered.
    ///
    /// # Panics
    ///
    /// Panics on programming errors: circular dependencies, a disposed
    /// lifetime, or an exceeded depth limit. Inside a factory the panic is
    /// reported to the enclosing `try_resolve` as the underlying error.
    fn resolve<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.try_resolve::<T>().unwrap_or_else(|e| raise(e))
    }

    /// Resolves `T`, panicking when it is not registered.
    ///
    /// Use this from factories when the dependency is mandatory; the failure
    /// then surfaces as `DiError::Unresolved` from an enclosing `try_resolve`.
    ///
    /// # Examples
    ///
    /// ```
    /// use picnic_ioc::{Container, Resolver};
    /// use std::sync::Arc;
    ///
    /// let container = Container::new();
    /// container.register_instance(Arc::new(42usize));
    /// assert_eq!(*container.resolve_required::<usize>(), 42);
    /// ```
    fn resolve_required<T: ?Sized + Send + Sync + 'static>(&self) -> Arc<T> {
        match self.resolve::<T>() {
            Some(value) => value,
            None => raise(DiError::Unresolved {
                dependency: std::any::type_name::<T>(),
                consumer: self.consumer().unwrap_or("caller"),
            }),
        }
    }

    /// Untyped resolution by key.
    fn get_service(&self, key: &Key) -> Option<AnyArc> {
        self.resolve_any(key).unwrap_or_else(|e| raise(e))
    }

    /// Resolves a constructor parameter.
    ///
    /// Permissive by default: an unregistered dependency is passed on as
    /// `None`. With [`ContainerOptions::strict`] the absence is an
    /// `DiError::Unresolved` error instead.
    fn dependency<T: ?Sized + Send + Sync + 'static>(&self) -> DiResult<Option<Arc<T>>> {
        let value = self.try_resolve::<T>()?;
        if value.is_none() && self.options().is_strict() {
            let consumer = self.consumer().unwrap_or("caller");
            tracing::warn!(dependency = std::any::type_name::<T>(), consumer, "unresolved constructor dependency");
            return Err(DiError::Unresolved {
                dependency: std::any::type_name::<T>(),
                consumer,
            });
        }
        Ok(value)
    }
}

impl<R: ResolverCore + ?Sized> Resolver for R {}
