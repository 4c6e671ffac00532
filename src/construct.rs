//! Factory synthesis for registrations given only a type.
//!
//! A type registered with [`Container::register_type`](crate::Container::register_type)
//! must say how it is built by implementing [`Construct`]. The
//! [`constructor!`](crate::constructor) macro writes that impl for the common
//! case of one constructor function whose parameters are all dependencies:
//! each parameter is resolved against the calling lifetime and passed as
//! `Option<Arc<P>>`. A type with no `Construct` impl cannot be registered
//! this way at all.

use std::sync::Arc;

use crate::container::ResolverContext;
use crate::error::DiResult;
use crate::registration::{erase, AnyArc, Factory};

/// Types the container can build from their dependencies.
///
/// # Examples
///
/// ```
/// use picnic_ioc::{constructor, Container, Resolver};
/// use std::sync::Arc;
///
/// struct Config { name: &'static str }
///
/// struct Greeter { config: Option<Arc<Config>> }
///
/// impl Greeter {
///     fn new(config: Option<Arc<Config>>) -> Self {
///         Self { config }
///     }
/// }
///
/// constructor!(Greeter => Greeter::new; config: Config);
///
/// let container = Container::new();
/// container.register_instance(Arc::new(Config { name: "picnic" }));
/// container.register_type::<Greeter>();
///
/// let greeter = container.resolve_required::<Greeter>();
/// assert_eq!(greeter.config.as_ref().map(|c| c.name), Some("picnic"));
/// ```
pub trait Construct: Sized + Send + Sync + 'static {
    /// Build an instance, resolving dependencies through `ctx`.
    ///
    /// Use [`Resolver::dependency`](crate::Resolver::dependency) for each
    /// parameter so the container's strict-mode setting applies.
    fn construct(ctx: &ResolverContext<'_>) -> DiResult<Self>;
}

/// Implements [`Construct`] for a type from one constructor function.
///
/// ```text
/// constructor!(Type => path::to::ctor; param: Dependency, other: dyn Trait);
/// constructor!(Type => Type::default);
/// ```
///
/// Every parameter is received as `Option<Arc<Dependency>>`.
#[macro_export]
macro_rules! constructor {
    ($ty:ty => $ctor:path $(; $($param:ident : $dep:ty),* $(,)?)?) => {
        impl $crate::Construct for $ty {
            #[allow(unused_variables)]
            fn construct(ctx: &$crate::ResolverContext<'_>) -> $crate::DiResult<Self> {
                $($(
                    let $param = $crate::Resolver::dependency::<$dep>(ctx)?;
                )*)?
                Ok($ctor($($($param),*)?))
            }
        }
    };
}

/// Factory for `C` exposed as the contract `I`.
pub(crate) fn synthesize<I, C, U>(upcast: U) -> Factory
where
    I: ?Sized + Send + Sync + 'static,
    C: Construct,
    U: Fn(Arc<C>) -> Arc<I> + Send + Sync + 'static,
{
    Arc::new(move |ctx: &ResolverContext<'_>| -> DiResult<AnyArc> {
        let instance = C::construct(ctx)?;
        Ok(erase(upcast(Arc::new(instance))))
    })
}
