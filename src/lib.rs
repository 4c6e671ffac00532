//! # picnic-ioc
//!
//! A small inversion-of-control container: register factories per service
//! identity, resolve them under singleton, per-scope, or transient lifetimes,
//! and inject dependencies into objects the container did not create.
//!
//! ## Features
//!
//! - **Lifetimes**: Singleton, PerScope, and Transient bindings, promoted
//!   through the handle returned at registration
//! - **Trait contracts**: register and resolve `dyn Trait` identities
//! - **Thread-safe**: concurrent first resolution constructs a cached
//!   service exactly once
//! - **Member injection**: explicit and auto-inject members, with auto-inject
//!   dependents refreshed whenever their dependency is registered again
//! - **Circular dependency detection**: reported with the full path
//!
//! ## Quick Start
//!
//! ```rust
//! use picnic_ioc::{Container, Resolver};
//! use std::sync::Arc;
//!
//! struct Database {
//!     connection_string: String,
//! }
//!
//! struct UserService {
//!     db: Arc<Database>,
//! }
//!
//! let container = Container::new();
//! container
//!     .register(|_| {
//!         Arc::new(Database {
//!             connection_string: "postgres://localhost".to_string(),
//!         })
//!     })
//!     .as_singleton();
//! container.register(|ctx| Arc::new(UserService { db: ctx.resolve_required::<Database>() }));
//!
//! let user_service = container.resolve_required::<UserService>();
//! assert_eq!(user_service.db.connection_string, "postgres://localhost");
//! ```
//!
//! ## Lifetimes
//!
//! - **Singleton**: created once per container and shared by every scope
//! - **PerScope**: created once per [`Scope`]; resolved from the container
//!   directly it behaves as a singleton
//! - **Transient**: created fresh on every resolution
//!
//! ## Injection into existing objects
//!
//! ```rust
//! use picnic_ioc::{Container, Injectable, Injected, MetadataBuilder};
//! use std::sync::Arc;
//!
//! trait Logger: Send + Sync {
//!     fn name(&self) -> &'static str;
//! }
//!
//! struct Console;
//! impl Logger for Console {
//!     fn name(&self) -> &'static str {
//!         "console"
//!     }
//! }
//!
//! #[derive(Default)]
//! struct Widget {
//!     logger: Injected<dyn Logger>,
//! }
//!
//! impl Injectable for Widget {
//!     fn describe(members: &mut MetadataBuilder<Self>) {
//!         members.auto_inject("logger", |w| &w.logger);
//!     }
//! }
//!
//! let container = Container::new();
//! let widget = Arc::new(Widget::default());
//! container.auto_inject_object(&widget).unwrap();
//! assert!(widget.logger.get().is_none());
//!
//! container.register::<dyn Logger, _>(|_| Arc::new(Console));
//! assert_eq!(widget.logger.get().map(|l| l.name()), Some("console"));
//! ```

pub mod config;
pub mod construct;
pub mod container;
pub mod error;
pub mod key;
pub mod lifetime;
pub mod metadata;
pub mod traits;

// Internal modules
mod cache;
mod internal;
mod registration;
mod tracker;

pub use config::ContainerOptions;
pub use construct::Construct;
pub use container::{Container, Registered, ResolverContext, Scope};
pub use error::{DiError, DiResult};
pub use internal::ResolutionPanic;
pub use key::{key_of, Key};
pub use lifetime::Lifetime;
pub use metadata::{type_metadata, InjectKind, Injectable, Injected, MemberInfo, MetadataBuilder, TypeMetadata};
pub use registration::AnyArc;
pub use traits::{Dispose, Resolver, ResolverCore};
