use picnic_ioc::{Container, DiError, Resolver};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

#[derive(Debug)]
struct RequestContext {
    id: String,
}

fn counting_container() -> Container {
    let counter = Arc::new(AtomicU32::new(0));
    let container = Container::new();
    container
        .register(move |_| {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            Arc::new(RequestContext { id: format!("req-{}", n) })
        })
        .per_scope();
    container
}

#[test]
fn test_per_scope_lifetime() {
    let container = counting_container();

    let scope1 = container.create_scope();
    let scope2 = container.create_scope();

    let ctx1a = scope1.resolve_required::<RequestContext>();
    let ctx1b = scope1.resolve_required::<RequestContext>();
    let ctx2a = scope2.resolve_required::<RequestContext>();
    let ctx2b = scope2.resolve_required::<RequestContext>();

    // Same instance within same scope
    assert!(Arc::ptr_eq(&ctx1a, &ctx1b));
    assert!(Arc::ptr_eq(&ctx2a, &ctx2b));

    // Different instances across scopes
    assert!(!Arc::ptr_eq(&ctx1a, &ctx2a));
    assert_eq!(ctx1a.id, "req-1");
    assert_eq!(ctx2a.id, "req-2");
}

#[test]
fn test_scope_does_not_share_with_container() {
    let container = counting_container();
    let scope = container.create_scope();

    let from_scope = scope.resolve_required::<RequestContext>();
    let from_container = container.resolve_required::<RequestContext>();
    assert!(!Arc::ptr_eq(&from_scope, &from_container));
}

#[test]
fn test_singletons_are_shared_across_scopes() {
    let container = Container::new();
    container.register(|_| Arc::new(String::from("config"))).as_singleton();

    let scope1 = container.create_scope();
    let scope2 = container.create_scope();

    let a = scope1.resolve_required::<String>();
    let b = scope2.resolve_required::<String>();
    let c = container.resolve_required::<String>();
    assert!(Arc::ptr_eq(&a, &b));
    assert!(Arc::ptr_eq(&a, &c));
}

#[test]
fn test_transient_in_scope_gets_scoped_dependency() {
    struct Session;
    struct Handler {
        session: Arc<Session>,
    }

    let container = Container::new();
    container.register(|_| Arc::new(Session)).per_scope();
    container.register(|ctx| Arc::new(Handler { session: ctx.resolve_required::<Session>() }));

    let scope = container.create_scope();
    let h1 = scope.resolve_required::<Handler>();
    let h2 = scope.resolve_required::<Handler>();

    assert!(!Arc::ptr_eq(&h1, &h2));
    assert!(Arc::ptr_eq(&h1.session, &h2.session));
}

#[test]
fn test_singleton_dependencies_resolve_against_container() {
    struct Session;
    struct Pool {
        session: Arc<Session>,
    }

    let container = Container::new();
    container.register(|_| Arc::new(Session)).per_scope();
    container
        .register(|ctx| Arc::new(Pool { session: ctx.resolve_required::<Session>() }))
        .as_singleton();

    let scope = container.create_scope();
    let pool = scope.resolve_required::<Pool>();
    let scoped_session = scope.resolve_required::<Session>();

    // The singleton was built against the container, which owns its own
    // per-scope instance
    assert!(!Arc::ptr_eq(&pool.session, &scoped_session));
    assert!(Arc::ptr_eq(&pool.session, &container.resolve_required::<Session>()));
}

#[test]
fn test_scope_sees_later_registrations() {
    let container = Container::new();
    let scope = container.create_scope();
    assert!(scope.resolve::<u32>().is_none());

    container.register(|_| Arc::new(7u32));
    assert_eq!(*scope.resolve_required::<u32>(), 7);
}

#[test]
fn test_disposed_scope_rejects_resolution() {
    let container = counting_container();
    let scope = container.create_scope();
    scope.resolve_required::<RequestContext>();

    scope.dispose();
    assert!(scope.is_disposed());
    assert_eq!(scope.try_resolve::<RequestContext>().err(), Some(DiError::Disposed("scope")));

    // The container is unaffected
    assert!(container.resolve::<RequestContext>().is_some());
}

#[test]
#[should_panic(expected = "disposed scope")]
fn test_resolve_on_disposed_scope_panics() {
    let container = counting_container();
    let scope = container.create_scope();
    scope.dispose();
    let _ = scope.resolve::<RequestContext>();
}

#[test]
fn test_scope_reports_disposed_container() {
    let container = counting_container();
    let scope = container.create_scope();
    container.dispose();
    assert_eq!(scope.try_resolve::<RequestContext>().err(), Some(DiError::Disposed("container")));
}

#[test]
fn test_scope_does_not_keep_container_alive() {
    let container = counting_container();
    let scope = container.create_scope();
    assert!(scope.container().is_some());

    drop(container);
    assert!(scope.container().is_none());
    assert_eq!(scope.try_resolve::<RequestContext>().err(), Some(DiError::Disposed("container")));
}
