use picnic_ioc::{Container, DiError, Dispose, Resolver};
use std::sync::{Arc, Mutex};

struct Tracked {
    name: &'static str,
    log: Arc<Mutex<Vec<&'static str>>>,
}

impl Dispose for Tracked {
    fn dispose(&self) {
        self.log.lock().unwrap().push(self.name);
    }
}

struct First(Tracked);
struct Second(Tracked);
struct Third(Tracked);

impl Dispose for First {
    fn dispose(&self) {
        self.0.dispose();
    }
}

impl Dispose for Second {
    fn dispose(&self) {
        self.0.dispose();
    }
}

impl Dispose for Third {
    fn dispose(&self) {
        self.0.dispose();
    }
}

fn tracked(name: &'static str, log: &Arc<Mutex<Vec<&'static str>>>) -> Tracked {
    Tracked { name, log: log.clone() }
}

#[test]
fn test_container_disposes_singletons_in_reverse_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let container = Container::new();

    let l = log.clone();
    container.register(move |_| Arc::new(First(tracked("first", &l)))).as_singleton().disposable();
    let l = log.clone();
    container.register(move |_| Arc::new(Second(tracked("second", &l)))).as_singleton().disposable();
    let l = log.clone();
    container.register(move |_| Arc::new(Third(tracked("third", &l)))).as_singleton().disposable();

    container.resolve_required::<First>();
    container.resolve_required::<Second>();
    container.resolve_required::<Third>();

    container.dispose();
    assert_eq!(*log.lock().unwrap(), vec!["third", "second", "first"]);

    // Idempotent
    container.dispose();
    assert_eq!(log.lock().unwrap().len(), 3);
}

#[test]
fn test_scope_disposes_only_its_instances() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let container = Container::new();

    let l = log.clone();
    container.register(move |_| Arc::new(First(tracked("singleton", &l)))).as_singleton().disposable();
    let l = log.clone();
    container.register(move |_| Arc::new(Second(tracked("scoped", &l)))).per_scope().disposable();

    {
        let scope = container.create_scope();
        scope.resolve_required::<First>();
        scope.resolve_required::<Second>();
        scope.dispose();
        assert_eq!(*log.lock().unwrap(), vec!["scoped"]);
    }

    container.dispose();
    assert_eq!(*log.lock().unwrap(), vec!["scoped", "singleton"]);
}

#[test]
fn test_scope_disposes_on_drop() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let container = Container::new();
    let l = log.clone();
    container.register(move |_| Arc::new(First(tracked("scoped", &l)))).per_scope().disposable();

    {
        let scope = container.create_scope();
        scope.resolve_required::<First>();
    }
    assert_eq!(*log.lock().unwrap(), vec!["scoped"]);
}

#[test]
fn test_container_disposes_on_last_drop() {
    let log = Arc::new(Mutex::new(Vec::new()));
    {
        let container = Container::new();
        let l = log.clone();
        container.register(move |_| Arc::new(First(tracked("root", &l)))).as_singleton().disposable();
        container.resolve_required::<First>();

        let clone = container.clone();
        drop(container);
        assert!(log.lock().unwrap().is_empty());
        drop(clone);
    }
    assert_eq!(*log.lock().unwrap(), vec!["root"]);
}

#[test]
fn test_transients_are_never_disposed() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let container = Container::new();
    let l = log.clone();
    container.register(move |_| Arc::new(First(tracked("transient", &l)))).disposable();

    let scope = container.create_scope();
    scope.resolve_required::<First>();
    container.resolve_required::<First>();
    scope.dispose();
    container.dispose();

    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn test_unresolved_singletons_are_not_disposed() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let container = Container::new();
    let l = log.clone();
    container.register(move |_| Arc::new(First(tracked("lazy", &l)))).as_singleton().disposable();

    container.dispose();
    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn test_replaced_singleton_is_still_released() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let container = Container::new();

    let l = log.clone();
    container.register(move |_| Arc::new(First(tracked("old", &l)))).as_singleton().disposable();
    container.resolve_required::<First>();

    let l = log.clone();
    container.register(move |_| Arc::new(First(tracked("new", &l)))).as_singleton().disposable();
    container.resolve_required::<First>();

    container.dispose();
    assert_eq!(*log.lock().unwrap(), vec!["new", "old"]);
}

#[test]
fn test_disposed_container_rejects_resolution() {
    let container = Container::new();
    container.register(|_| Arc::new(1u8));
    container.dispose();

    assert!(container.is_disposed());
    assert_eq!(container.try_resolve::<u8>().err(), Some(DiError::Disposed("container")));
}

#[test]
fn test_trait_contract_disposal() {
    trait Connection: Dispose {}

    struct Pooled(Tracked);
    impl Dispose for Pooled {
        fn dispose(&self) {
            self.0.dispose();
        }
    }
    impl Connection for Pooled {}

    let log = Arc::new(Mutex::new(Vec::new()));
    let container = Container::new();
    let l = log.clone();
    container
        .register::<dyn Connection, _>(move |_| Arc::new(Pooled(tracked("conn", &l))))
        .per_scope()
        .disposable();

    let scope = container.create_scope();
    scope.resolve_required::<dyn Connection>();
    drop(scope);
    assert_eq!(*log.lock().unwrap(), vec!["conn"]);
}

#[test]
fn test_registered_instance_is_disposed_when_cached() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let container = Container::new();
    container
        .register_instance(Arc::new(First(tracked("instance", &log))))
        .as_singleton()
        .disposable();

    container.resolve_required::<First>();
    container.dispose();
    assert_eq!(*log.lock().unwrap(), vec!["instance"]);
}

#[test]
fn test_live_scope_does_not_delay_container_disposal() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let container = Container::new();
    let l = log.clone();
    container.register(move |_| Arc::new(First(tracked("root", &l)))).as_singleton().disposable();

    let scope = container.create_scope();
    scope.resolve_required::<First>();

    drop(container);
    assert_eq!(*log.lock().unwrap(), vec!["root"]);
    assert_eq!(scope.try_resolve::<First>().err(), Some(DiError::Disposed("container")));
}
