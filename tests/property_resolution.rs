/// Property-based tests for service resolution
///
/// These tests verify that lifetime routing follows the same rules
/// regardless of the values registered or the order of operations.

use picnic_ioc::{Container, Lifetime, Resolver};
use proptest::prelude::*;
use std::sync::Arc;

#[derive(Debug)]
struct ServiceA {
    value: String,
}

fn lifetime_strategy() -> impl Strategy<Value = Lifetime> {
    prop_oneof![
        Just(Lifetime::Transient),
        Just(Lifetime::Singleton),
        Just(Lifetime::PerScope),
    ]
}

fn register_with(container: &Container, value: String, lifetime: Lifetime) {
    let handle = container.register(move |_| Arc::new(ServiceA { value: value.clone() }));
    match lifetime {
        Lifetime::Transient => handle.transient(),
        Lifetime::Singleton => handle.as_singleton(),
        Lifetime::PerScope => handle.per_scope(),
    };
}

proptest! {
    #[test]
    fn resolution_preserves_value(value in "\\PC{0,50}", lifetime in lifetime_strategy()) {
        let container = Container::new();
        register_with(&container, value.clone(), lifetime);

        let scope = container.create_scope();
        prop_assert_eq!(&container.resolve_required::<ServiceA>().value, &value);
        prop_assert_eq!(&scope.resolve_required::<ServiceA>().value, &value);
    }
}

proptest! {
    #[test]
    fn sharing_follows_lifetime(lifetime in lifetime_strategy()) {
        let container = Container::new();
        register_with(&container, "x".to_string(), lifetime);

        let scope1 = container.create_scope();
        let scope2 = container.create_scope();

        let root1 = container.resolve_required::<ServiceA>();
        let root2 = container.resolve_required::<ServiceA>();
        let s1a = scope1.resolve_required::<ServiceA>();
        let s1b = scope1.resolve_required::<ServiceA>();
        let s2 = scope2.resolve_required::<ServiceA>();

        prop_assert_eq!(Arc::ptr_eq(&root1, &root2), lifetime.is_cached());
        prop_assert_eq!(Arc::ptr_eq(&s1a, &s1b), lifetime.is_cached());
        prop_assert_eq!(Arc::ptr_eq(&s1a, &s2), lifetime == Lifetime::Singleton);
        prop_assert_eq!(Arc::ptr_eq(&root1, &s1a), lifetime == Lifetime::Singleton);
    }
}

proptest! {
    #[test]
    fn last_promotion_wins(lifetimes in prop::collection::vec(lifetime_strategy(), 1..8)) {
        let container = Container::new();
        let mut handle = container.register(|_| Arc::new(ServiceA { value: String::new() }));
        for lifetime in &lifetimes {
            handle = match lifetime {
                Lifetime::Transient => handle.transient(),
                Lifetime::Singleton => handle.as_singleton(),
                Lifetime::PerScope => handle.per_scope(),
            };
        }
        prop_assert_eq!(container.lifetime_of::<ServiceA>(), lifetimes.last().copied());
    }
}

proptest! {
    #[test]
    fn optional_resolution_matches_registration(register in any::<bool>()) {
        let container = Container::new();
        if register {
            container.register_instance(Arc::new(42u64));
        }

        prop_assert_eq!(container.resolve::<u64>().is_some(), register);
        prop_assert_eq!(container.contains::<u64>(), register);
        prop_assert_eq!(container.create_scope().resolve::<u64>().is_some(), register);
    }
}
