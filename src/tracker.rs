//! Records which objects were auto-injected with which dependency.
//!
//! Entries hold weak references: tracking an object never keeps it alive,
//! and entries whose object is gone are pruned whenever a dependency's
//! set is read.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::key::Key;

type ObjectAddr = usize;

struct TrackedObject {
    object: Weak<dyn Any + Send + Sync>,
    type_id: TypeId,
    type_name: &'static str,
}

/// A live dependent returned by [`AutoInjectTracker::live_dependents`].
pub(crate) struct Dependent {
    pub(crate) object: Arc<dyn Any + Send + Sync>,
    /// Concrete type of `object`, used to look up its metadata
    pub(crate) type_id: TypeId,
    pub(crate) type_name: &'static str,
}

#[derive(Default)]
pub(crate) struct AutoInjectTracker {
    by_dependency: Mutex<HashMap<Key, HashMap<ObjectAddr, TrackedObject>>>,
}

impl AutoInjectTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Record `object` as a dependent of `dependency`. Idempotent per object.
    pub(crate) fn track<T: Send + Sync + 'static>(&self, dependency: Key, object: &Arc<T>) {
        let addr = Arc::as_ptr(object) as *const () as ObjectAddr;
        let weak: Weak<T> = Arc::downgrade(object);
        let weak: Weak<dyn Any + Send + Sync> = weak;

        let mut table = self.by_dependency.lock();
        let dependents = table.entry(dependency).or_default();
        // A dead entry at this address belongs to a freed object
        let stale = dependents
            .get(&addr)
            .map_or(true, |tracked| tracked.object.strong_count() == 0);
        if stale {
            dependents.insert(
                addr,
                TrackedObject {
                    object: weak,
                    type_id: TypeId::of::<T>(),
                    type_name: std::any::type_name::<T>(),
                },
            );
        }
    }

    /// Snapshot of the live objects tracked for `dependency`.
    ///
    /// The snapshot is taken under the lock and returned as strong handles,
    /// so callers may reinject without holding it.
    pub(crate) fn live_dependents(&self, dependency: &Key) -> Vec<Dependent> {
        let mut table = self.by_dependency.lock();
        let Some(dependents) = table.get_mut(dependency) else {
            return Vec::new();
        };

        dependents.retain(|_, tracked| tracked.object.strong_count() > 0);
        let live = dependents
            .values()
            .filter_map(|tracked| {
                tracked.object.upgrade().map(|object| Dependent {
                    object,
                    type_id: tracked.type_id,
                    type_name: tracked.type_name,
                })
            })
            .collect();

        if dependents.is_empty() {
            table.remove(dependency);
        }
        live
    }

    /// Number of live objects tracked for `dependency`.
    pub(crate) fn count(&self, dependency: &Key) -> usize {
        self.by_dependency
            .lock()
            .get(dependency)
            .map_or(0, |dependents| {
                dependents
                    .values()
                    .filter(|tracked| tracked.object.strong_count() > 0)
                    .count()
            })
    }

    pub(crate) fn clear(&self) {
        self.by_dependency.lock().clear();
    }
}
