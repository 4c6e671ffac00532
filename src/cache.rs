//! Memoizing instance cache owned by every lifetime.
//!
//! Each cache slot is a `OnceCell`, so concurrent first resolution of the
//! same key runs the factory exactly once: the first caller initializes the
//! cell while later callers block on that one cell only. The table lock is
//! held just long enough to fetch or create the slot and is never held while
//! a factory runs, so slow factories for different keys proceed in parallel
//! and a factory may itself resolve other cached services.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::Mutex;

use crate::error::DiResult;
use crate::key::Key;
use crate::registration::{AnyArc, BindingId, DisposeFn};

type Slot = Arc<OnceCell<AnyArc>>;

/// Cache key: service identity plus the binding that produced the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct CacheKey {
    pub(crate) key: Key,
    pub(crate) binding: BindingId,
}

/// A value this cache created and therefore owns.
struct Owned {
    name: &'static str,
    value: AnyArc,
    disposer: Option<DisposeFn>,
}

pub(crate) struct ObjectCache {
    slots: Mutex<HashMap<CacheKey, Slot>>,
    // Creation order; released in reverse
    owned: Mutex<Vec<Owned>>,
}

impl ObjectCache {
    pub(crate) fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            owned: Mutex::new(Vec::new()),
        }
    }

    /// Returns the cached value for `key`, creating it with `create` on first use.
    ///
    /// If `create` fails the slot stays empty and a later call retries.
    pub(crate) fn get_or_create<F>(
        &self,
        key: CacheKey,
        disposer: Option<&DisposeFn>,
        create: F,
    ) -> DiResult<AnyArc>
    where
        F: FnOnce() -> DiResult<AnyArc>,
    {
        let slot = {
            let mut slots = self.slots.lock();
            slots.entry(key).or_default().clone()
        };

        if let Some(value) = slot.get() {
            tracing::trace!(service = key.key.display_name(), "cache hit");
            return Ok(value.clone());
        }

        let mut created = false;
        let value = slot
            .get_or_try_init(|| {
                tracing::trace!(service = key.key.display_name(), "cache miss, constructing");
                let value = create()?;
                created = true;
                Ok::<_, crate::error::DiError>(value)
            })?
            .clone();

        if created {
            self.owned.lock().push(Owned {
                name: key.key.display_name(),
                value: value.clone(),
                disposer: disposer.cloned(),
            });
        }

        Ok(value)
    }

    /// Number of values created by this cache and not yet released.
    pub(crate) fn len(&self) -> usize {
        self.owned.lock().len()
    }

    /// Release every owned value, most recently created first.
    ///
    /// Disposal hooks run outside the cache locks. Returns how many values
    /// were released.
    pub(crate) fn dispose(&self) -> usize {
        let owned = std::mem::take(&mut *self.owned.lock());
        self.slots.lock().clear();

        let released = owned.len();
        for entry in owned.into_iter().rev() {
            if let Some(dispose) = &entry.disposer {
                tracing::debug!(service = entry.name, "disposing");
                dispose(&entry.value);
            }
        }
        released
    }
}

impl Default for ObjectCache {
    fn default() -> Self {
        Self::new()
    }
}
