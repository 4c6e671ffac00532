//! Service identity keys for the container.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identity of a service contract.
///
/// A key is the sole lookup handle in the factory table and in every
/// lifetime cache. It wraps the `TypeId` of the contract, which may be a
/// concrete type or an unsized trait object such as `dyn Logger`, together
/// with the contract's type name for diagnostics.
///
/// Two keys are equal exactly when their `TypeId`s are equal; the name
/// never takes part in comparison or hashing.
///
/// # Examples
///
/// ```rust
/// use picnic_ioc::{key_of, Key};
///
/// trait Clock: Send + Sync {}
///
/// let a = key_of::<dyn Clock>();
/// let b = Key::of::<dyn Clock>();
/// assert_eq!(a, b);
/// assert!(a.display_name().ends_with("Clock"));
/// assert_ne!(key_of::<u32>(), key_of::<u64>());
/// ```
#[derive(Clone, Copy)]
pub struct Key {
    id: TypeId,
    name: &'static str,
}

impl Key {
    /// Key for the contract `T`.
    #[inline(always)]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The `TypeId` of the contract.
    #[inline(always)]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Human-readable contract name, the `std::any::type_name` result.
    pub fn display_name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for Key {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Key {}

impl Hash for Key {
    #[inline(always)]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({})", self.name)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Helper for building keys.
#[inline(always)]
pub fn key_of<T: ?Sized + 'static>() -> Key {
    Key::of::<T>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    trait Marker {}

    #[test]
    fn keys_compare_by_type_only() {
        let a = key_of::<String>();
        let b = Key::of::<String>();
        assert_eq!(a, b);
        assert_ne!(a, key_of::<&'static str>());
    }

    #[test]
    fn trait_object_keys_are_hashable() {
        let mut set = HashSet::new();
        set.insert(key_of::<dyn Marker>());
        set.insert(key_of::<dyn Marker>());
        set.insert(key_of::<dyn Marker + Send>());
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn debug_shows_name() {
        let key = key_of::<u8>();
        assert_eq!(format!("{:?}", key), "Key(u8)");
        assert_eq!(key.to_string(), "u8");
    }
}
