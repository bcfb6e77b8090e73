//! String interning for entity name pools.
//!
//! Uses `lasso::Rodeo` for interning during the store-build phase and
//! `lasso::RodeoReader` for contention-free reads afterwards. Keys are
//! dense and assigned in insertion order, so a key's `into_usize()` is
//! the entity's position along the matching tensor axis. Pools are
//! duplicate-free by construction.

use lasso::{Key, Rodeo, RodeoReader, Spur};

/// Mutable name pool used while a store is being built.
pub struct NamePool {
    inner: Rodeo,
}

impl NamePool {
    /// Create a new empty pool.
    pub fn new() -> Self {
        Self {
            inner: Rodeo::default(),
        }
    }

    /// Intern a name, returning its key. Re-interning a known name
    /// returns the original key.
    pub fn intern(&mut self, name: &str) -> Spur {
        self.inner.get_or_intern(name)
    }

    /// Look up a previously interned name without inserting.
    pub fn get(&self, name: &str) -> Option<Spur> {
        self.inner.get(name)
    }

    /// Resolve a key back to its name.
    pub fn resolve(&self, key: &Spur) -> &str {
        self.inner.resolve(key)
    }

    /// Number of distinct names in the pool.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true when the pool holds no names.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Freeze the pool into a read-only view. Insertion order is kept.
    pub fn into_frozen(self) -> FrozenNames {
        FrozenNames {
            inner: self.inner.into_reader(),
        }
    }
}

impl Default for NamePool {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only name pool. Cannot grow; this is enforced at the type level
/// (`RodeoReader` has no interning methods).
#[derive(Debug)]
pub struct FrozenNames {
    inner: RodeoReader,
}

impl FrozenNames {
    /// Look up a name's key.
    pub fn get(&self, name: &str) -> Option<Spur> {
        self.inner.get(name)
    }

    /// Resolve a key back to its name.
    pub fn resolve(&self, key: &Spur) -> &str {
        self.inner.resolve(key)
    }

    /// Returns true when the pool contains the name.
    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains(name)
    }

    /// Number of distinct names in the pool.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true when the pool holds no names.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Key for a dense pool index, if the index is in range.
    pub fn key_of_index(&self, index: usize) -> Option<Spur> {
        if index < self.inner.len() {
            Spur::try_from_usize(index)
        } else {
            None
        }
    }

    /// Resolve a dense pool index directly to its name.
    pub fn name_of_index(&self, index: usize) -> Option<&str> {
        self.key_of_index(index).map(|key| self.inner.resolve(&key))
    }

    /// Iterate `(key, name)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (Spur, &str)> {
        self.inner.iter()
    }
}
