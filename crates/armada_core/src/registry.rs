//! Id-keyed storage for live entities.
//!
//! Every registry is a `HashMap` for O(1) lookup; deterministic iteration
//! goes through [`Registry::sorted_ids`]. Ids are allocated by the world's
//! shared counter, not by the registry, so no two registries ever hold the
//! same id.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::components::EntityId;

/// Storage for one kind of live entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry<T> {
    entries: HashMap<EntityId, T>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<T> Registry<T> {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry under an already allocated id.
    ///
    /// Returns the entry previously stored under `id`, if any.
    pub fn insert(&mut self, id: EntityId, value: T) -> Option<T> {
        self.entries.insert(id, value)
    }

    /// Remove an entry by id.
    pub fn remove(&mut self, id: EntityId) -> Option<T> {
        self.entries.remove(&id)
    }

    /// Get an entry by id.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.entries.get(&id)
    }

    /// Get a mutable reference to an entry by id.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        self.entries.get_mut(&id)
    }

    /// Check if an id is present.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get sorted ids for deterministic iteration.
    #[must_use]
    pub fn sorted_ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<_> = self.entries.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Iterate over entries in id order.
    pub fn iter_sorted(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.sorted_ids()
            .into_iter()
            .filter_map(move |id| self.entries.get(&id).map(|value| (id, value)))
    }

    /// Iterate over all entries (not in deterministic order).
    pub fn iter(&self) -> impl Iterator<Item = (&EntityId, &T)> {
        self.entries.iter()
    }
}

impl<T: Hash> Registry<T> {
    /// Feed every entry into `hasher` in id order.
    pub fn hash_sorted<H: Hasher>(&self, hasher: &mut H) {
        self.entries.len().hash(hasher);
        for (id, value) in self.iter_sorted() {
            id.hash(hasher);
            value.hash(hasher);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::hash_map::DefaultHasher;

    use super::*;

    #[test]
    fn test_sorted_ids_ignore_insertion_order() {
        let mut registry = Registry::new();
        registry.insert(7, "c");
        registry.insert(2, "a");
        registry.insert(5, "b");

        assert_eq!(registry.sorted_ids(), vec![2, 5, 7]);
        let values: Vec<_> = registry.iter_sorted().map(|(_, v)| *v).collect();
        assert_eq!(values, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_remove_and_contains() {
        let mut registry = Registry::new();
        registry.insert(1, 10_u32);
        assert!(registry.contains(1));
        assert_eq!(registry.remove(1), Some(10));
        assert!(!registry.contains(1));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_hash_is_order_independent() {
        let mut a = Registry::new();
        a.insert(1, 10_u32);
        a.insert(2, 20_u32);
        let mut b = Registry::new();
        b.insert(2, 20_u32);
        b.insert(1, 10_u32);

        let mut ha = DefaultHasher::new();
        let mut hb = DefaultHasher::new();
        a.hash_sorted(&mut ha);
        b.hash_sorted(&mut hb);
        assert_eq!(ha.finish(), hb.finish());
    }
}
