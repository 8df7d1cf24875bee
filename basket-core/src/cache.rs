//! Bounded FIFO cache for per-item metadata lookups.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

/// Fixed-capacity map evicting the oldest entry once full.
///
/// Identifiers are unbounded in principle, so the cache caps memory with
/// simple first-in-first-out eviction.
///
/// # Examples
///
/// ```
/// use basket_core::BoundedCache;
///
/// let mut cache = BoundedCache::new(2);
/// cache.insert(1, "a");
/// cache.insert(2, "b");
/// cache.insert(3, "c");
/// assert_eq!(cache.get(&1), None);
/// assert_eq!(cache.get(&3), Some("c"));
/// ```
#[derive(Debug)]
pub struct BoundedCache<K, V> {
    capacity: usize,
    order: VecDeque<K>,
    entries: HashMap<K, V>,
}

impl<K, V> BoundedCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates a cache holding at most `capacity` entries.
    ///
    /// A zero capacity disables caching entirely.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity),
            entries: HashMap::with_capacity(capacity),
        }
    }

    /// Returns a clone of the cached value for `key`, if present.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<V> {
        self.entries.get(key).cloned()
    }

    /// Stores `value` under `key`, evicting the oldest entry when full.
    ///
    /// Re-inserting an existing key refreshes the value but keeps its
    /// original insertion position.
    pub fn insert(&mut self, key: K, value: V) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.contains_key(&key) {
            self.entries.insert(key, value);
            return;
        }
        if self.entries.len() == self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
        self.order.push_back(key.clone());
        self.entries.insert(key, value);
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn size_never_exceeds_capacity() {
        let mut cache = BoundedCache::new(3);
        for key in 0..100 {
            cache.insert(key, key * 10);
        }
        assert_eq!(cache.len(), 3);
    }

    #[rstest]
    fn evicts_in_insertion_order() {
        let mut cache = BoundedCache::new(2);
        cache.insert("a", 1);
        cache.insert("b", 2);
        cache.insert("c", 3);
        assert_eq!(cache.get(&"a"), None);
        assert_eq!(cache.get(&"b"), Some(2));
        assert_eq!(cache.get(&"c"), Some(3));
    }

    #[rstest]
    fn reinsertion_refreshes_the_value() {
        let mut cache = BoundedCache::new(2);
        cache.insert("a", 1);
        cache.insert("a", 9);
        assert_eq!(cache.get(&"a"), Some(9));
        assert_eq!(cache.len(), 1);
    }

    #[rstest]
    fn zero_capacity_caches_nothing() {
        let mut cache = BoundedCache::new(0);
        cache.insert(1, 1);
        assert!(cache.is_empty());
        assert_eq!(cache.get(&1), None);
    }
}
