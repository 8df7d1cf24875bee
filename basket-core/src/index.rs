//! Bijective mapping between external identifiers and dense indices.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use serde::{Deserialize, Serialize};

/// Maps arbitrary external identifiers to contiguous 0-based indices.
///
/// Indices are assigned in first-seen order and remain stable for the
/// lifetime of one trained artifact. Every identifier maps to exactly one
/// index and back again.
///
/// # Examples
///
/// ```
/// use basket_core::IdIndex;
///
/// let mut index = IdIndex::new();
/// assert_eq!(index.insert(1001), 0);
/// assert_eq!(index.insert(1002), 1);
/// assert_eq!(index.insert(1001), 0);
/// assert_eq!(index.id_at(1), Some(1002));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdIndex {
    ids: Vec<i64>,
    positions: HashMap<i64, usize>,
}

impl IdIndex {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the index for `id`, assigning the next free slot on first
    /// sight.
    pub fn insert(&mut self, id: i64) -> usize {
        match self.positions.entry(id) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                let index = self.ids.len();
                self.ids.push(id);
                entry.insert(index);
                index
            }
        }
    }

    /// Returns the dense index previously assigned to `id`, if any.
    #[must_use]
    pub fn index_of(&self, id: i64) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    /// Returns the external identifier stored at `index`, if any.
    #[must_use]
    pub fn id_at(&self, index: usize) -> Option<i64> {
        self.ids.get(index).copied()
    }

    /// Number of mapped identifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Reports whether the mapping is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// All mapped identifiers in index order.
    #[must_use]
    pub fn ids(&self) -> &[i64] {
        &self.ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn assigns_indices_in_first_seen_order() {
        let mut index = IdIndex::new();
        for (expected, id) in [(0, 30), (1, 10), (2, 20)] {
            assert_eq!(index.insert(id), expected);
        }
        assert_eq!(index.ids(), &[30, 10, 20]);
    }

    #[rstest]
    fn repeated_inserts_reuse_the_slot() {
        let mut index = IdIndex::new();
        assert_eq!(index.insert(7), 0);
        assert_eq!(index.insert(7), 0);
        assert_eq!(index.len(), 1);
    }

    #[rstest]
    fn round_trips_every_identifier() {
        let mut index = IdIndex::new();
        for id in [1001, 1002, 1003, 5, -9] {
            index.insert(id);
        }
        for position in 0..index.len() {
            let id = index.id_at(position).unwrap();
            assert_eq!(index.index_of(id), Some(position));
        }
    }

    #[rstest]
    fn unknown_lookups_return_none() {
        let index = IdIndex::new();
        assert_eq!(index.index_of(1), None);
        assert_eq!(index.id_at(0), None);
    }
}
