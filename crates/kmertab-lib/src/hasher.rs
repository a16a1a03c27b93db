//! Deterministic hash state for the identifier sets and the count map.
//!
//! Uses ahash with explicit seeds so that two runs over the same input build
//! containers with identical layouts. Output order never depends on map iteration,
//! but a fixed layout keeps memory use and timings reproducible.

use ahash::RandomState;
use indexmap::IndexSet;
use std::collections::HashMap;

/// Hash map keyed with a seeded ahash state
pub type SeededHashMap<K, V> = HashMap<K, V, RandomState>;

/// Insertion-ordered set keyed with a seeded ahash state
pub type SeededIndexSet<T> = IndexSet<T, RandomState>;

/// Builds seeded hash states and maps
#[derive(Clone)]
pub struct DeterministicHasher {
    state: RandomState,
}

impl DeterministicHasher {
    /// Create a new deterministic hasher with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            state: RandomState::with_seeds(seed, !seed, seed, !seed),
        }
    }

    /// An empty map using this hasher's state
    pub fn map<K, V>(&self) -> SeededHashMap<K, V> {
        HashMap::with_hasher(self.state.clone())
    }

    /// An empty insertion-ordered set using this hasher's state
    pub fn index_set<T>(&self) -> SeededIndexSet<T> {
        IndexSet::with_hasher(self.state.clone())
    }
}
