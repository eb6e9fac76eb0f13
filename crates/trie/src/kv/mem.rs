//! Contains a concrete implementation of the [KeyValueStore] trait that stores data in memory.

use super::KeyValueStore;
use crate::StoreResult;
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// A simple, synchronous key-value store that stores data in memory. This is useful for testing
/// and development purposes.
#[derive(Default, Debug)]
pub struct MemoryKeyValueStore {
    store: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryKeyValueStore {
    /// Create a new [MemoryKeyValueStore] with an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the full store contents.
    pub fn export(&self) -> BTreeMap<Vec<u8>, Vec<u8>> {
        self.store.read().clone()
    }
}

impl Clone for MemoryKeyValueStore {
    fn clone(&self) -> Self {
        Self { store: RwLock::new(self.store.read().clone()) }
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.store.read().get(key).cloned()
    }

    fn put(&self, key: &[u8], value: Vec<u8>) -> StoreResult<()> {
        self.store.write().insert(key.to_vec(), value);
        Ok(())
    }
}
