//! This module contains the [KeyValueStore] trait and concrete implementations of it.

use crate::StoreResult;
use std::sync::Arc;

mod mem;
pub use mem::MemoryKeyValueStore;

mod disk;
pub use disk::DiskKeyValueStore;

/// Describes the interface of a simple, synchronous key-value store.
///
/// Keys are arbitrary byte strings: the chain database mixes 32-byte node
/// hashes with prefixed schema keys, so no fixed key width is imposed.
pub trait KeyValueStore {
    /// Get the value associated with the given key.
    fn get(&self, key: &[u8]) -> Option<Vec<u8>>;

    /// Set the value associated with the given key.
    fn put(&self, key: &[u8], value: Vec<u8>) -> StoreResult<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        (**self).get(key)
    }

    fn put(&self, key: &[u8], value: Vec<u8>) -> StoreResult<()> {
        (**self).put(key, value)
    }
}
