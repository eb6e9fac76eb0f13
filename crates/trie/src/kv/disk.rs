//! Contains a concrete implementation of the [KeyValueStore] trait that stores data on disk.
//!
//! Data is stored in a directory, with a separate file for each key. The key is the hex-encoded
//! filename, and the value is the raw contents of the file.

use super::KeyValueStore;
use crate::StoreResult;
use alloy_primitives::hex;
use std::{fs, path::PathBuf};

/// A simple, synchronous key-value store that stores data on disk.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DiskKeyValueStore {
    data_directory: PathBuf,
}

impl DiskKeyValueStore {
    /// Create a new [DiskKeyValueStore] with the given data directory.
    pub fn new(data_directory: PathBuf) -> Self {
        Self { data_directory }
    }

    fn key_path(&self, key: &[u8]) -> PathBuf {
        self.data_directory.join(format!("{}.bin", hex::encode(key)))
    }
}

impl KeyValueStore for DiskKeyValueStore {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        fs::read(self.key_path(key)).ok()
    }

    fn put(&self, key: &[u8], value: Vec<u8>) -> StoreResult<()> {
        fs::create_dir_all(&self.data_directory)?;
        fs::write(self.key_path(key), value.as_slice())?;
        Ok(())
    }
}
