//! Contains the [MigrationRoot] checkpoint persisted between follower iterations.

use crate::{MigrateError, MigrateResult};
use alloy_primitives::B256;
use serde::{Deserialize, Serialize};
use zk2mpt_trie::KeyValueStore;

/// The backing-store key the checkpoint is persisted under.
pub const MIGRATION_ROOT_KEY: &[u8] = b"migration-root";

/// The resumable migration cursor: the migrated state root and the number of the source block
/// whose post-state it represents.
///
/// Written only after the corresponding trie commit has been flushed, so a crash redoes at most
/// one block of work and the checkpoint never references unpersisted trie nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationRoot {
    /// The migrated MPT state root.
    pub hash: B256,
    /// The source block number whose post-state `hash` represents.
    pub number: u64,
}

impl MigrationRoot {
    /// Reads the checkpoint from the backing store. [None] means the initial account migration
    /// has not run yet.
    pub fn load<S: KeyValueStore>(store: &S) -> MigrateResult<Option<Self>> {
        let Some(raw) = store.get(MIGRATION_ROOT_KEY) else {
            return Ok(None);
        };
        serde_json::from_slice(&raw)
            .map(Some)
            .map_err(|e| MigrateError::InvalidCheckpoint(e.to_string()))
    }

    /// Persists the checkpoint to the backing store.
    pub fn save<S: KeyValueStore>(&self, store: &S) -> MigrateResult<()> {
        let encoded =
            serde_json::to_vec(self).map_err(|e| MigrateError::InvalidCheckpoint(e.to_string()))?;
        store.put(MIGRATION_ROOT_KEY, encoded)?;
        Ok(())
    }
}
