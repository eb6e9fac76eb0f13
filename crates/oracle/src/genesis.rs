//! Contains the [GenesisAlloc], the preimage maps built from a chain's genesis allocation.

use crate::OracleResult;
use alloy_genesis::Genesis;
use alloy_primitives::{Address, B256};
use std::collections::HashMap;
use zk2mpt_trie::ZkDatabase;

/// The preimages of every genesis-allocated account address and storage slot, keyed by the
/// secure hash the source trie keys its leaves with.
///
/// Genesis-era leaves predate the preimage index recorded during normal chain operation, so
/// these maps are the only source able to resolve them.
#[derive(Debug, Clone, Default)]
pub struct GenesisAlloc {
    accounts: HashMap<B256, Address>,
    storage: HashMap<B256, B256>,
}

impl GenesisAlloc {
    /// Builds the maps from the `alloc` section of `genesis`, hashing every address and every
    /// storage slot key with the source trie's secure hash.
    pub fn from_genesis<Z: ZkDatabase>(genesis: &Genesis, zk: &Z) -> OracleResult<Self> {
        let mut accounts = HashMap::new();
        let mut storage = HashMap::new();

        for (address, account) in &genesis.alloc {
            accounts.insert(zk.secure_hash(address.as_slice())?, *address);
            for slot in account.storage.iter().flat_map(|slots| slots.keys()) {
                storage.insert(zk.secure_hash(slot.as_slice())?, *slot);
            }
        }
        Ok(Self { accounts, storage })
    }

    /// Looks up a genesis-allocated account address by leaf-key hash.
    pub fn account(&self, key_hash: B256) -> Option<Address> {
        self.accounts.get(&key_hash).copied()
    }

    /// Looks up a genesis-allocated storage slot by leaf-key hash.
    pub fn storage_slot(&self, key_hash: B256) -> Option<B256> {
        self.storage.get(&key_hash).copied()
    }

    /// The number of account preimages in the map.
    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    /// The number of storage-slot preimages in the map.
    pub fn storage_count(&self) -> usize {
        self.storage.len()
    }
}
