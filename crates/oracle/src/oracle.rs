//! Contains the [PreimageOracle] and the [PreimageResolver] strategies it composes.

use crate::{GenesisAlloc, OracleError, OracleResult};
use alloy_primitives::{Address, Bytes, B256};
use std::sync::Arc;
use tracing::warn;
use zk2mpt_trie::ZkDatabase;

/// A single preimage source. Returning `Ok(None)` means the source has no answer and the next
/// strategy is consulted; errors abort resolution.
pub trait PreimageResolver {
    /// Attempts to resolve `key_hash` to its preimage.
    fn resolve(&self, key_hash: B256) -> OracleResult<Option<Bytes>>;
}

/// Resolves leaf-key hashes through an ordered list of [PreimageResolver] strategies.
pub struct PreimageOracle {
    strategies: Vec<Box<dyn PreimageResolver + Send + Sync>>,
}

impl PreimageOracle {
    /// Creates the standard three-source oracle: genesis addresses, genesis storage slots, then
    /// the verified preimage index.
    pub fn new<Z>(alloc: GenesisAlloc, zk: Arc<Z>) -> Self
    where
        Z: ZkDatabase + Send + Sync + 'static,
    {
        Self {
            strategies: vec![
                Box::new(GenesisAccounts(alloc.clone())),
                Box::new(GenesisStorage(alloc)),
                Box::new(VerifiedIndex::new(zk)),
            ],
        }
    }

    /// Creates an oracle from an explicit strategy list, consulted in order.
    pub fn from_strategies(strategies: Vec<Box<dyn PreimageResolver + Send + Sync>>) -> Self {
        Self { strategies }
    }

    /// Resolves `key_hash` to its preimage, or fails with [OracleError::MissingPreimage] if no
    /// strategy has an answer.
    pub fn resolve(&self, key_hash: B256) -> OracleResult<Bytes> {
        for strategy in &self.strategies {
            if let Some(preimage) = strategy.resolve(key_hash)? {
                return Ok(preimage);
            }
        }
        Err(OracleError::MissingPreimage(key_hash))
    }

    /// Resolves an account-trie leaf key: the preimage must be a 20-byte address.
    pub fn resolve_address(&self, key_hash: B256) -> OracleResult<Address> {
        let preimage = self.resolve(key_hash)?;
        if preimage.len() != Address::len_bytes() {
            return Err(OracleError::UnexpectedPreimageLength {
                key_hash,
                expected: Address::len_bytes(),
                actual: preimage.len(),
            });
        }
        Ok(Address::from_slice(&preimage))
    }

    /// Resolves a storage-trie leaf key: the preimage must be a 32-byte slot.
    pub fn resolve_slot(&self, key_hash: B256) -> OracleResult<B256> {
        let preimage = self.resolve(key_hash)?;
        if preimage.len() != B256::len_bytes() {
            return Err(OracleError::UnexpectedPreimageLength {
                key_hash,
                expected: B256::len_bytes(),
                actual: preimage.len(),
            });
        }
        Ok(B256::from_slice(&preimage))
    }
}

impl core::fmt::Debug for PreimageOracle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PreimageOracle").field("strategies", &self.strategies.len()).finish()
    }
}

/// Strategy 1: the genesis-allocation address map.
struct GenesisAccounts(GenesisAlloc);

impl PreimageResolver for GenesisAccounts {
    fn resolve(&self, key_hash: B256) -> OracleResult<Option<Bytes>> {
        Ok(self.0.account(key_hash).map(|address| Bytes::copy_from_slice(address.as_slice())))
    }
}

/// Strategy 2: the genesis-allocation storage map.
struct GenesisStorage(GenesisAlloc);

impl PreimageResolver for GenesisStorage {
    fn resolve(&self, key_hash: B256) -> OracleResult<Option<Bytes>> {
        Ok(self.0.storage_slot(key_hash).map(|slot| Bytes::copy_from_slice(slot.as_slice())))
    }
}

/// Strategy 3: the trie database's preimage index, verified by re-hashing.
///
/// The index is untrusted. A candidate whose recomputed secure hash does not match the queried
/// key hash is treated as a miss, never returned.
pub struct VerifiedIndex<Z> {
    zk: Arc<Z>,
}

impl<Z> VerifiedIndex<Z> {
    /// Creates a new [VerifiedIndex] over the given zkTrie database.
    pub const fn new(zk: Arc<Z>) -> Self {
        Self { zk }
    }
}

impl<Z> core::fmt::Debug for VerifiedIndex<Z> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VerifiedIndex").finish()
    }
}

impl<Z: ZkDatabase> PreimageResolver for VerifiedIndex<Z> {
    fn resolve(&self, key_hash: B256) -> OracleResult<Option<Bytes>> {
        let Some(candidate) = self.zk.preimage(key_hash) else {
            return Ok(None);
        };
        if self.zk.secure_hash(&candidate)? == key_hash {
            Ok(Some(candidate))
        } else {
            warn!(
                target: "oracle",
                key_hash = %key_hash,
                "Preimage index entry failed verification, treating as a miss"
            );
            Ok(None)
        }
    }
}
