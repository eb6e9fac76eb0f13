//! Contains a concrete in-memory implementation of the [ZkDatabase] contract.
//!
//! Leaf keys are hashed with a domain-separated Keccak-256, standing in for the production
//! Poseidon hasher while keeping the two key spaces disjoint the same way Poseidon does. Trie
//! nodes are written into the backing store under their hash, tagged so the hash-collision
//! guard can recognize them.

use crate::{KeyValueStore, StateAccount, ZkDatabase, ZkError, ZkLeaf, ZkResult};
use alloy_primitives::{keccak256, Bytes, B256};
use alloy_rlp::Decodable;
use parking_lot::RwLock;
use std::collections::HashMap;

/// The tag byte every reference-backend zkTrie node blob starts with.
pub const ZK_NODE_TAG: u8 = 0x7a;

/// The domain prefix of the stand-in secure hash.
const ZK_HASH_DOMAIN: &[u8] = b"zk2mpt/secure-hash";

/// The backing-store keyspace of the preimage index, recorded by the node while the source
/// chain ran.
const PREIMAGE_PREFIX: &[u8] = b"secure-key-";

fn preimage_key(key_hash: B256) -> Vec<u8> {
    let mut key = Vec::with_capacity(PREIMAGE_PREFIX.len() + 32);
    key.extend_from_slice(PREIMAGE_PREFIX);
    key.extend_from_slice(key_hash.as_slice());
    key
}

/// An in-memory implementation of the [ZkDatabase] contract, writing its trie nodes and its
/// preimage index into the backing [KeyValueStore].
#[derive(Debug)]
pub struct MemoryZkDatabase<S> {
    store: S,
    tries: RwLock<HashMap<B256, Vec<ZkLeaf>>>,
}

impl<S> MemoryZkDatabase<S> {
    /// Creates a new [MemoryZkDatabase] over the given backing store.
    pub fn new(store: S) -> Self {
        Self { store, tries: RwLock::new(HashMap::new()) }
    }
}

impl<S: KeyValueStore> MemoryZkDatabase<S> {
    /// Records `preimage` in the preimage index under its secure hash, returning the hash.
    pub fn record_preimage(&self, preimage: &[u8]) -> ZkResult<B256> {
        let key_hash = secure_hash(preimage);
        self.store.put(&preimage_key(key_hash), preimage.to_vec())?;
        Ok(key_hash)
    }

    /// Inserts raw `preimage` bytes into the index under an arbitrary `key_hash`, without
    /// hashing. The index is untrusted by contract; this models a corrupt entry.
    pub fn insert_preimage(&self, key_hash: B256, preimage: Bytes) -> ZkResult<()> {
        self.store.put(&preimage_key(key_hash), preimage.to_vec())?;
        Ok(())
    }
}

impl<S: KeyValueStore> MemoryZkDatabase<S> {
    /// Builds a trie from the given leaves, writing its nodes into the backing store, and
    /// returns the new root. An empty leaf set yields the empty root.
    pub fn insert_trie(&self, mut leaves: Vec<ZkLeaf>) -> ZkResult<B256> {
        if leaves.is_empty() {
            return Ok(B256::ZERO);
        }
        leaves.sort_by_key(|leaf| leaf.key);

        let mut node_hashes = Vec::with_capacity(leaves.len());
        for leaf in &leaves {
            let mut blob = vec![ZK_NODE_TAG];
            blob.extend_from_slice(leaf.key.as_slice());
            blob.extend_from_slice(&leaf.blob);
            let hash = secure_hash(&blob);
            self.store.put(hash.as_slice(), blob)?;
            node_hashes.push(hash);
        }

        let mut root_blob = vec![ZK_NODE_TAG];
        for hash in &node_hashes {
            root_blob.extend_from_slice(hash.as_slice());
        }
        let root = secure_hash(&root_blob);
        self.store.put(root.as_slice(), root_blob)?;

        self.tries.write().insert(root, leaves);
        Ok(root)
    }
}

impl<S: KeyValueStore> ZkDatabase for MemoryZkDatabase<S> {
    fn iter_leaves(
        &self,
        root: B256,
    ) -> ZkResult<Box<dyn Iterator<Item = ZkResult<ZkLeaf>> + '_>> {
        if root == B256::ZERO {
            return Ok(Box::new(std::iter::empty()));
        }
        let leaves =
            self.tries.read().get(&root).cloned().ok_or(ZkError::RootNotFound(root))?;
        Ok(Box::new(leaves.into_iter().map(Ok)))
    }

    fn preimage(&self, key_hash: B256) -> Option<Bytes> {
        self.store.get(&preimage_key(key_hash)).map(Into::into)
    }

    fn secure_hash(&self, preimage: &[u8]) -> ZkResult<B256> {
        Ok(secure_hash(preimage))
    }

    fn decode_account(&self, blob: &[u8]) -> ZkResult<StateAccount> {
        StateAccount::decode(&mut &blob[..]).map_err(ZkError::AccountDecode)
    }

    fn is_node(&self, blob: &[u8]) -> bool {
        blob.len() > B256::len_bytes() && blob[0] == ZK_NODE_TAG
    }

    fn empty_root(&self) -> B256 {
        B256::ZERO
    }
}

fn secure_hash(preimage: &[u8]) -> B256 {
    let mut input = Vec::with_capacity(ZK_HASH_DOMAIN.len() + preimage.len());
    input.extend_from_slice(ZK_HASH_DOMAIN);
    input.extend_from_slice(preimage);
    keccak256(input)
}
