//! Contains the contracts the migration requires from the zkTrie library: leaf iteration,
//! account decoding, the secure-hash function, and the preimage index.

use crate::{StateAccount, ZkResult};
use alloy_primitives::{Bytes, B256};

/// A single leaf of a zkTrie, as produced by [ZkDatabase::iter_leaves].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZkLeaf {
    /// The secure hash of the leaf's key preimage.
    pub key: B256,
    /// The raw leaf value blob.
    pub blob: Bytes,
}

/// The read-only view of the source zkTrie database.
pub trait ZkDatabase {
    /// Opens a leaf-only iterator over the trie rooted at `root`.
    ///
    /// Iterating the empty root yields no leaves; a root that is neither empty nor present in
    /// the database is a persisted-state mismatch and fails with [ZkError::RootNotFound].
    ///
    /// [ZkError::RootNotFound]: crate::ZkError::RootNotFound
    fn iter_leaves(&self, root: B256) -> ZkResult<Box<dyn Iterator<Item = ZkResult<ZkLeaf>> + '_>>;

    /// Looks up `key_hash` in the preimage index, recorded while the source chain ran.
    ///
    /// The index is untrusted: callers must re-hash the returned bytes with [Self::secure_hash]
    /// before use.
    fn preimage(&self, key_hash: B256) -> Option<Bytes>;

    /// The secure hash the source trie keys its leaves with.
    fn secure_hash(&self, preimage: &[u8]) -> ZkResult<B256>;

    /// Decodes a leaf blob from the account trie as a [StateAccount].
    fn decode_account(&self, blob: &[u8]) -> ZkResult<StateAccount>;

    /// Returns `true` if `blob` parses as a zkTrie node. Used by the hash-collision guard to
    /// detect a Keccak/Poseidon hash collision in the backing store.
    fn is_node(&self, blob: &[u8]) -> bool;

    /// The root hash of the empty zkTrie.
    fn empty_root(&self) -> B256;
}
