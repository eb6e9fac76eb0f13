//! Contains the contracts the migration requires from the Merkle-Patricia trie library: opening
//! a trie by [TrieId], account and storage updates, scoped commits producing a [NodeSet], and a
//! node walk for the hash-collision guard.

use crate::{MptResult, StateAccount, TrieId};
use alloy_primitives::{Address, Bytes, B256};
use std::collections::BTreeMap;

/// The set of trie nodes produced by committing a single trie, keyed by node hash.
///
/// Node sets from the account trie and from storage tries are merged into the trie database
/// before it is force-committed to the backing store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeSet {
    owner: B256,
    nodes: BTreeMap<B256, Bytes>,
}

impl NodeSet {
    /// Creates an empty [NodeSet] for the trie owned by `owner` (zero for the account trie).
    pub const fn new(owner: B256) -> Self {
        Self { owner, nodes: BTreeMap::new() }
    }

    /// The owner hash of the trie that produced this set.
    pub const fn owner(&self) -> B256 {
        self.owner
    }

    /// Adds a node to the set.
    pub fn insert(&mut self, hash: B256, blob: Bytes) {
        self.nodes.insert(hash, blob);
    }

    /// Merges another [NodeSet] into this one.
    pub fn merge(&mut self, other: Self) {
        self.nodes.extend(other.nodes);
    }

    /// Iterates the `(node hash, node blob)` pairs in the set.
    pub fn iter(&self) -> impl Iterator<Item = (&B256, &Bytes)> {
        self.nodes.iter()
    }

    /// The number of nodes in the set.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the set contains no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// A single mutable Merkle-Patricia trie, opened through a [MptDatabase].
pub trait MptTrie {
    /// Reads the account stored under `Keccak-256(address)`, or [None] if the trie holds no such
    /// account.
    fn get_account(&self, address: Address) -> MptResult<Option<StateAccount>>;

    /// Writes `account` under `Keccak-256(address)`.
    fn update_account(&mut self, address: Address, account: &StateAccount) -> MptResult<()>;

    /// Writes the already RLP-encoded `value` under `Keccak-256(slot)`.
    fn update_storage(&mut self, slot: B256, value: Bytes) -> MptResult<()>;

    /// Reads the encoded value stored under `Keccak-256(slot)`, or [None] if the trie holds no
    /// such slot.
    fn get_storage(&self, slot: B256) -> MptResult<Option<Bytes>>;

    /// The hashes of every node the trie currently resolves to, as probed by the hash-collision
    /// guard before the trie is committed.
    fn node_hashes(&self) -> Vec<B256>;

    /// Hashes the trie, consuming it, and returns the new root together with the [NodeSet] of
    /// all nodes produced since the trie was opened.
    fn commit(self: Box<Self>) -> MptResult<(B256, NodeSet)>;
}

/// The Merkle-Patricia trie database the migration writes through.
///
/// The commit discipline is fixed: [MptTrie::commit] produces a root and a [NodeSet], the set is
/// [merged] into the database, and the database is [force-committed] at that root. The three
/// steps appear together or not at all.
///
/// [merged]: MptDatabase::merge
/// [force-committed]: MptDatabase::commit
pub trait MptDatabase {
    /// Opens the trie identified by `id`.
    ///
    /// Fails with [MptError::RootNotFound] if the identified root is neither the empty root nor
    /// resolvable from the backing store.
    ///
    /// [MptError::RootNotFound]: crate::MptError::RootNotFound
    fn open(&self, id: TrieId) -> MptResult<Box<dyn MptTrie>>;

    /// Merges a committed trie's [NodeSet] into the database under `root`.
    fn merge(&self, root: B256, set: NodeSet) -> MptResult<()>;

    /// Force-commits the database at `root`, flushing every merged node to the backing store.
    fn commit(&self, root: B256) -> MptResult<()>;
}
