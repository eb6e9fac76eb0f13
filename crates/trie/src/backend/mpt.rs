//! Contains a concrete in-memory implementation of the [MptDatabase] contract.
//!
//! Tries are flattened into content-addressed nodes on commit: one leaf node per `(hashed key,
//! value)` pair and a manifest node listing the leaves, whose hash is the trie root. The layout
//! reproduces the properties the migration relies on — deterministic roots, node sets merged
//! into the backing store, reopening a committed root after a restart — without the radix
//! structure of a production trie.

use crate::{
    KeyValueStore, MptDatabase, MptError, MptResult, MptTrie, NodeSet, StateAccount, TrieId,
};
use alloy_consensus::constants::EMPTY_ROOT_HASH;
use alloy_primitives::{keccak256, Address, Bytes, B256};
use alloy_rlp::{Decodable, RlpDecodable, RlpEncodable};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};

/// A single `(hashed key, value)` pair, stored as one content-addressed node.
#[derive(Debug, Clone, RlpEncodable, RlpDecodable)]
struct LeafNode {
    key: B256,
    value: Bytes,
}

/// A manifest entry referencing one committed [LeafNode] by hash.
#[derive(Debug, Clone, RlpEncodable, RlpDecodable)]
struct LeafRef {
    key: B256,
    hash: B256,
}

/// An in-memory implementation of the [MptDatabase] contract, persisting committed nodes into
/// the backing [KeyValueStore].
#[derive(Debug)]
pub struct MemoryMptDatabase<S> {
    store: S,
    pending: RwLock<HashMap<B256, NodeSet>>,
}

impl<S> MemoryMptDatabase<S> {
    /// Creates a new [MemoryMptDatabase] over the given backing store.
    pub fn new(store: S) -> Self {
        Self { store, pending: RwLock::new(HashMap::new()) }
    }
}

impl<S: KeyValueStore> MemoryMptDatabase<S> {
    fn load(&self, root: B256) -> MptResult<BTreeMap<B256, Bytes>> {
        let manifest = self.store.get(root.as_slice()).ok_or(MptError::RootNotFound(root))?;
        let refs = Vec::<LeafRef>::decode(&mut manifest.as_slice()).map_err(MptError::Rlp)?;

        let mut entries = BTreeMap::new();
        for leaf_ref in refs {
            let blob = self
                .store
                .get(leaf_ref.hash.as_slice())
                .ok_or(MptError::RootNotFound(leaf_ref.hash))?;
            let leaf = LeafNode::decode(&mut blob.as_slice()).map_err(MptError::Rlp)?;
            entries.insert(leaf.key, leaf.value);
        }
        Ok(entries)
    }
}

impl<S: KeyValueStore> MptDatabase for MemoryMptDatabase<S> {
    fn open(&self, id: TrieId) -> MptResult<Box<dyn MptTrie>> {
        let root = id.root();
        let entries =
            if root == EMPTY_ROOT_HASH { BTreeMap::new() } else { self.load(root)? };
        Ok(Box::new(MemoryMpt { id, entries }))
    }

    fn merge(&self, root: B256, set: NodeSet) -> MptResult<()> {
        self.pending
            .write()
            .entry(root)
            .or_insert_with(|| NodeSet::new(set.owner()))
            .merge(set);
        Ok(())
    }

    fn commit(&self, root: B256) -> MptResult<()> {
        let set = self.pending.write().remove(&root).ok_or(MptError::NothingToCommit(root))?;
        for (hash, blob) in set.iter() {
            self.store.put(hash.as_slice(), blob.to_vec())?;
        }
        Ok(())
    }
}

/// A single in-memory trie opened through a [MemoryMptDatabase], keyed by hashed key.
#[derive(Debug, Clone)]
struct MemoryMpt {
    id: TrieId,
    entries: BTreeMap<B256, Bytes>,
}

impl MemoryMpt {
    /// Hashes the current entries into their node representation.
    fn hash_nodes(&self) -> (B256, NodeSet) {
        let mut set = NodeSet::new(self.id.owner());
        if self.entries.is_empty() {
            return (EMPTY_ROOT_HASH, set);
        }

        let mut refs = Vec::with_capacity(self.entries.len());
        for (key, value) in &self.entries {
            let blob: Bytes =
                alloy_rlp::encode(LeafNode { key: *key, value: value.clone() }).into();
            let hash = keccak256(&blob);
            set.insert(hash, blob);
            refs.push(LeafRef { key: *key, hash });
        }
        let manifest: Bytes = alloy_rlp::encode(&refs).into();
        let root = keccak256(&manifest);
        set.insert(root, manifest);
        (root, set)
    }
}

impl MptTrie for MemoryMpt {
    fn get_account(&self, address: Address) -> MptResult<Option<StateAccount>> {
        self.entries
            .get(&keccak256(address))
            .map(|blob| StateAccount::decode(&mut blob.as_ref()).map_err(MptError::Rlp))
            .transpose()
    }

    fn update_account(&mut self, address: Address, account: &StateAccount) -> MptResult<()> {
        self.entries.insert(keccak256(address), alloy_rlp::encode(account).into());
        Ok(())
    }

    fn update_storage(&mut self, slot: B256, value: Bytes) -> MptResult<()> {
        self.entries.insert(keccak256(slot), value);
        Ok(())
    }

    fn get_storage(&self, slot: B256) -> MptResult<Option<Bytes>> {
        Ok(self.entries.get(&keccak256(slot)).cloned())
    }

    fn node_hashes(&self) -> Vec<B256> {
        let (_, set) = self.hash_nodes();
        set.iter().map(|(hash, _)| *hash).collect()
    }

    fn commit(self: Box<Self>) -> MptResult<(B256, NodeSet)> {
        Ok(self.hash_nodes())
    }
}
