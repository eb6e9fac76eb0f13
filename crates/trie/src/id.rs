//! Contains the [TrieId], the address of a trie within a [MptDatabase].
//!
//! [MptDatabase]: crate::MptDatabase

use alloy_primitives::B256;

/// Identifies a trie to open within a [MptDatabase]: either the account trie
/// at a given state root, or the storage trie of a single account.
///
/// [MptDatabase]: crate::MptDatabase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrieId {
    /// The account trie rooted at `root`.
    State {
        /// The state root to open the trie at.
        root: B256,
    },
    /// The storage trie of one account.
    Storage {
        /// The state root the enclosing account trie is rooted at.
        state_root: B256,
        /// The owner of the storage trie, as the Keccak-256 hash of the account address.
        owner: B256,
        /// The storage root to open the trie at.
        root: B256,
    },
}

impl TrieId {
    /// Creates the [TrieId] of the account trie rooted at `root`.
    pub const fn state(root: B256) -> Self {
        Self::State { root }
    }

    /// Creates the [TrieId] of the storage trie owned by the account whose address hashes to
    /// `owner`, within the state rooted at `state_root`.
    pub const fn storage(state_root: B256, owner: B256, root: B256) -> Self {
        Self::Storage { state_root, owner, root }
    }

    /// The root hash the trie is opened at.
    pub const fn root(&self) -> B256 {
        match self {
            Self::State { root } | Self::Storage { root, .. } => *root,
        }
    }

    /// The owner hash of the trie. Zero for the account trie.
    pub const fn owner(&self) -> B256 {
        match self {
            Self::State { .. } => B256::ZERO,
            Self::Storage { owner, .. } => *owner,
        }
    }
}
