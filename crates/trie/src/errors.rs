//! Errors for the `zk2mpt-trie` crate.

use alloy_primitives::B256;
use thiserror::Error;

/// A [Result] type alias where the error is [StoreError].
pub type StoreResult<T> = Result<T, StoreError>;

/// An error type for [KeyValueStore] operations.
///
/// [KeyValueStore]: crate::KeyValueStore
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store failed to persist a value.
    #[error("Failed to write value to the backing store: {0}")]
    Write(#[from] std::io::Error),
}

/// A [Result] type alias where the error is [MptError].
pub type MptResult<T> = Result<T, MptError>;

/// An error type for [MptDatabase] and [MptTrie] operations.
///
/// [MptDatabase]: crate::MptDatabase
/// [MptTrie]: crate::MptTrie
#[derive(Error, Debug)]
pub enum MptError {
    /// The requested trie root is not present in the database.
    #[error("Unknown trie root {0}")]
    RootNotFound(B256),
    /// A trie value failed to decode.
    #[error("Failed to decode trie value: {0}")]
    Rlp(alloy_rlp::Error),
    /// No node set was merged for the root being committed.
    #[error("No pending node set for root {0}")]
    NothingToCommit(B256),
    /// Backing store error.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A [Result] type alias where the error is [ZkError].
pub type ZkResult<T> = Result<T, ZkError>;

/// An error type for [ZkDatabase] operations.
///
/// [ZkDatabase]: crate::ZkDatabase
#[derive(Error, Debug)]
pub enum ZkError {
    /// The requested trie root is not present in the database.
    #[error("Unknown zkTrie root {0}")]
    RootNotFound(B256),
    /// A leaf blob failed to decode as a state account.
    #[error("Failed to decode leaf blob as a state account: {0}")]
    AccountDecode(alloy_rlp::Error),
    /// Backing store error.
    #[error(transparent)]
    Store(#[from] StoreError),
}
