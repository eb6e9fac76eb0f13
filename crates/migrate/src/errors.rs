//! Errors for the `zk2mpt-migrate` crate.

use alloy_primitives::{Address, B256};
use thiserror::Error;
use zk2mpt_oracle::OracleError;
use zk2mpt_trie::{MptError, StoreError, ZkError};

/// A [Result] type alias where the error is [MigrateError].
pub type MigrateResult<T> = Result<T, MigrateError>;

/// An error type for migration operations. Every variant is fatal: the follower retries
/// transient provider failures internally, and everything that reaches this type unwinds to the
/// top-level driver.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Preimage resolution failed.
    #[error(transparent)]
    Oracle(#[from] OracleError),
    /// The zkTrie library failed.
    #[error(transparent)]
    Zk(#[from] ZkError),
    /// The Merkle-Patricia trie library failed.
    #[error(transparent)]
    Mpt(#[from] MptError),
    /// The backing store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// A node hash of the output trie already holds a zkTrie node in the backing store. A blind
    /// overwrite would lose data, so the migration aborts.
    #[error("Hash collision detected at trie node {0}")]
    HashCollision(B256),
    /// The chain provider failed in a way that cannot be retried.
    #[error("Critical provider error: {0}")]
    Provider(String),
    /// A state delta carried a field this version of the core does not recognize.
    #[error("Unrecognized field {field:?} in state delta for account {address}")]
    UnknownDeltaField {
        /// The account the delta applies to.
        address: Address,
        /// The unrecognized field name.
        field: String,
    },
    /// The backing store has no head header to migrate from.
    #[error("Head header not found in the backing store")]
    MissingHeadHeader,
    /// The backing store has no canonical genesis block.
    #[error("Canonical genesis hash not found in the backing store")]
    MissingGenesis,
    /// The backing store has no chain config at the genesis hash.
    #[error("Chain config not found for genesis hash {0}")]
    MissingChainConfig(B256),
    /// The persisted checkpoint record failed to parse.
    #[error("Invalid migration-root checkpoint: {0}")]
    InvalidCheckpoint(String),
    /// A persisted chain record failed to decode.
    #[error("Failed to decode persisted chain record: {0}")]
    Rlp(alloy_rlp::Error),
    /// The persisted chain config failed to encode or decode.
    #[error("Chain config codec failure: {0}")]
    ConfigCodec(#[from] serde_json::Error),
}
