//! Errors for the `zk2mpt-oracle` crate.

use alloy_primitives::B256;
use thiserror::Error;
use zk2mpt_trie::ZkError;

/// A [Result] type alias where the error is [OracleError].
pub type OracleResult<T> = Result<T, OracleError>;

/// An error type for preimage resolution.
#[derive(Error, Debug)]
pub enum OracleError {
    /// No source could produce a preimage for the key hash. Corrupt input; the migration must
    /// abort rather than skip the leaf.
    #[error("Preimage does not exist for key hash {0}")]
    MissingPreimage(B256),
    /// A resolved preimage has the wrong length for the trie it came from.
    #[error("Preimage for key hash {key_hash} is {actual} bytes, expected {expected}")]
    UnexpectedPreimageLength {
        /// The queried leaf-key hash.
        key_hash: B256,
        /// The expected preimage length.
        expected: usize,
        /// The resolved preimage length.
        actual: usize,
    },
    /// The zkTrie library failed while hashing or reading the index.
    #[error(transparent)]
    Zk(#[from] ZkError),
}
