//! Errors for the `zk2mpt-chain` crate.

use thiserror::Error;

/// Classifies provider failures for the state-diff follower.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// A transient failure: network I/O, or the source node catching up. Retried on the
    /// follower's polling cadence.
    #[error("Temporary provider error: {0}")]
    Temporary(String),
    /// A critical failure: returned data the core cannot decode, indicating a
    /// protocol-version mismatch. Aborts the migration.
    #[error("Critical provider error: {0}")]
    Critical(String),
}

/// An error for the [AlloyChainProvider].
///
/// [AlloyChainProvider]: crate::AlloyChainProvider
#[derive(Error, Debug)]
pub enum AlloyChainProviderError {
    /// Failed to fetch the head block number.
    #[error("Failed to fetch head block number: {0}")]
    BlockNumberFetch(String),
    /// Failed to fetch the diff-mode trace for a block.
    #[error("Failed to fetch diff-mode trace for block {0}: {1}")]
    TraceFetch(u64, String),
    /// The diff-mode trace for a block failed to decode.
    #[error("Malformed diff-mode trace for block {0}: {1}")]
    TraceDecoding(u64, String),
}

impl From<AlloyChainProviderError> for ProviderErrorKind {
    fn from(e: AlloyChainProviderError) -> Self {
        match e {
            AlloyChainProviderError::BlockNumberFetch(_) | AlloyChainProviderError::TraceFetch(..) => {
                Self::Temporary(e.to_string())
            }
            AlloyChainProviderError::TraceDecoding(..) => Self::Critical(e.to_string()),
        }
    }
}
