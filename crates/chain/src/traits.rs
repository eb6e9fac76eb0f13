//! This module defines the [ChainProvider] trait.

use crate::TxStateDiff;
use async_trait::async_trait;
use core::fmt::Display;

/// Describes the functionality of a data source that can provide the source chain's head and
/// per-block diff-mode traces.
#[async_trait]
pub trait ChainProvider {
    /// The error type for provider operations. Consumers convert it into a
    /// [ProviderErrorKind] to decide between retrying and aborting.
    ///
    /// [ProviderErrorKind]: crate::ProviderErrorKind
    type Error: Display + Send + Sync;

    /// Returns the source chain's head block number.
    async fn block_number(&mut self) -> Result<u64, Self::Error>;

    /// Returns the post-state diff of every transaction in block `number`, in execution order.
    async fn trace_block(&mut self, number: u64) -> Result<Vec<TxStateDiff>, Self::Error>;
}
