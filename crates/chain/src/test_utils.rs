//! Testing utilities for `zk2mpt-chain`.

use crate::{ChainProvider, ProviderErrorKind, TxStateDiff};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};

/// A mock [ChainProvider] serving scripted heads and traces from memory.
#[derive(Debug, Clone, Default)]
pub struct TestChainProvider {
    /// The head block number returned by [ChainProvider::block_number].
    pub head: u64,
    /// Scripted per-block traces.
    pub traces: HashMap<u64, Vec<TxStateDiff>>,
    /// Errors returned, in order, before any scripted data is served.
    pub errors: VecDeque<ProviderErrorKind>,
}

impl TestChainProvider {
    /// Creates a provider with the given head and no traces.
    pub fn with_head(head: u64) -> Self {
        Self { head, ..Self::default() }
    }

    /// Scripts the trace response for a block.
    pub fn insert_trace(&mut self, number: u64, diffs: Vec<TxStateDiff>) {
        self.traces.insert(number, diffs);
    }

    /// Queues an error to be returned by the next provider call.
    pub fn push_error(&mut self, error: ProviderErrorKind) {
        self.errors.push_back(error);
    }
}

#[async_trait]
impl ChainProvider for TestChainProvider {
    type Error = ProviderErrorKind;

    async fn block_number(&mut self) -> Result<u64, Self::Error> {
        if let Some(error) = self.errors.pop_front() {
            return Err(error);
        }
        Ok(self.head)
    }

    async fn trace_block(&mut self, number: u64) -> Result<Vec<TxStateDiff>, Self::Error> {
        if let Some(error) = self.errors.pop_front() {
            return Err(error);
        }
        self.traces
            .get(&number)
            .cloned()
            .ok_or_else(|| ProviderErrorKind::Temporary(format!("no trace for block {number}")))
    }
}
