//! Providers that use alloy provider types on the backend.

use crate::{AlloyChainProviderError, ChainProvider, DiffTraceConfig, TraceResult, TxStateDiff};
use alloy_provider::{Provider, ReqwestProvider};
use alloy_transport::{RpcError, TransportErrorKind};
use async_trait::async_trait;

/// The [AlloyChainProvider] is a concrete implementation of the [ChainProvider] trait, providing
/// data over Ethereum JSON-RPC using an alloy provider as the backend.
///
/// **Note**:
/// This provider fetches traces using `debug_traceBlockByNumber` with the `prestateTracer` in
/// diff mode. The RPC must support this namespace and tracer.
#[derive(Debug, Clone)]
pub struct AlloyChainProvider {
    /// The inner Ethereum JSON-RPC provider.
    inner: ReqwestProvider,
}

impl AlloyChainProvider {
    /// Creates a new [AlloyChainProvider] with the given alloy provider.
    pub const fn new(inner: ReqwestProvider) -> Self {
        Self { inner }
    }

    /// Creates a new [AlloyChainProvider] from the provided [reqwest::Url].
    pub fn new_http(url: reqwest::Url) -> Self {
        Self::new(ReqwestProvider::new_http(url))
    }
}

/// Returns `true` if the error indicates data the core cannot decode, as opposed to a transport
/// failure worth retrying.
fn is_decoding_error(e: &RpcError<TransportErrorKind>) -> bool {
    matches!(e, RpcError::DeserError { .. } | RpcError::SerError(_) | RpcError::NullResp)
}

#[async_trait]
impl ChainProvider for AlloyChainProvider {
    type Error = AlloyChainProviderError;

    async fn block_number(&mut self) -> Result<u64, Self::Error> {
        self.inner
            .get_block_number()
            .await
            .map_err(|e| AlloyChainProviderError::BlockNumberFetch(e.to_string()))
    }

    async fn trace_block(&mut self, number: u64) -> Result<Vec<TxStateDiff>, Self::Error> {
        let results: Vec<TraceResult> = self
            .inner
            .raw_request(
                "debug_traceBlockByNumber".into(),
                (format!("0x{number:x}"), DiffTraceConfig::default()),
            )
            .await
            .map_err(|e| {
                if is_decoding_error(&e) {
                    AlloyChainProviderError::TraceDecoding(number, e.to_string())
                } else {
                    AlloyChainProviderError::TraceFetch(number, e.to_string())
                }
            })?;

        Ok(results.into_iter().map(|r| r.result).collect())
    }
}
