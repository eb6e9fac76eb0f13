//! Wire types for the diff-mode block trace.

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The trace configuration requested from the source node: the prestate tracer in diff mode, so
/// only changed fields are returned per account.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffTraceConfig {
    /// The tracer to run.
    pub tracer: String,
    /// Tracer-specific options.
    pub tracer_config: TracerConfig,
}

impl Default for DiffTraceConfig {
    fn default() -> Self {
        Self {
            tracer: "prestateTracer".to_string(),
            tracer_config: TracerConfig { diff_mode: true },
        }
    }
}

/// Options of the prestate tracer.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TracerConfig {
    /// Emit only post-state changes instead of full pre/post snapshots.
    pub diff_mode: bool,
}

/// One element of the `debug_traceBlockByNumber` response array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceResult {
    /// The trace of a single transaction.
    pub result: TxStateDiff,
}

/// The post-state diff of a single transaction, keyed by touched account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TxStateDiff {
    /// Accounts changed by the transaction, with only their changed fields populated.
    #[serde(default)]
    pub post: BTreeMap<Address, AccountStateDiff>,
}

/// The changed fields of a single account.
///
/// Fields the core does not recognize are collected verbatim: the follower treats any leftover
/// as a protocol-version mismatch and aborts rather than applying partial state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountStateDiff {
    /// The new account balance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<U256>,
    /// The new account nonce.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<u64>,
    /// Updated storage slots and their new values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<BTreeMap<B256, B256>>,
    /// Fields of the delta this version of the core does not recognize.
    #[serde(flatten)]
    pub unknown: BTreeMap<String, serde_json::Value>,
}

impl AccountStateDiff {
    /// Returns the name of one unrecognized field, if any survived deserialization.
    pub fn unknown_field(&self) -> Option<&str> {
        self.unknown.keys().next().map(String::as_str)
    }
}
