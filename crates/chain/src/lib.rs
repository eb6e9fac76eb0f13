#![doc = include_str!("../README.md")]
#![warn(missing_debug_implementations, missing_docs, unreachable_pub, rustdoc::all)]
#![deny(unused_must_use, rust_2018_idioms)]

mod errors;
pub use errors::{AlloyChainProviderError, ProviderErrorKind};

mod traits;
pub use traits::ChainProvider;

mod types;
pub use types::{AccountStateDiff, DiffTraceConfig, TraceResult, TracerConfig, TxStateDiff};

mod alloy_provider;
pub use alloy_provider::AlloyChainProvider;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
