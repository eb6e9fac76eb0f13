#![doc = include_str!("../README.md")]
#![warn(missing_debug_implementations, missing_docs, unreachable_pub, rustdoc::all)]
#![deny(unused_must_use, rust_2018_idioms)]

mod errors;
pub use errors::{OracleError, OracleResult};

mod genesis;
pub use genesis::GenesisAlloc;

mod oracle;
pub use oracle::{PreimageOracle, PreimageResolver, VerifiedIndex};
