#![doc = include_str!("../README.md")]
#![warn(missing_debug_implementations, missing_docs, unreachable_pub, rustdoc::all)]
#![deny(unused_must_use, rust_2018_idioms)]

mod errors;
pub use errors::{MptError, MptResult, StoreError, StoreResult, ZkError, ZkResult};

mod kv;
pub use kv::{DiskKeyValueStore, KeyValueStore, MemoryKeyValueStore};

mod id;
pub use id::TrieId;

mod mpt;
pub use mpt::{MptDatabase, MptTrie, NodeSet};

mod zk;
pub use zk::{ZkDatabase, ZkLeaf};

mod backend;
pub use backend::{MemoryMptDatabase, MemoryZkDatabase, ZK_NODE_TAG};

pub use alloy_consensus::Account as StateAccount;
