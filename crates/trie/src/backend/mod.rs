//! In-memory reference backends for the [MptDatabase] and [ZkDatabase] contracts. These are
//! useful for testing and development purposes; a production deployment links the node's own
//! trie libraries behind the same traits.
//!
//! [MptDatabase]: crate::MptDatabase
//! [ZkDatabase]: crate::ZkDatabase

mod mpt;
pub use mpt::MemoryMptDatabase;

mod zk;
pub use zk::{MemoryZkDatabase, ZK_NODE_TAG};
