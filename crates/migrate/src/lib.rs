#![doc = include_str!("../README.md")]
#![warn(missing_debug_implementations, missing_docs, unreachable_pub, rustdoc::all)]
#![deny(unused_must_use, rust_2018_idioms)]

mod errors;
pub use errors::{MigrateError, MigrateResult};

mod checkpoint;
pub use checkpoint::{MigrationRoot, MIGRATION_ROOT_KEY};

mod status;
pub use status::Status;

pub mod rawdb;

mod config;
pub use config::{ChainConfig, FeeParams};

mod migrator;
pub use migrator::StateMigrator;

mod follower;
pub use follower::POLL_INTERVAL;

mod seal;
pub use seal::{MigrationResult, SealConfig, PROTOCOL_VAULT, TRANSITION_EXTRA_DATA};
