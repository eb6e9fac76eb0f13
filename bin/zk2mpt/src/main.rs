#![doc = include_str!("../README.md")]
#![warn(missing_debug_implementations, missing_docs, rustdoc::all)]
#![deny(unused_must_use, rust_2018_idioms)]

use alloy_genesis::Genesis;
use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use zk2mpt_chain::AlloyChainProvider;
use zk2mpt_migrate::{SealConfig, StateMigrator, PROTOCOL_VAULT};
use zk2mpt_trie::{DiskKeyValueStore, MemoryMptDatabase, MemoryZkDatabase};

mod cli;
use cli::Cli;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    let cfg = Cli::parse().init_telemetry()?;

    let store = Arc::new(DiskKeyValueStore::new(cfg.data_dir.join("chaindata")));
    info!(target: "zk2mpt", data_dir = ?cfg.data_dir, "Opened backing store");

    let raw_genesis = std::fs::read_to_string(&cfg.genesis)
        .with_context(|| format!("reading genesis file {:?}", cfg.genesis))?;
    let genesis: Genesis = serde_json::from_str(&raw_genesis).context("parsing genesis file")?;

    let zk = Arc::new(MemoryZkDatabase::new(store.clone()));
    let mpt = MemoryMptDatabase::new(store.clone());
    let chain = AlloyChainProvider::new_http(
        cfg.node_address.parse().map_err(|e| anyhow!("invalid node address: {e}"))?,
    );
    let seal_config = SealConfig {
        gas_limit: cfg.gas_limit,
        timestamp: cfg.starting_timestamp,
        base_fee: cfg.initial_base_fee,
        coinbase: PROTOCOL_VAULT,
    };

    let mut migrator = StateMigrator::new(store, zk, mpt, &genesis, chain, seal_config)?
        .with_missing_slot_allowlist(cfg.allow_missing_slot);
    migrator.run().await?;
    Ok(())
}
