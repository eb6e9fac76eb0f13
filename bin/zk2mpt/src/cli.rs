//! Module for the CLI.

use alloy_primitives::Address;
use anyhow::{anyhow, Result};
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use tracing::Level;

/// The migration binary CLI application arguments.
#[derive(Parser, Clone, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (0-4)
    #[arg(long, short, help = "Verbosity level (0-4)", action = ArgAction::Count)]
    pub v: u8,
    /// The chain data directory.
    #[clap(long, env = "ZK2MPT_DATA_DIR", help = "Chain data directory")]
    pub data_dir: PathBuf,
    /// Path of the L2 genesis file.
    #[clap(long, env = "ZK2MPT_GENESIS", help = "Path of the L2 genesis file")]
    pub genesis: PathBuf,
    /// Address of the source node JSON-RPC endpoint.
    #[clap(
        long,
        env = "ZK2MPT_NODE_ADDRESS",
        help = "Address of the source node JSON-RPC endpoint (eth and debug namespaces required)"
    )]
    pub node_address: String,
    /// The gas limit of the transition block.
    #[clap(long, default_value_t = 30_000_000, help = "Gas limit of the transition block")]
    pub gas_limit: u64,
    /// The timestamp of the transition block.
    #[clap(long, default_value_t = 0, help = "Timestamp of the transition block")]
    pub starting_timestamp: u64,
    /// The initial EIP-1559 base fee of the transition block.
    #[clap(
        long,
        default_value_t = 1_000_000_000,
        help = "Initial base fee of the transition block"
    )]
    pub initial_base_fee: u64,
    /// Contracts whose storage slots may be skipped when their preimage is missing.
    #[clap(
        long,
        value_delimiter = ',',
        help = "Contracts whose storage slots may be skipped when a preimage is missing (devnet only)"
    )]
    pub allow_missing_slot: Vec<Address>,
}

impl Cli {
    /// Initializes telemetry for the application.
    pub fn init_telemetry(self) -> Result<Self> {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(match self.v {
                0 => Level::ERROR,
                1 => Level::WARN,
                2 => Level::INFO,
                3 => Level::DEBUG,
                _ => Level::TRACE,
            })
            .finish();
        tracing::subscriber::set_global_default(subscriber).map_err(|e| anyhow!(e))?;
        Ok(self)
    }
}
