//! Contains the transition-block builder, sealing the migration with a single empty block that
//! anchors the migrated state root on the canonical chain.

use crate::{rawdb, MigrateError, MigrateResult, StateMigrator};
use alloy_consensus::{
    constants::{EMPTY_OMMER_ROOT_HASH, EMPTY_ROOT_HASH},
    Header,
};
use alloy_primitives::{address, Address, Bloom, Bytes, B256, B64, U256};
use tracing::info;
use zk2mpt_chain::ChainProvider;
use zk2mpt_trie::{KeyValueStore, MptDatabase, TrieId, ZkDatabase};

/// The extra-data written into the transition block's header. Detecting it on the head header
/// means the migration already sealed, making [StateMigrator::seal] idempotent.
pub const TRANSITION_EXTRA_DATA: &[u8] = b"BEDROCK";

// A longer sentinel would create an invalid block.
const _: () = assert!(TRANSITION_EXTRA_DATA.len() <= 32);

/// The protocol fee-vault predeploy, used as the transition block's coinbase.
pub const PROTOCOL_VAULT: Address = address!("4200000000000000000000000000000000000006");

/// Parameters of the transition block, fixed by the rollup deployment.
#[derive(Debug, Clone, Copy)]
pub struct SealConfig {
    /// The gas limit of the new genesis regime.
    pub gas_limit: u64,
    /// The timestamp the output oracle starts from.
    pub timestamp: u64,
    /// The initial EIP-1559 base fee.
    pub base_fee: u64,
    /// The transition block's coinbase.
    pub coinbase: Address,
}

impl Default for SealConfig {
    fn default() -> Self {
        Self {
            gas_limit: 30_000_000,
            timestamp: 0,
            base_fee: 1_000_000_000,
            coinbase: PROTOCOL_VAULT,
        }
    }
}

/// The output of the sealing step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationResult {
    /// The height of the transition block.
    pub transition_height: u64,
    /// The timestamp of the transition block.
    pub transition_timestamp: u64,
    /// The hash of the transition block.
    pub transition_block_hash: B256,
}

impl<S, Z, M, C> StateMigrator<S, Z, M, C>
where
    S: KeyValueStore,
    Z: ZkDatabase + Send + Sync + 'static,
    M: MptDatabase,
    C: ChainProvider,
{
    /// Seals the migration: builds the transition block on top of the current head, persists
    /// it with its canonical and head markers, and rewrites the chain config so every
    /// hard fork activates at the transition height.
    ///
    /// Running the sealer on an already-sealed database detects the sentinel extra-data and
    /// returns the existing result without touching the store.
    pub fn seal(&self, state_root: B256) -> MigrateResult<MigrationResult> {
        let head_hash =
            rawdb::read_head_header_hash(&self.store).ok_or(MigrateError::MissingHeadHeader)?;
        let head_number = rawdb::read_header_number(&self.store, head_hash)
            .ok_or(MigrateError::MissingHeadHeader)?;
        let head = rawdb::read_header(&self.store, head_hash, head_number)?
            .ok_or(MigrateError::MissingHeadHeader)?;
        info!(target: "seal", hash = %head_hash, number = head_number, "Read chain tip from database");

        if head.extra_data.as_ref() == TRANSITION_EXTRA_DATA {
            info!(
                target: "seal",
                root = %head.state_root,
                block_hash = %head_hash,
                "Detected migration already happened"
            );
            return Ok(MigrationResult {
                transition_height: head_number,
                transition_timestamp: head.timestamp,
                transition_block_hash: head_hash,
            });
        }

        // A final no-op commit of the state view forces a structural flush and yields the
        // canonical root the header will carry.
        let view = self.mpt.open(TrieId::state(state_root))?;
        let new_root = self.commit_trie(view)?;

        let header = Header {
            parent_hash: head.hash_slow(),
            ommers_hash: EMPTY_OMMER_ROOT_HASH,
            beneficiary: self.seal_config.coinbase,
            state_root: new_root,
            transactions_root: EMPTY_ROOT_HASH,
            receipts_root: EMPTY_ROOT_HASH,
            logs_bloom: Bloom::default(),
            difficulty: U256::ZERO,
            number: head.number + 1,
            gas_limit: self.seal_config.gas_limit,
            gas_used: 0,
            timestamp: self.seal_config.timestamp,
            extra_data: Bytes::from_static(TRANSITION_EXTRA_DATA),
            mix_hash: B256::ZERO,
            nonce: B64::ZERO,
            base_fee_per_gas: Some(self.seal_config.base_fee),
            ..Default::default()
        };
        let hash = header.hash_slow();
        info!(
            target: "seal",
            hash = %hash,
            root = %new_root,
            number = header.number,
            gas_limit = header.gas_limit,
            "Built transition block"
        );

        // The transition block carries no transactions, uncles, or receipts. Its total
        // difficulty carries the parent's forward.
        rawdb::write_td(&self.store, hash, header.number, head.difficulty)?;
        rawdb::write_header(&self.store, &header)?;
        rawdb::write_body(
            &self.store,
            hash,
            header.number,
            &rawdb::Body { transactions: vec![], ommers: vec![], withdrawals: None },
        )?;
        rawdb::write_empty_receipts(&self.store, hash, header.number)?;
        rawdb::write_canonical_hash(&self.store, hash, header.number)?;
        rawdb::write_head_block_hash(&self.store, hash)?;
        rawdb::write_head_fast_block_hash(&self.store, hash)?;
        rawdb::write_head_header_hash(&self.store, hash)?;
        rawdb::write_finalized_block_hash(&self.store, hash)?;

        let genesis_hash =
            rawdb::read_canonical_hash(&self.store, 0).ok_or(MigrateError::MissingGenesis)?;
        let mut config = rawdb::read_chain_config(&self.store, genesis_hash)?
            .ok_or(MigrateError::MissingChainConfig(genesis_hash))?;
        config.activate_transition(header.number);
        rawdb::write_chain_config(&self.store, genesis_hash, &config)?;
        info!(
            target: "seal",
            denominator = config.optimism.and_then(|p| p.eip1559_denominator),
            elasticity = config.optimism.and_then(|p| p.eip1559_elasticity),
            "Wrote chain config"
        );

        info!(
            target: "seal",
            height = header.number,
            root = %header.state_root,
            hash = %hash,
            timestamp = header.timestamp,
            "Wrote transition block"
        );

        Ok(MigrationResult {
            transition_height: header.number,
            transition_timestamp: header.timestamp,
            transition_block_hash: hash,
        })
    }
}
