//! Contains the state-diff follower: a two-state loop that keeps the migrated trie in sync
//! with the source chain, one block at a time.

use crate::{migrator::encode_storage_value, MigrateError, MigrateResult, MigrationRoot, StateMigrator};
use alloy_consensus::constants::{EMPTY_ROOT_HASH, KECCAK_EMPTY};
use alloy_primitives::{keccak256, Address, B256, U256};
use std::time::Duration;
use tracing::{debug, info, warn};
use zk2mpt_chain::{AccountStateDiff, ChainProvider, ProviderErrorKind};
use zk2mpt_trie::{KeyValueStore, MptDatabase, MptTrie, StateAccount, TrieId, ZkDatabase};

/// The cadence of head polls while caught up, and of retries after a transient provider
/// failure.
pub const POLL_INTERVAL: Duration = Duration::from_secs(2);

impl<S, Z, M, C> StateMigrator<S, Z, M, C>
where
    S: KeyValueStore,
    Z: ZkDatabase + Send + Sync + 'static,
    M: MptDatabase,
    C: ChainProvider,
    C::Error: Into<ProviderErrorKind>,
{
    /// Follows the source chain indefinitely, persisting the checkpoint after every applied
    /// block. The checkpoint write happens strictly after the trie commit, so a crash between
    /// iterations redoes at most one block.
    pub async fn follow(&mut self, mut checkpoint: MigrationRoot) -> MigrateResult<()> {
        loop {
            match self.advance(checkpoint).await? {
                Some(next) => {
                    next.save(&self.store)?;
                    checkpoint = next;
                }
                None => tokio::time::sleep(POLL_INTERVAL).await,
            }
        }
    }

    /// Applies the post-state diff of the block at the checkpoint cursor, if the source chain
    /// has it. Returns the advanced checkpoint, or [None] when caught up or after a transient
    /// provider failure (the caller sleeps and retries either way).
    pub async fn advance(&mut self, root: MigrationRoot) -> MigrateResult<Option<MigrationRoot>> {
        let head = match self.chain.block_number().await {
            Ok(head) => head,
            Err(e) => return transient(e),
        };
        if root.number > head {
            debug!(target: "follower", number = root.number, head, "Caught up with source head");
            return Ok(None);
        }
        info!(
            target: "follower",
            number = root.number,
            head,
            remaining = head - root.number,
            "Applying state transition"
        );

        let diffs = match self.chain.trace_block(root.number).await {
            Ok(diffs) => diffs,
            Err(e) => return transient(e),
        };

        let mut mpt = self.mpt.open(TrieId::state(root.hash))?;
        for tx in diffs {
            for (address, delta) in tx.post {
                let prior = mpt.get_account(address)?;
                let next = self.apply_delta(address, prior, delta, root.hash)?;
                mpt.update_account(address, &next)?;
            }
        }
        let hash = self.commit_trie(mpt)?;
        Ok(Some(MigrationRoot { hash, number: root.number + 1 }))
    }

    /// Applies one account's delta on top of its prior state. An absent account starts empty.
    /// A delta field the core does not recognize aborts the migration: applying the rest would
    /// silently produce a wrong root.
    pub(crate) fn apply_delta(
        &self,
        address: Address,
        prior: Option<StateAccount>,
        delta: AccountStateDiff,
        state_root: B256,
    ) -> MigrateResult<StateAccount> {
        if let Some(field) = delta.unknown_field() {
            return Err(MigrateError::UnknownDeltaField { address, field: field.to_string() });
        }

        let mut account = prior.unwrap_or_else(empty_account);
        if let Some(balance) = delta.balance {
            account.balance = balance;
        }
        if let Some(nonce) = delta.nonce {
            account.nonce = nonce;
        }
        if let Some(storage) = delta.storage {
            let mut trie = self.mpt.open(TrieId::storage(
                state_root,
                keccak256(address),
                account.storage_root,
            ))?;
            for (slot, value) in storage {
                trie.update_storage(slot, encode_storage_value(value.as_slice()))?;
            }
            account.storage_root = self.commit_trie(trie)?;
        }
        Ok(account)
    }
}

/// A fresh account with nothing in it, the base state for deltas touching addresses the trie
/// has never seen.
fn empty_account() -> StateAccount {
    StateAccount {
        nonce: 0,
        balance: U256::ZERO,
        storage_root: EMPTY_ROOT_HASH,
        code_hash: KECCAK_EMPTY,
    }
}

/// Classifies a provider failure: temporary kinds are logged and absorbed into the polling
/// cadence, critical kinds abort.
fn transient<E: Into<ProviderErrorKind>>(e: E) -> MigrateResult<Option<MigrationRoot>> {
    match e.into() {
        ProviderErrorKind::Temporary(msg) => {
            warn!(target: "follower", error = %msg, "Transient provider failure, retrying");
            Ok(None)
        }
        ProviderErrorKind::Critical(msg) => Err(MigrateError::Provider(msg)),
    }
}
