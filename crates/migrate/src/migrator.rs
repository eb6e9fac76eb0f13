//! Contains the [StateMigrator], the single worker driving the migration pipeline end-to-end.

use crate::{MigrateError, MigrateResult, MigrationRoot, SealConfig, Status};
use alloy_consensus::constants::EMPTY_ROOT_HASH;
use alloy_genesis::Genesis;
use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use std::{collections::HashSet, sync::Arc};
use tracing::{debug, error, info, warn};
use zk2mpt_chain::ChainProvider;
use zk2mpt_oracle::{GenesisAlloc, OracleError, PreimageOracle};
use zk2mpt_trie::{KeyValueStore, MptDatabase, MptTrie, TrieId, ZkDatabase};

/// Drives the migration: the initial dual-trie transformation, the transition-block sealing,
/// and the per-block state-diff follower.
///
/// There is exactly one [StateMigrator] per backing store, and it owns the pipeline
/// end-to-end. The trie commit path is the bottleneck, so no parallelism is attempted; this
/// also keeps the checkpoint's at-most-one-redone-block guarantee trivial.
pub struct StateMigrator<S, Z, M, C> {
    pub(crate) store: S,
    pub(crate) zk: Arc<Z>,
    pub(crate) mpt: M,
    pub(crate) oracle: PreimageOracle,
    pub(crate) chain: C,
    pub(crate) seal_config: SealConfig,
    missing_slot_allowlist: HashSet<Address>,
}

impl<S, Z, M, C> core::fmt::Debug for StateMigrator<S, Z, M, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StateMigrator")
            .field("seal_config", &self.seal_config)
            .field("missing_slot_allowlist", &self.missing_slot_allowlist)
            .finish()
    }
}

impl<S, Z, M, C> StateMigrator<S, Z, M, C>
where
    S: KeyValueStore,
    Z: ZkDatabase + Send + Sync + 'static,
    M: MptDatabase,
    C: ChainProvider,
{
    /// Creates a new [StateMigrator], building the preimage oracle from the genesis allocation.
    pub fn new(
        store: S,
        zk: Arc<Z>,
        mpt: M,
        genesis: &Genesis,
        chain: C,
        seal_config: SealConfig,
    ) -> MigrateResult<Self> {
        let alloc = GenesisAlloc::from_genesis(genesis, zk.as_ref())?;
        info!(
            target: "migrate",
            accounts = alloc.account_count(),
            slots = alloc.storage_count(),
            "Loaded genesis allocation preimages"
        );
        let oracle = PreimageOracle::new(alloc, zk.clone());
        Ok(Self {
            store,
            zk,
            mpt,
            oracle,
            chain,
            seal_config,
            missing_slot_allowlist: HashSet::new(),
        })
    }

    /// Sets the contracts whose storage slots may be skipped when their preimage is missing.
    /// By default a missing slot preimage aborts the migration.
    pub fn with_missing_slot_allowlist(
        mut self,
        allowlist: impl IntoIterator<Item = Address>,
    ) -> Self {
        self.missing_slot_allowlist = allowlist.into_iter().collect();
        self
    }

    /// Migrates the entire account trie rooted at the head header's state root into a fresh
    /// MPT, recursing into each account's storage trie, and returns the committed root paired
    /// with the head block number.
    pub fn migrate_accounts(&self) -> MigrateResult<MigrationRoot> {
        let header =
            crate::rawdb::read_head_header(&self.store)?.ok_or(MigrateError::MissingHeadHeader)?;
        info!(
            target: "migrate",
            root = %header.state_root,
            number = header.number,
            "Starting migration at account root"
        );

        let mut status = Status::new("account");
        let mut mpt = self.mpt.open(TrieId::state(EMPTY_ROOT_HASH))?;
        for leaf in self.zk.iter_leaves(header.state_root)? {
            let leaf = leaf?;
            let address = self.oracle.resolve_address(leaf.key)?;
            let mut account = self.zk.decode_account(&leaf.blob)?;
            account.storage_root = self.migrate_storage(address, account.storage_root)?;
            mpt.update_account(address, &account)?;
            debug!(target: "migrate", account = %address, index = %leaf.key, "Migrated account");
            status.tick();
        }

        self.assert_disjoint(mpt.as_ref())?;
        status.begin_commit();
        let root = self.commit_trie(mpt)?;
        status.complete();
        info!(target: "migrate", root = %root, number = header.number, "Account migration complete");
        Ok(MigrationRoot { hash: root, number: header.number })
    }

    /// Migrates one account's storage trie. The empty source root maps to the empty MPT root
    /// without opening anything.
    pub(crate) fn migrate_storage(
        &self,
        address: Address,
        zk_storage_root: B256,
    ) -> MigrateResult<B256> {
        if zk_storage_root == self.zk.empty_root() {
            return Ok(EMPTY_ROOT_HASH);
        }

        let mut status = Status::new("storage");
        let mut mpt = self.mpt.open(TrieId::storage(
            EMPTY_ROOT_HASH,
            keccak256(address),
            EMPTY_ROOT_HASH,
        ))?;
        for leaf in self.zk.iter_leaves(zk_storage_root)? {
            let leaf = leaf?;
            let slot = match self.oracle.resolve_slot(leaf.key) {
                Ok(slot) => slot,
                Err(OracleError::MissingPreimage(key_hash))
                    if self.missing_slot_allowlist.contains(&address) =>
                {
                    warn!(
                        target: "migrate",
                        contract = %address,
                        index = %key_hash,
                        "Skipping storage slot with missing preimage (allow-listed contract)"
                    );
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            mpt.update_storage(slot, encode_storage_value(&leaf.blob))?;
            status.tick();
        }

        self.assert_disjoint(mpt.as_ref())?;
        status.begin_commit();
        let root = self.commit_trie(mpt)?;
        if status.count() > 0 {
            debug!(target: "migrate", contract = %address, slots = status.count(), root = %root, "Migrated contract storage");
        }
        Ok(root)
    }

    /// The hash-collision guard: probes the backing store at every node hash of the built trie
    /// and aborts if any already holds a zkTrie node. The Keccak and Poseidon key spaces are
    /// disjoint by construction; a hit here means a blind write would destroy source data.
    pub(crate) fn assert_disjoint(&self, mpt: &dyn MptTrie) -> MigrateResult<()> {
        for hash in mpt.node_hashes() {
            let Some(blob) = self.store.get(hash.as_slice()) else {
                continue;
            };
            if self.zk.is_node(&blob) {
                error!(target: "migrate", node = %hash, "Hash collision detected");
                return Err(MigrateError::HashCollision(hash));
            }
        }
        Ok(())
    }

    /// The scoped commit: commit the trie, merge its node set into the trie database, and
    /// force-commit the database at the new root. The three steps appear together or not at
    /// all.
    pub(crate) fn commit_trie(&self, trie: Box<dyn MptTrie>) -> MigrateResult<B256> {
        let (root, set) = trie.commit()?;
        self.mpt.merge(root, set)?;
        self.mpt.commit(root)?;
        Ok(root)
    }
}

impl<S, Z, M, C> StateMigrator<S, Z, M, C>
where
    S: KeyValueStore,
    Z: ZkDatabase + Send + Sync + 'static,
    M: MptDatabase,
    C: ChainProvider,
    C::Error: Into<zk2mpt_chain::ProviderErrorKind>,
{
    /// Runs the full pipeline: the initial account migration (unless a checkpoint says it
    /// already ran), the transition-block sealing, then the follower loop. Only returns on
    /// error; cancellation is the process being killed, which is safe because the checkpoint
    /// is written strictly after each commit.
    pub async fn run(&mut self) -> MigrateResult<()> {
        let checkpoint = match MigrationRoot::load(&self.store)? {
            Some(checkpoint) => {
                info!(
                    target: "migrate",
                    root = %checkpoint.hash,
                    number = checkpoint.number,
                    "Resuming from persisted migration root"
                );
                checkpoint
            }
            None => {
                let root = self.migrate_accounts()?;
                root.save(&self.store)?;
                root
            }
        };

        let result = self.seal(checkpoint.hash)?;
        info!(
            target: "migrate",
            height = result.transition_height,
            timestamp = result.transition_timestamp,
            block_hash = %result.transition_block_hash,
            "Migration sealed"
        );

        self.follow(checkpoint).await
    }
}

/// Encodes a 256-bit storage value the way the MPT stores it: interpreted as a word, leading
/// zero bytes stripped, then RLP encoded.
pub(crate) fn encode_storage_value(blob: &[u8]) -> Bytes {
    alloy_rlp::encode(U256::from_be_bytes(to_word(blob).0)).into()
}

/// Left-pads (or left-truncates) arbitrary bytes into a 32-byte word.
fn to_word(bytes: &[u8]) -> B256 {
    let mut word = B256::ZERO;
    if bytes.len() >= 32 {
        word[..].copy_from_slice(&bytes[bytes.len() - 32..]);
    } else {
        word[32 - bytes.len()..].copy_from_slice(bytes);
    }
    word
}
