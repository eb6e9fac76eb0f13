//! End-to-end migration scenarios over the in-memory reference backends.

use alloy_consensus::{
    constants::{EMPTY_ROOT_HASH, KECCAK_EMPTY},
    Header,
};
use alloy_genesis::Genesis;
use alloy_primitives::{address, hex, keccak256, Address, Bytes, B256, U256};
use std::{collections::BTreeMap, sync::Arc};
use zk2mpt_chain::{test_utils::TestChainProvider, AccountStateDiff, ProviderErrorKind, TxStateDiff};
use zk2mpt_migrate::{
    rawdb, MigrateError, MigrationRoot, SealConfig, StateMigrator, PROTOCOL_VAULT,
    TRANSITION_EXTRA_DATA,
};
use zk2mpt_trie::{
    KeyValueStore, MemoryKeyValueStore, MemoryMptDatabase, MemoryZkDatabase, MptDatabase,
    MptTrie, StateAccount, TrieId, ZkDatabase, ZkLeaf, ZK_NODE_TAG,
};

type SharedStore = Arc<MemoryKeyValueStore>;
type TestZk = MemoryZkDatabase<SharedStore>;
type TestMigrator =
    StateMigrator<SharedStore, TestZk, MemoryMptDatabase<SharedStore>, TestChainProvider>;

const HEAD_NUMBER: u64 = 4_061_223;
const HEAD_DIFFICULTY: u64 = 17;

const EOA: Address = address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
const CONTRACT: Address = address!("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb");
const CODE_HASH: B256 =
    alloy_primitives::b256!("cccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccc");

struct Harness {
    store: SharedStore,
    migrator: TestMigrator,
    head: Header,
}

/// Builds a chain database with a genesis block, a stored chain config, and a pre-migration
/// head header whose state root is produced by `build_source`.
fn harness(
    genesis_json: &str,
    provider: TestChainProvider,
    build_source: impl FnOnce(&TestZk) -> B256,
) -> Harness {
    let store = Arc::new(MemoryKeyValueStore::new());
    let zk = Arc::new(MemoryZkDatabase::new(store.clone()));
    let zk_root = build_source(zk.as_ref());

    let genesis_header = Header { number: 0, ..Default::default() };
    let genesis_hash = genesis_header.hash_slow();
    rawdb::write_header(&store, &genesis_header).unwrap();
    rawdb::write_canonical_hash(&store, genesis_hash, 0).unwrap();
    let config = serde_json::from_str(
        r#"{
            "chainId": 7791,
            "berlinBlock": 0,
            "kroma": {
                "eip1559Denominator": 50,
                "eip1559Elasticity": 6,
                "eip1559DenominatorCanyon": 250
            }
        }"#,
    )
    .unwrap();
    rawdb::write_chain_config(&store, genesis_hash, &config).unwrap();

    let head = Header {
        number: HEAD_NUMBER,
        state_root: zk_root,
        difficulty: U256::from(HEAD_DIFFICULTY),
        timestamp: 1_700_000_000,
        gas_limit: 30_000_000,
        ..Default::default()
    };
    rawdb::write_header(&store, &head).unwrap();
    rawdb::write_head_header_hash(&store, head.hash_slow()).unwrap();

    let genesis: Genesis = serde_json::from_str(genesis_json).unwrap();
    let mpt = MemoryMptDatabase::new(store.clone());
    let migrator = StateMigrator::new(
        store.clone(),
        zk.clone(),
        mpt,
        &genesis,
        provider,
        SealConfig {
            gas_limit: 30_000_000,
            timestamp: 1_720_000_000,
            base_fee: 1_000_000_000,
            coinbase: PROTOCOL_VAULT,
        },
    )
    .unwrap();
    Harness { store, migrator, head }
}

fn genesis_with(alloc: &str) -> String {
    format!(
        r#"{{"config":{{"chainId":7791}},"difficulty":"0x0","gasLimit":"0x1c9c380","alloc":{alloc}}}"#
    )
}

fn empty_genesis() -> String {
    genesis_with("{}")
}

fn account_blob(nonce: u64, balance: u64, zk_storage_root: B256, code_hash: B256) -> Bytes {
    alloy_rlp::encode(StateAccount {
        nonce,
        balance: U256::from(balance),
        storage_root: zk_storage_root,
        code_hash,
    })
    .into()
}

fn word(value: u64) -> B256 {
    B256::from(U256::from(value))
}

fn open_state(store: &SharedStore, root: B256) -> Box<dyn MptTrie> {
    MemoryMptDatabase::new(store.clone()).open(TrieId::state(root)).unwrap()
}

fn open_storage(store: &SharedStore, state_root: B256, owner: Address, root: B256) -> Box<dyn MptTrie> {
    MemoryMptDatabase::new(store.clone())
        .open(TrieId::storage(state_root, keccak256(owner), root))
        .unwrap()
}

/// Builds the canonical S3 source: one contract with two storage slots, slot 1 resolvable from
/// the genesis alloc and slot 2 from the preimage index.
fn contract_source(zk: &TestZk) -> B256 {
    let slot1 = zk.secure_hash(B256::with_last_byte(1).as_slice()).unwrap();
    let slot2 = zk.record_preimage(B256::with_last_byte(2).as_slice()).unwrap();
    let storage_root = zk
        .insert_trie(vec![
            ZkLeaf { key: slot1, blob: word(0xdead).to_vec().into() },
            ZkLeaf { key: slot2, blob: word(0xbeef).to_vec().into() },
        ])
        .unwrap();

    let key = zk.record_preimage(CONTRACT.as_slice()).unwrap();
    zk.insert_trie(vec![ZkLeaf { key, blob: account_blob(1, 0, storage_root, CODE_HASH) }])
        .unwrap()
}

fn contract_genesis() -> String {
    genesis_with(
        r#"{"0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb":{"balance":"0x0","storage":{
            "0x0000000000000000000000000000000000000000000000000000000000000001":
            "0x000000000000000000000000000000000000000000000000000000000000dead"
        }}}"#,
    )
}

#[test]
fn s1_empty_chain() {
    let h = harness(&empty_genesis(), TestChainProvider::default(), |_| B256::ZERO);

    let root = h.migrator.migrate_accounts().unwrap();
    assert_eq!(root, MigrationRoot { hash: EMPTY_ROOT_HASH, number: HEAD_NUMBER });

    let result = h.migrator.seal(root.hash).unwrap();
    assert_eq!(result.transition_height, HEAD_NUMBER + 1);

    let sealed = rawdb::read_head_header(&h.store).unwrap().unwrap();
    assert_eq!(sealed.extra_data.as_ref(), TRANSITION_EXTRA_DATA);
    assert_eq!(sealed.number, HEAD_NUMBER + 1);
    assert_eq!(sealed.parent_hash, h.head.hash_slow());
    assert_eq!(
        rawdb::read_canonical_hash(&h.store, HEAD_NUMBER + 1),
        Some(result.transition_block_hash)
    );
}

#[test]
fn s2_single_eoa() {
    // The EOA is allocated at genesis, so its leaf key resolves through the genesis map
    // without a preimage-index entry.
    let genesis = genesis_with(r#"{"0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa":{"balance":"0x3e8"}}"#);
    let h = harness(&genesis, TestChainProvider::default(), |zk| {
        let key = zk.secure_hash(EOA.as_slice()).unwrap();
        zk.insert_trie(vec![ZkLeaf { key, blob: account_blob(0, 1000, B256::ZERO, KECCAK_EMPTY) }])
            .unwrap()
    });

    let root = h.migrator.migrate_accounts().unwrap();
    let trie = open_state(&h.store, root.hash);
    let account = trie.get_account(EOA).unwrap().unwrap();
    assert_eq!(account.nonce, 0);
    assert_eq!(account.balance, U256::from(1000));
    assert_eq!(account.storage_root, EMPTY_ROOT_HASH);
    assert_eq!(account.code_hash, KECCAK_EMPTY);
}

#[test]
fn s3_contract_with_storage() {
    let h = harness(&contract_genesis(), TestChainProvider::default(), contract_source);

    let root = h.migrator.migrate_accounts().unwrap();
    let trie = open_state(&h.store, root.hash);
    let account = trie.get_account(CONTRACT).unwrap().unwrap();
    assert_eq!(account.code_hash, CODE_HASH);
    assert_ne!(account.storage_root, EMPTY_ROOT_HASH);

    // Values are stored as RLP with leading zeros stripped.
    let storage = open_storage(&h.store, root.hash, CONTRACT, account.storage_root);
    assert_eq!(
        storage.get_storage(B256::with_last_byte(1)).unwrap().unwrap(),
        Bytes::from_static(&hex!("82dead"))
    );
    assert_eq!(
        storage.get_storage(B256::with_last_byte(2)).unwrap().unwrap(),
        Bytes::from_static(&hex!("82beef"))
    );
}

#[test]
fn missing_account_preimage_is_fatal() {
    let h = harness(&empty_genesis(), TestChainProvider::default(), |zk| {
        // A leaf key with no genesis entry and no index entry.
        zk.insert_trie(vec![ZkLeaf {
            key: B256::with_last_byte(0x55),
            blob: account_blob(0, 1, B256::ZERO, KECCAK_EMPTY),
        }])
        .unwrap()
    });

    assert!(matches!(
        h.migrator.migrate_accounts(),
        Err(MigrateError::Oracle(zk2mpt_oracle::OracleError::MissingPreimage(_)))
    ));
}

#[test]
fn missing_slot_preimage_is_fatal_by_default() {
    let h = harness(&empty_genesis(), TestChainProvider::default(), |zk| {
        let storage_root = zk
            .insert_trie(vec![ZkLeaf {
                key: B256::with_last_byte(0x66),
                blob: word(1).to_vec().into(),
            }])
            .unwrap();
        let key = zk.record_preimage(CONTRACT.as_slice()).unwrap();
        zk.insert_trie(vec![ZkLeaf { key, blob: account_blob(1, 0, storage_root, CODE_HASH) }])
            .unwrap()
    });

    assert!(matches!(
        h.migrator.migrate_accounts(),
        Err(MigrateError::Oracle(zk2mpt_oracle::OracleError::MissingPreimage(_)))
    ));
}

#[test]
fn allowlisted_contract_skips_missing_slot() {
    let h = harness(&empty_genesis(), TestChainProvider::default(), |zk| {
        let storage_root = zk
            .insert_trie(vec![ZkLeaf {
                key: B256::with_last_byte(0x66),
                blob: word(1).to_vec().into(),
            }])
            .unwrap();
        let key = zk.record_preimage(CONTRACT.as_slice()).unwrap();
        zk.insert_trie(vec![ZkLeaf { key, blob: account_blob(1, 0, storage_root, CODE_HASH) }])
            .unwrap()
    });
    let migrator = h.migrator.with_missing_slot_allowlist([CONTRACT]);

    let root = migrator.migrate_accounts().unwrap();
    let trie = open_state(&h.store, root.hash);
    // The unresolvable slot was skipped, leaving the storage trie empty.
    let account = trie.get_account(CONTRACT).unwrap().unwrap();
    assert_eq!(account.storage_root, EMPTY_ROOT_HASH);
}

#[tokio::test]
async fn s4_delta_replay() {
    let mut provider = TestChainProvider::with_head(HEAD_NUMBER);
    provider.insert_trace(
        HEAD_NUMBER,
        vec![TxStateDiff {
            post: BTreeMap::from([(
                CONTRACT,
                AccountStateDiff {
                    nonce: Some(5),
                    storage: Some(BTreeMap::from([(B256::with_last_byte(1), word(0xfeed))])),
                    ..Default::default()
                },
            )]),
        }],
    );
    let mut h = harness(&contract_genesis(), provider, contract_source);

    let checkpoint = h.migrator.migrate_accounts().unwrap();
    let next = h.migrator.advance(checkpoint).await.unwrap().unwrap();
    assert_eq!(next.number, checkpoint.number + 1);
    assert_ne!(next.hash, checkpoint.hash);

    let trie = open_state(&h.store, next.hash);
    let account = trie.get_account(CONTRACT).unwrap().unwrap();
    assert_eq!(account.nonce, 5);
    assert_eq!(account.code_hash, CODE_HASH);

    let storage = open_storage(&h.store, next.hash, CONTRACT, account.storage_root);
    assert_eq!(
        storage.get_storage(B256::with_last_byte(1)).unwrap().unwrap(),
        Bytes::from_static(&hex!("82feed"))
    );
    // The untouched slot survives the replay.
    assert_eq!(
        storage.get_storage(B256::with_last_byte(2)).unwrap().unwrap(),
        Bytes::from_static(&hex!("82beef"))
    );
}

#[tokio::test]
async fn delta_on_absent_account_starts_empty() {
    let fresh = address!("1111111111111111111111111111111111111111");
    let mut provider = TestChainProvider::with_head(HEAD_NUMBER);
    provider.insert_trace(
        HEAD_NUMBER,
        vec![TxStateDiff {
            post: BTreeMap::from([(
                fresh,
                AccountStateDiff {
                    balance: Some(U256::from(777)),
                    ..Default::default()
                },
            )]),
        }],
    );
    let mut h = harness(&empty_genesis(), provider, |_| B256::ZERO);

    let checkpoint = h.migrator.migrate_accounts().unwrap();
    let next = h.migrator.advance(checkpoint).await.unwrap().unwrap();

    let account = open_state(&h.store, next.hash).get_account(fresh).unwrap().unwrap();
    assert_eq!(account.balance, U256::from(777));
    assert_eq!(account.nonce, 0);
    assert_eq!(account.storage_root, EMPTY_ROOT_HASH);
    assert_eq!(account.code_hash, KECCAK_EMPTY);
}

#[tokio::test]
async fn p7_unknown_delta_field_aborts() {
    let mut provider = TestChainProvider::with_head(HEAD_NUMBER);
    provider.insert_trace(
        HEAD_NUMBER,
        vec![TxStateDiff {
            post: BTreeMap::from([(
                EOA,
                AccountStateDiff {
                    nonce: Some(1),
                    unknown: BTreeMap::from([(
                        "code".to_string(),
                        serde_json::json!("0x60806040"),
                    )]),
                    ..Default::default()
                },
            )]),
        }],
    );
    let mut h = harness(&empty_genesis(), provider, |_| B256::ZERO);

    let checkpoint = h.migrator.migrate_accounts().unwrap();
    assert!(matches!(
        h.migrator.advance(checkpoint).await,
        Err(MigrateError::UnknownDeltaField { address, ref field }) if address == EOA && field.as_str() == "code"
    ));
}

#[tokio::test]
async fn p5_checkpoint_monotonicity() {
    let mut provider = TestChainProvider::with_head(HEAD_NUMBER + 1);
    provider.insert_trace(HEAD_NUMBER, vec![]);
    provider.insert_trace(HEAD_NUMBER + 1, vec![]);
    let mut h = harness(&empty_genesis(), provider, |_| B256::ZERO);

    let mut checkpoint = h.migrator.migrate_accounts().unwrap();
    checkpoint.save(&h.store).unwrap();

    for expected in [HEAD_NUMBER + 1, HEAD_NUMBER + 2] {
        let next = h.migrator.advance(checkpoint).await.unwrap().unwrap();
        assert_eq!(next.number, expected);
        next.save(&h.store).unwrap();
        assert_eq!(MigrationRoot::load(&h.store).unwrap(), Some(next));
        checkpoint = next;
    }

    // Caught up: the cursor is one past head.
    assert_eq!(h.migrator.advance(checkpoint).await.unwrap(), None);
}

#[tokio::test]
async fn p6_crash_safety() {
    let delta = TxStateDiff {
        post: BTreeMap::from([(
            CONTRACT,
            AccountStateDiff { nonce: Some(9), ..Default::default() },
        )]),
    };
    let second_delta = TxStateDiff {
        post: BTreeMap::from([(
            CONTRACT,
            AccountStateDiff { balance: Some(U256::from(31337)), ..Default::default() },
        )]),
    };
    let provider_traces = |provider: &mut TestChainProvider| {
        provider.head = HEAD_NUMBER + 1;
        provider.insert_trace(HEAD_NUMBER, vec![delta.clone()]);
        provider.insert_trace(HEAD_NUMBER + 1, vec![second_delta.clone()]);
    };

    // Uninterrupted run.
    let mut provider = TestChainProvider::default();
    provider_traces(&mut provider);
    let mut uninterrupted = harness(&contract_genesis(), provider, contract_source);
    let mut checkpoint = uninterrupted.migrator.migrate_accounts().unwrap();
    for _ in 0..2 {
        checkpoint = uninterrupted.migrator.advance(checkpoint).await.unwrap().unwrap();
    }

    // Interrupted run: crash after the first follower iteration, then resume on a fresh
    // migrator over the same store.
    let mut provider = TestChainProvider::default();
    provider_traces(&mut provider);
    let mut h = harness(&contract_genesis(), provider, contract_source);
    let first = h.migrator.migrate_accounts().unwrap();
    first.save(&h.store).unwrap();
    let second = h.migrator.advance(first).await.unwrap().unwrap();
    second.save(&h.store).unwrap();
    drop(h.migrator);

    let mut provider = TestChainProvider::default();
    provider_traces(&mut provider);
    let genesis: Genesis = serde_json::from_str(&contract_genesis()).unwrap();
    let mut resumed = StateMigrator::new(
        h.store.clone(),
        Arc::new(MemoryZkDatabase::new(h.store.clone())),
        MemoryMptDatabase::new(h.store.clone()),
        &genesis,
        provider,
        SealConfig {
            gas_limit: 30_000_000,
            timestamp: 1_720_000_000,
            base_fee: 1_000_000_000,
            coinbase: PROTOCOL_VAULT,
        },
    )
    .unwrap();

    let persisted = MigrationRoot::load(&h.store).unwrap().unwrap();
    assert_eq!(persisted, second);
    let finished = resumed.advance(persisted).await.unwrap().unwrap();

    assert_eq!(finished, checkpoint);
}

#[test]
fn s5_idempotent_reseal() {
    let h = harness(&contract_genesis(), TestChainProvider::default(), contract_source);

    let root = h.migrator.migrate_accounts().unwrap();
    let first = h.migrator.seal(root.hash).unwrap();
    assert_eq!(
        rawdb::read_td(&h.store, first.transition_block_hash, first.transition_height)
            .unwrap(),
        Some(U256::from(HEAD_DIFFICULTY))
    );

    let snapshot = h.store.export();
    let second = h.migrator.seal(root.hash).unwrap();
    assert_eq!(first, second);
    // The second run must not mutate the backing store.
    assert_eq!(h.store.export(), snapshot);
}

#[test]
fn s6_sentinel_respect() {
    let h = harness(&empty_genesis(), TestChainProvider::default(), |_| B256::ZERO);

    // Pre-populate the head with the sentinel, as if a previous process already sealed.
    let sealed_head = Header {
        number: HEAD_NUMBER + 1,
        extra_data: Bytes::from_static(TRANSITION_EXTRA_DATA),
        timestamp: 1_720_000_000,
        ..Default::default()
    };
    rawdb::write_header(&h.store, &sealed_head).unwrap();
    rawdb::write_head_header_hash(&h.store, sealed_head.hash_slow()).unwrap();

    let snapshot = h.store.export();
    let result = h.migrator.seal(EMPTY_ROOT_HASH).unwrap();
    assert_eq!(result.transition_height, HEAD_NUMBER + 1);
    assert_eq!(result.transition_timestamp, 1_720_000_000);
    assert_eq!(result.transition_block_hash, sealed_head.hash_slow());
    assert_eq!(h.store.export(), snapshot);
}

#[test]
fn p3_determinism() {
    let run = || {
        let h = harness(&contract_genesis(), TestChainProvider::default(), contract_source);
        let root = h.migrator.migrate_accounts().unwrap();
        let result = h.migrator.seal(root.hash).unwrap();
        (root.hash, result.transition_block_hash)
    };

    assert_eq!(run(), run());
}

#[test]
fn p8_hash_collision_guard() {
    let genesis = genesis_with(r#"{"0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa":{"balance":"0x3e8"}}"#);
    let h = harness(&genesis, TestChainProvider::default(), |zk| {
        let key = zk.secure_hash(EOA.as_slice()).unwrap();
        zk.insert_trie(vec![ZkLeaf { key, blob: account_blob(0, 1000, B256::ZERO, KECCAK_EMPTY) }])
            .unwrap()
    });

    // Predict a node hash of the trie the migration is about to build, and plant bytes there
    // that decode as a zkTrie node.
    let probe_db = MemoryMptDatabase::new(Arc::new(MemoryKeyValueStore::new()));
    let mut probe = probe_db.open(TrieId::state(EMPTY_ROOT_HASH)).unwrap();
    probe
        .update_account(
            EOA,
            &StateAccount {
                nonce: 0,
                balance: U256::from(1000),
                storage_root: EMPTY_ROOT_HASH,
                code_hash: KECCAK_EMPTY,
            },
        )
        .unwrap();
    let colliding = probe.node_hashes()[0];

    let mut planted = vec![ZK_NODE_TAG];
    planted.extend_from_slice(&[0u8; 64]);
    h.store.put(colliding.as_slice(), planted).unwrap();

    assert!(matches!(
        h.migrator.migrate_accounts(),
        Err(MigrateError::HashCollision(hash)) if hash == colliding
    ));
}

#[tokio::test]
async fn transient_provider_failure_retries() {
    let mut provider = TestChainProvider::with_head(HEAD_NUMBER);
    provider.push_error(ProviderErrorKind::Temporary("connection refused".to_string()));
    let mut h = harness(&empty_genesis(), provider, |_| B256::ZERO);

    let checkpoint = h.migrator.migrate_accounts().unwrap();
    // The transient failure is absorbed; the caller sleeps and retries.
    assert_eq!(h.migrator.advance(checkpoint).await.unwrap(), None);
}

#[tokio::test]
async fn critical_provider_failure_aborts() {
    let mut provider = TestChainProvider::with_head(HEAD_NUMBER);
    provider.push_error(ProviderErrorKind::Critical("unexpected trace shape".to_string()));
    let mut h = harness(&empty_genesis(), provider, |_| B256::ZERO);

    let checkpoint = h.migrator.migrate_accounts().unwrap();
    assert!(matches!(
        h.migrator.advance(checkpoint).await,
        Err(MigrateError::Provider(_))
    ));
}

#[tokio::test]
async fn caught_up_returns_none() {
    let provider = TestChainProvider::with_head(HEAD_NUMBER.saturating_sub(1));
    let mut h = harness(&empty_genesis(), provider, |_| B256::ZERO);

    let checkpoint = h.migrator.migrate_accounts().unwrap();
    assert_eq!(h.migrator.advance(checkpoint).await.unwrap(), None);
}
