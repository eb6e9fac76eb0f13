//! The chain-database key schema over the backing [KeyValueStore].
//!
//! Layout (shared with the node that owns the database):
//!
//! - `b"h"` + number (8-byte BE) + hash → RLP header
//! - `b"h"` + number (8-byte BE) + hash + `b"t"` → RLP total difficulty
//! - `b"h"` + number (8-byte BE) + `b"n"` → canonical block hash
//! - `b"H"` + hash → block number (8-byte BE)
//! - `b"b"` + number (8-byte BE) + hash → RLP block body
//! - `b"r"` + number (8-byte BE) + hash → RLP receipts
//! - `b"LastHeader"` / `b"LastBlock"` / `b"LastFast"` / `b"LastFinalized"` → head marker hashes
//! - `b"ethereum-config-"` + genesis hash → JSON chain config

use crate::{ChainConfig, MigrateError, MigrateResult};
use alloy_consensus::{BlockBody, Header, TxEnvelope};
use alloy_primitives::{B256, U256};
use alloy_rlp::Decodable;
use zk2mpt_trie::KeyValueStore;

const HEADER_PREFIX: u8 = b'h';
const HEADER_TD_SUFFIX: u8 = b't';
const HEADER_HASH_SUFFIX: u8 = b'n';
const HEADER_NUMBER_PREFIX: u8 = b'H';
const BLOCK_BODY_PREFIX: u8 = b'b';
const RECEIPTS_PREFIX: u8 = b'r';

const HEAD_HEADER_KEY: &[u8] = b"LastHeader";
const HEAD_BLOCK_KEY: &[u8] = b"LastBlock";
const HEAD_FAST_BLOCK_KEY: &[u8] = b"LastFast";
const FINALIZED_BLOCK_KEY: &[u8] = b"LastFinalized";
const CONFIG_PREFIX: &[u8] = b"ethereum-config-";

/// The block body type persisted by the transition-block builder.
pub type Body = BlockBody<TxEnvelope>;

fn prefixed_key(prefix: u8, number: u64, hash: B256) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + 8 + 32);
    key.push(prefix);
    key.extend_from_slice(&number.to_be_bytes());
    key.extend_from_slice(hash.as_slice());
    key
}

fn canonical_key(number: u64) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + 8 + 1);
    key.push(HEADER_PREFIX);
    key.extend_from_slice(&number.to_be_bytes());
    key.push(HEADER_HASH_SUFFIX);
    key
}

fn header_number_key(hash: B256) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + 32);
    key.push(HEADER_NUMBER_PREFIX);
    key.extend_from_slice(hash.as_slice());
    key
}

fn td_key(number: u64, hash: B256) -> Vec<u8> {
    let mut key = prefixed_key(HEADER_PREFIX, number, hash);
    key.push(HEADER_TD_SUFFIX);
    key
}

fn config_key(genesis_hash: B256) -> Vec<u8> {
    let mut key = Vec::with_capacity(CONFIG_PREFIX.len() + 32);
    key.extend_from_slice(CONFIG_PREFIX);
    key.extend_from_slice(genesis_hash.as_slice());
    key
}

/// Persists a header and its hash → number index entry.
pub fn write_header<S: KeyValueStore>(store: &S, header: &Header) -> MigrateResult<()> {
    let hash = header.hash_slow();
    store.put(&header_number_key(hash), header.number.to_be_bytes().to_vec())?;
    store.put(
        &prefixed_key(HEADER_PREFIX, header.number, hash),
        alloy_rlp::encode(header),
    )?;
    Ok(())
}

/// Reads the header stored under `(number, hash)`.
pub fn read_header<S: KeyValueStore>(
    store: &S,
    hash: B256,
    number: u64,
) -> MigrateResult<Option<Header>> {
    store
        .get(&prefixed_key(HEADER_PREFIX, number, hash))
        .map(|raw| Header::decode(&mut raw.as_slice()).map_err(MigrateError::Rlp))
        .transpose()
}

/// Reads the block number a header hash is indexed under.
pub fn read_header_number<S: KeyValueStore>(store: &S, hash: B256) -> Option<u64> {
    let raw = store.get(&header_number_key(hash))?;
    Some(u64::from_be_bytes(raw.try_into().ok()?))
}

/// Reads the head header: the `LastHeader` marker resolved through the number index.
pub fn read_head_header<S: KeyValueStore>(store: &S) -> MigrateResult<Option<Header>> {
    let Some(hash) = read_head_header_hash(store) else {
        return Ok(None);
    };
    let Some(number) = read_header_number(store, hash) else {
        return Ok(None);
    };
    read_header(store, hash, number)
}

/// Reads the `LastHeader` marker.
pub fn read_head_header_hash<S: KeyValueStore>(store: &S) -> Option<B256> {
    let raw = store.get(HEAD_HEADER_KEY)?;
    Some(B256::from_slice(&raw))
}

/// Persists a block body under `(number, hash)`.
pub fn write_body<S: KeyValueStore>(
    store: &S,
    hash: B256,
    number: u64,
    body: &Body,
) -> MigrateResult<()> {
    store.put(&prefixed_key(BLOCK_BODY_PREFIX, number, hash), alloy_rlp::encode(body))?;
    Ok(())
}

/// Reads the block body stored under `(number, hash)`.
pub fn read_body<S: KeyValueStore>(
    store: &S,
    hash: B256,
    number: u64,
) -> MigrateResult<Option<Body>> {
    store
        .get(&prefixed_key(BLOCK_BODY_PREFIX, number, hash))
        .map(|raw| Body::decode(&mut raw.as_slice()).map_err(MigrateError::Rlp))
        .transpose()
}

/// Persists an empty receipts list under `(number, hash)`. The transition block carries no
/// transactions, so its receipts are always empty.
pub fn write_empty_receipts<S: KeyValueStore>(
    store: &S,
    hash: B256,
    number: u64,
) -> MigrateResult<()> {
    store.put(
        &prefixed_key(RECEIPTS_PREFIX, number, hash),
        vec![alloy_rlp::EMPTY_LIST_CODE],
    )?;
    Ok(())
}

/// Persists the total difficulty of `(number, hash)`.
pub fn write_td<S: KeyValueStore>(
    store: &S,
    hash: B256,
    number: u64,
    td: U256,
) -> MigrateResult<()> {
    store.put(&td_key(number, hash), alloy_rlp::encode(td))?;
    Ok(())
}

/// Reads the total difficulty stored under `(number, hash)`.
pub fn read_td<S: KeyValueStore>(
    store: &S,
    hash: B256,
    number: u64,
) -> MigrateResult<Option<U256>> {
    store
        .get(&td_key(number, hash))
        .map(|raw| U256::decode(&mut raw.as_slice()).map_err(MigrateError::Rlp))
        .transpose()
}

/// Maps a block number to its canonical hash.
pub fn write_canonical_hash<S: KeyValueStore>(
    store: &S,
    hash: B256,
    number: u64,
) -> MigrateResult<()> {
    store.put(&canonical_key(number), hash.to_vec())?;
    Ok(())
}

/// Reads the canonical hash at a block number.
pub fn read_canonical_hash<S: KeyValueStore>(store: &S, number: u64) -> Option<B256> {
    let raw = store.get(&canonical_key(number))?;
    Some(B256::from_slice(&raw))
}

/// Writes the `LastHeader` marker.
pub fn write_head_header_hash<S: KeyValueStore>(store: &S, hash: B256) -> MigrateResult<()> {
    store.put(HEAD_HEADER_KEY, hash.to_vec())?;
    Ok(())
}

/// Writes the `LastBlock` marker.
pub fn write_head_block_hash<S: KeyValueStore>(store: &S, hash: B256) -> MigrateResult<()> {
    store.put(HEAD_BLOCK_KEY, hash.to_vec())?;
    Ok(())
}

/// Writes the `LastFast` marker.
pub fn write_head_fast_block_hash<S: KeyValueStore>(store: &S, hash: B256) -> MigrateResult<()> {
    store.put(HEAD_FAST_BLOCK_KEY, hash.to_vec())?;
    Ok(())
}

/// Writes the `LastFinalized` marker.
pub fn write_finalized_block_hash<S: KeyValueStore>(store: &S, hash: B256) -> MigrateResult<()> {
    store.put(FINALIZED_BLOCK_KEY, hash.to_vec())?;
    Ok(())
}

/// Reads the chain config stored at the genesis hash.
pub fn read_chain_config<S: KeyValueStore>(
    store: &S,
    genesis_hash: B256,
) -> MigrateResult<Option<ChainConfig>> {
    store
        .get(&config_key(genesis_hash))
        .map(|raw| serde_json::from_slice(&raw).map_err(MigrateError::ConfigCodec))
        .transpose()
}

/// Persists the chain config at the genesis hash.
pub fn write_chain_config<S: KeyValueStore>(
    store: &S,
    genesis_hash: B256,
    config: &ChainConfig,
) -> MigrateResult<()> {
    store.put(&config_key(genesis_hash), serde_json::to_vec(config)?)?;
    Ok(())
}
