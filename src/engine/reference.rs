//! Reference index engine
//!
//! Deterministic engine with **no confidentiality**: chain rows hold encoded
//! IndexedValues in clear. It honours the full engine contract (codec-framed
//! callbacks, depth bound, cycle detection, early stop, per-keyword limit).
//!
//! Row layout:
//! - Entry: `uid = H("findex.entry", search_key, label, keyword)`,
//!   `value = owner fingerprint (8 bytes) || LEB128 chain count`
//! - Chain: `uid = H("findex.chain", search_key, label, keyword, n as u64 BE)`,
//!   `value = encoded IndexedValue`

use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tracing::{debug, trace};

use crate::codec::{
    decode_indexed_value, deserialize_map, leb128, serialize_list, serialize_map, FindexKey,
    IndexedValueKind, Keyword, Label,
};
use crate::error::{CodecError, EngineError};
use crate::traits::{EngineCallbacks, IndexEngine, Progress, SearchRequest, UpsertRequest};

const ENTRY_DOMAIN: &[u8] = b"findex.entry";
const CHAIN_DOMAIN: &[u8] = b"findex.chain";
const OWNER_DOMAIN: &[u8] = b"findex.owner";

/// Length of the update key fingerprint stored in entry rows
const OWNER_LEN: usize = 8;

/// Non-confidential engine for tests and local demos
#[derive(Debug, Clone, Default)]
pub struct ReferenceEngine;

impl ReferenceEngine {
    pub fn new() -> Self {
        Self
    }
}

/// SHA-256 over LEB128 length-prefixed fields
fn hash_fields(fields: &[&[u8]]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    let mut prefix = Vec::with_capacity(10);
    for field in fields {
        prefix.clear();
        leb128::write_unsigned(&mut prefix, field.len() as u64);
        hasher.update(&prefix);
        hasher.update(field);
    }
    hasher.finalize().to_vec()
}

fn entry_uid(key: &FindexKey, label: &Label, keyword: &Keyword) -> Vec<u8> {
    hash_fields(&[
        ENTRY_DOMAIN,
        key.as_bytes(),
        label.as_bytes(),
        keyword.as_bytes(),
    ])
}

fn chain_uid(key: &FindexKey, label: &Label, keyword: &Keyword, n: u64) -> Vec<u8> {
    hash_fields(&[
        CHAIN_DOMAIN,
        key.as_bytes(),
        label.as_bytes(),
        keyword.as_bytes(),
        &n.to_be_bytes(),
    ])
}

fn owner_fingerprint(update_key: &FindexKey) -> [u8; OWNER_LEN] {
    let digest = hash_fields(&[OWNER_DOMAIN, update_key.as_bytes()]);
    let mut owner = [0u8; OWNER_LEN];
    owner.copy_from_slice(&digest[..OWNER_LEN]);
    owner
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EntryValue {
    owner: [u8; OWNER_LEN],
    chain_len: u64,
}

impl EntryValue {
    fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(OWNER_LEN + 10);
        out.extend_from_slice(&self.owner);
        leb128::write_unsigned(&mut out, self.chain_len);
        out
    }

    fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.len() <= OWNER_LEN {
            return Err(CodecError::TruncatedStream {
                needed: OWNER_LEN + 1,
                remaining: bytes.len(),
            });
        }
        let mut owner = [0u8; OWNER_LEN];
        owner.copy_from_slice(&bytes[..OWNER_LEN]);
        let mut pos = OWNER_LEN;
        let chain_len = leb128::read_unsigned(bytes, &mut pos)?;
        Ok(Self { owner, chain_len })
    }
}

/// Fetch entry rows for `uids`, keyed by UID; empty values count as missing
async fn fetch_entry_values(
    callbacks: &dyn EngineCallbacks,
    uids: &[Vec<u8>],
) -> Result<HashMap<Vec<u8>, EntryValue>, EngineError> {
    let response = callbacks.fetch_entries(serialize_list(uids)).await?;
    let mut values = HashMap::new();
    for (uid, value) in deserialize_map(&response)? {
        if value.is_empty() {
            continue;
        }
        values.insert(uid, EntryValue::decode(&value)?);
    }
    Ok(values)
}

/// Values already chained under each keyword, rows `0..start`
async fn fetch_chain_values<'k>(
    request: &UpsertRequest<'_>,
    keywords: &[&'k Keyword],
    starts: &[u64],
    callbacks: &dyn EngineCallbacks,
) -> Result<HashMap<&'k Keyword, HashSet<Vec<u8>>>, EngineError> {
    let mut owners = HashMap::new();
    let mut chain_uids = Vec::new();
    for (keyword, start) in keywords.iter().zip(starts) {
        for n in 0..*start {
            let uid = chain_uid(request.search_key, request.label, keyword, n);
            owners.insert(uid.clone(), *keyword);
            chain_uids.push(uid);
        }
    }

    let mut values: HashMap<&'k Keyword, HashSet<Vec<u8>>> = HashMap::new();
    if chain_uids.is_empty() {
        return Ok(values);
    }
    let response = callbacks.fetch_chains(serialize_list(&chain_uids)).await?;
    for (uid, value) in deserialize_map(&response)? {
        if value.is_empty() {
            continue;
        }
        if let Some(keyword) = owners.get(&uid) {
            values.entry(*keyword).or_default().insert(value);
        }
    }
    Ok(values)
}

impl ReferenceEngine {
    /// Read the chains of every keyword in `frontier`
    async fn walk_level(
        &self,
        request: &SearchRequest<'_>,
        frontier: &[Keyword],
        callbacks: &dyn EngineCallbacks,
    ) -> Result<Vec<Vec<u8>>, EngineError> {
        let entry_uids: Vec<Vec<u8>> = frontier
            .iter()
            .map(|k| entry_uid(request.search_key, request.label, k))
            .collect();
        let entries = fetch_entry_values(callbacks, &entry_uids).await?;

        let mut chain_uids = Vec::new();
        for (keyword, uid) in frontier.iter().zip(&entry_uids) {
            let Some(entry) = entries.get(uid) else {
                continue;
            };
            let limit = match request.max_results_per_keyword {
                0 => entry.chain_len,
                max => entry.chain_len.min(max as u64),
            };
            for n in 0..limit {
                chain_uids.push(chain_uid(request.search_key, request.label, keyword, n));
            }
        }

        if chain_uids.is_empty() {
            return Ok(Vec::new());
        }

        let response = callbacks.fetch_chains(serialize_list(&chain_uids)).await?;
        let mut by_uid: HashMap<Vec<u8>, Vec<u8>> = deserialize_map(&response)?
            .into_iter()
            .filter(|(_, value)| !value.is_empty())
            .collect();

        Ok(chain_uids
            .iter()
            .filter_map(|uid| by_uid.remove(uid))
            .collect())
    }
}

#[async_trait]
impl IndexEngine for ReferenceEngine {
    async fn upsert(
        &self,
        request: UpsertRequest<'_>,
        callbacks: &dyn EngineCallbacks,
    ) -> Result<(), EngineError> {
        let mut per_keyword: BTreeMap<&Keyword, Vec<&[u8]>> = BTreeMap::new();
        for (value, keywords) in request.entries {
            for keyword in keywords {
                per_keyword.entry(keyword).or_default().push(value);
            }
        }
        if per_keyword.is_empty() {
            return Ok(());
        }

        let entry_uids: Vec<Vec<u8>> = per_keyword
            .keys()
            .map(|k| entry_uid(request.search_key, request.label, k))
            .collect();
        let existing = fetch_entry_values(callbacks, &entry_uids).await?;
        let owner = owner_fingerprint(request.update_key);

        let mut starts = Vec::with_capacity(entry_uids.len());
        for uid in &entry_uids {
            starts.push(match existing.get(uid) {
                Some(entry) if entry.owner != owner => return Err(EngineError::UnauthorizedUpdate),
                Some(entry) => entry.chain_len,
                None => 0,
            });
        }
        let keywords: Vec<&Keyword> = per_keyword.keys().copied().collect();
        let mut chained = fetch_chain_values(&request, &keywords, &starts, callbacks).await?;

        let mut chain_rows = Vec::new();
        let mut entry_rows = Vec::with_capacity(entry_uids.len());
        for (((keyword, values), uid), start) in per_keyword.iter().zip(entry_uids).zip(starts) {
            let present = chained.entry(*keyword).or_default();
            let mut n = start;
            for value in values {
                // Values already chained are not appended again.
                if !present.insert(value.to_vec()) {
                    continue;
                }
                chain_rows.push((
                    chain_uid(request.search_key, request.label, keyword, n),
                    value.to_vec(),
                ));
                n += 1;
            }
            if n == start {
                continue;
            }
            let entry = EntryValue {
                owner,
                chain_len: n,
            };
            entry_rows.push((uid, entry.encode()));
        }

        if chain_rows.is_empty() {
            trace!("Every value already indexed");
            return Ok(());
        }

        trace!(
            chain_rows = chain_rows.len(),
            entry_rows = entry_rows.len(),
            "Writing index rows"
        );

        // Chains first: entry rows are what make chain rows reachable.
        callbacks.upsert_chains(serialize_map(&chain_rows)).await?;
        callbacks.upsert_entries(serialize_map(&entry_rows)).await?;
        Ok(())
    }

    async fn search(
        &self,
        request: SearchRequest<'_>,
        progress: Progress<'_>,
        callbacks: &dyn EngineCallbacks,
    ) -> Result<Vec<u8>, EngineError> {
        let mut visited: HashSet<Keyword> = HashSet::new();
        let mut seen: HashSet<Vec<u8>> = HashSet::new();
        let mut results: Vec<Vec<u8>> = Vec::new();
        let mut frontier: Vec<Keyword> = request.keywords.to_vec();
        let mut depth = 0usize;

        loop {
            // Already walked keywords are exhausted, which breaks cycles.
            frontier.retain(|k| visited.insert(k.clone()));
            if frontier.is_empty() {
                break;
            }

            let level: Vec<Vec<u8>> = self
                .walk_level(&request, &frontier, callbacks)
                .await?
                .into_iter()
                .filter(|value| seen.insert(value.clone()))
                .collect();
            if level.is_empty() {
                break;
            }
            results.extend(level.iter().cloned());

            if !progress(serialize_list(&level).as_slice()) {
                debug!(depth, found = results.len(), "Search interrupted by progress callback");
                break;
            }
            if depth >= request.max_depth {
                break;
            }

            let mut next = Vec::new();
            for value in &level {
                if let (IndexedValueKind::Keyword, payload) = decode_indexed_value(value)? {
                    next.push(Keyword::from(payload));
                }
            }
            frontier = next;
            depth += 1;
        }

        Ok(serialize_list(&results))
    }
}
