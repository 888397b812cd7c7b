//! Index engine contract
//!
//! The engine is the component doing the actual upsert and graph walk.
//! Everything it exchanges with the storage backend goes through
//! [`EngineCallbacks`] as codec-framed bytes: UID lists in, row maps out.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;

use crate::codec::{FindexKey, Keyword, Label};
use crate::error::{BackendError, EngineError};

/// Byte-level storage callbacks handed to the engine
///
/// `serialized_uids` is a `serialize_list` stream; rows are `serialize_map`
/// streams of `(uid, value)` pairs.
#[async_trait]
pub trait EngineCallbacks: Send + Sync {
    async fn fetch_entries(&self, serialized_uids: Vec<u8>) -> Result<Vec<u8>, BackendError>;

    async fn fetch_chains(&self, serialized_uids: Vec<u8>) -> Result<Vec<u8>, BackendError>;

    async fn upsert_entries(&self, serialized_rows: Vec<u8>) -> Result<usize, BackendError>;

    async fn upsert_chains(&self, serialized_rows: Vec<u8>) -> Result<usize, BackendError>;
}

/// Progress hook called with a `serialize_list` of newly discovered
/// encoded IndexedValues; returning `false` asks the engine to stop early.
pub type Progress<'a> = &'a (dyn Fn(&[u8]) -> bool + Send + Sync);

/// Upsert call parameters
pub struct UpsertRequest<'a> {
    pub search_key: &'a FindexKey,
    pub update_key: &'a FindexKey,
    pub label: &'a Label,
    /// Encoded IndexedValue -> keywords it is indexed under
    pub entries: &'a BTreeMap<Vec<u8>, BTreeSet<Keyword>>,
}

/// Search call parameters
pub struct SearchRequest<'a> {
    pub search_key: &'a FindexKey,
    pub label: &'a Label,
    pub keywords: &'a [Keyword],
    /// Chain rows read per keyword, 0 = unlimited
    pub max_results_per_keyword: usize,
    /// Keyword-to-keyword hops to follow
    pub max_depth: usize,
}

#[async_trait]
pub trait IndexEngine: Send + Sync + 'static {
    /// Index every `(value, keywords)` pair of the request
    async fn upsert(
        &self,
        request: UpsertRequest<'_>,
        callbacks: &dyn EngineCallbacks,
    ) -> Result<(), EngineError>;

    /// Walk the index from `request.keywords`
    ///
    /// Returns a `serialize_list` of encoded IndexedValues. Values tagged as
    /// Keyword may remain when `max_depth` is exhausted.
    async fn search(
        &self,
        request: SearchRequest<'_>,
        progress: Progress<'_>,
        callbacks: &dyn EngineCallbacks,
    ) -> Result<Vec<u8>, EngineError>;
}
