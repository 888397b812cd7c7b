//! Codec relay between the engine callbacks and a storage backend

use std::sync::Arc;

use async_trait::async_trait;
use tracing::trace;

use crate::codec::{deserialize_list, deserialize_map, serialize_map};
use crate::error::{BackendError, CodecError};
use crate::traits::{EngineCallbacks, Row, StorageBackend};

/// Relays engine fetch/upsert requests to a [`StorageBackend`]
///
/// Decodes the UID lists and row maps the engine sends, calls the backend,
/// and re-encodes what it returns. No retry happens at this layer.
pub struct BackendRelay {
    backend: Arc<dyn StorageBackend>,
}

impl BackendRelay {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }
}

// A malformed stream coming from the engine side is a serialization failure
// of the transport, which the backend contract reports as unavailability.
fn transport(e: CodecError) -> BackendError {
    BackendError::Unavailable(format!("serialization failure: {}", e))
}

fn encode_rows(rows: Vec<Row>) -> Vec<u8> {
    let pairs: Vec<(Vec<u8>, Vec<u8>)> = rows.into_iter().map(Row::into_pair).collect();
    serialize_map(&pairs)
}

fn decode_rows(bytes: &[u8]) -> Result<Vec<Row>, BackendError> {
    Ok(deserialize_map(bytes)
        .map_err(transport)?
        .into_iter()
        .map(Row::from)
        .collect())
}

#[async_trait]
impl EngineCallbacks for BackendRelay {
    async fn fetch_entries(&self, serialized_uids: Vec<u8>) -> Result<Vec<u8>, BackendError> {
        let uids = deserialize_list(&serialized_uids).map_err(transport)?;
        trace!(uid_count = uids.len(), "Fetching entry rows");
        let rows = self.backend.fetch_entries(uids).await?;
        Ok(encode_rows(rows))
    }

    async fn fetch_chains(&self, serialized_uids: Vec<u8>) -> Result<Vec<u8>, BackendError> {
        let uids = deserialize_list(&serialized_uids).map_err(transport)?;
        trace!(uid_count = uids.len(), "Fetching chain rows");
        let rows = self.backend.fetch_chains(uids).await?;
        Ok(encode_rows(rows))
    }

    async fn upsert_entries(&self, serialized_rows: Vec<u8>) -> Result<usize, BackendError> {
        let rows = decode_rows(&serialized_rows)?;
        trace!(row_count = rows.len(), "Upserting entry rows");
        self.backend.upsert_entries(rows).await
    }

    async fn upsert_chains(&self, serialized_rows: Vec<u8>) -> Result<usize, BackendError> {
        let rows = decode_rows(&serialized_rows)?;
        trace!(row_count = rows.len(), "Upserting chain rows");
        self.backend.upsert_chains(rows).await
    }
}
