//! Async storage backend trait definition

use async_trait::async_trait;

use crate::error::BackendError;

/// A `(uid, value)` line of the Entry or Chain table
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Row {
    pub uid: Vec<u8>,
    pub value: Vec<u8>,
}

impl Row {
    pub fn new(uid: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            uid: uid.into(),
            value: value.into(),
        }
    }

    pub fn into_pair(self) -> (Vec<u8>, Vec<u8>) {
        (self.uid, self.value)
    }
}

impl From<(Vec<u8>, Vec<u8>)> for Row {
    fn from((uid, value): (Vec<u8>, Vec<u8>)) -> Self {
        Self { uid, value }
    }
}

/// Persistent store holding the Entry and Chain tables
///
/// The index treats both tables as pure UID -> value stores. Every
/// operation must be idempotent for identical input, keep values
/// byte-exact, and neither reorder nor deduplicate what the caller sent.
/// Any transport failure is reported as `BackendError::Unavailable`; retries,
/// if any, are the implementation's business.
#[async_trait]
pub trait StorageBackend: Send + Sync + 'static {
    /// Fetch Entry table rows
    ///
    /// Missing UIDs are silently omitted from the result.
    async fn fetch_entries(&self, uids: Vec<Vec<u8>>) -> Result<Vec<Row>, BackendError>;

    /// Fetch Chain table rows (same contract as [`fetch_entries`](Self::fetch_entries))
    async fn fetch_chains(&self, uids: Vec<Vec<u8>>) -> Result<Vec<Row>, BackendError>;

    /// Insert or replace Entry table rows, returning the number written
    async fn upsert_entries(&self, rows: Vec<Row>) -> Result<usize, BackendError>;

    /// Insert or replace Chain table rows, returning the number written
    async fn upsert_chains(&self, rows: Vec<Row>) -> Result<usize, BackendError>;

    /// Wipe both tables
    ///
    /// The only way index rows are ever deleted. Optional.
    async fn reset(&self) -> Result<(), BackendError> {
        Err(BackendError::NotSupported("reset"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Compile-time test: trait is object-safe
    fn _assert_object_safe(_: &dyn StorageBackend) {}

    struct ReadOnly;

    #[async_trait]
    impl StorageBackend for ReadOnly {
        async fn fetch_entries(&self, _uids: Vec<Vec<u8>>) -> Result<Vec<Row>, BackendError> {
            Ok(vec![])
        }
        async fn fetch_chains(&self, _uids: Vec<Vec<u8>>) -> Result<Vec<Row>, BackendError> {
            Ok(vec![])
        }
        async fn upsert_entries(&self, rows: Vec<Row>) -> Result<usize, BackendError> {
            Ok(rows.len())
        }
        async fn upsert_chains(&self, rows: Vec<Row>) -> Result<usize, BackendError> {
            Ok(rows.len())
        }
    }

    #[tokio::test]
    async fn test_reset_defaults_to_not_supported() {
        let err = ReadOnly.reset().await.unwrap_err();
        assert!(matches!(err, BackendError::NotSupported("reset")));
    }

    #[test]
    fn test_row_pair_conversion() {
        let row = Row::from((b"uid".to_vec(), vec![]));
        assert_eq!(row, Row::new("uid", Vec::new()));
        assert_eq!(row.into_pair(), (b"uid".to_vec(), vec![]));
    }
}
