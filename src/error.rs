//! Index error types

use thiserror::Error;

/// Wire and tagged-value decoding errors
///
/// Always fatal to the single decode operation that raised them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Empty input or unknown discriminator byte
    #[error("malformed indexed value: {0}")]
    MalformedIndexedValue(String),

    /// A declared length runs past the end of the stream
    #[error("truncated stream: needed {needed} bytes, {remaining} remaining")]
    TruncatedStream { needed: usize, remaining: usize },

    /// LEB128 length does not fit in a usize
    #[error("LEB128 length overflows usize")]
    LengthOverflow,
}

/// Storage backend errors
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    /// Transport or store failure (network, serialization, ...)
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// Optional operation not implemented by this backend
    #[error("operation not supported by backend: {0}")]
    NotSupported(&'static str),
}

/// Errors raised by an index engine
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// A fetch/upsert callback failed
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    /// Bytes exchanged with the backend could not be decoded
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// The update key does not own the rows being updated
    #[error("update key does not match the key that created the index rows")]
    UnauthorizedUpdate,

    /// Any other engine-side failure
    #[error("engine error: {0}")]
    Internal(String),
}

/// Main index error type
#[derive(Debug, Error)]
pub enum IndexError {
    // ========== Codec Errors ==========
    /// Decoding failed
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    // ========== Backend Errors ==========
    /// Adapter I/O failure, aborts the enclosing upsert/search
    #[error("backend unavailable: {0}")]
    BackendUnavailable(BackendError),

    // ========== Engine Errors ==========
    /// Upsert did not complete; wraps the first error encountered
    #[error("upsert failed: {0}")]
    UpsertFailed(#[source] EngineError),

    /// Search-side engine failure
    #[error("engine error: {0}")]
    Engine(EngineError),

    // ========== Validation Errors ==========
    /// Invalid argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Index result type alias
pub type IndexResult<T> = Result<T, IndexError>;

impl From<BackendError> for IndexError {
    fn from(e: BackendError) -> Self {
        IndexError::BackendUnavailable(e)
    }
}

impl IndexError {
    /// Map an engine error raised during a search
    ///
    /// Backend and codec failures keep their own taxonomy entry so callers
    /// can tell a dead store from a corrupted row.
    pub fn from_search(e: EngineError) -> Self {
        match e {
            EngineError::Backend(b) => IndexError::BackendUnavailable(b),
            EngineError::Codec(c) => IndexError::Codec(c),
            other => IndexError::Engine(other),
        }
    }

    /// Whether the failure came from the storage backend
    pub fn is_backend(&self) -> bool {
        matches!(
            self,
            IndexError::BackendUnavailable(_) | IndexError::UpsertFailed(EngineError::Backend(_))
        )
    }
}
