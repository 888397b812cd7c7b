//! findex-index: encrypted multi-map search index
//!
//! - [`codec`]: tagged IndexedValues and the LEB128 wire framing
//! - [`traits`]: storage backend, index engine and decryption engine seams
//! - [`index`]: upsert and search orchestration ([`Findex`])
//! - [`decryption`]: parallel hybrid decryption ([`WorkerPool`])

pub mod backend;
pub mod codec;
pub mod config;
pub mod dataset;
pub mod decryption;
pub mod engine;
pub mod error;
pub mod index;
pub mod traits;

// Re-exports
pub use codec::{FindexKey, IndexedEntry, IndexedValue, Keyword, Label, Location};
pub use config::{FindexConfig, PoolConfig};
pub use decryption::{EncryptedEntry, WorkerError, WorkerPool};
pub use error::{BackendError, CodecError, EngineError, IndexError, IndexResult};
pub use index::{Findex, LogicalMode, SearchOptions};
pub use traits::{DecryptionEngine, IndexEngine, StorageBackend};

#[cfg(feature = "reference")]
pub use backend::InMemoryBackend;

#[cfg(feature = "reference")]
pub use engine::ReferenceEngine;
