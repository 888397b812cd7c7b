//! Capability interfaces: storage backend, index engine, decryption engine

pub mod backend;
pub mod decryption;
pub mod engine;

pub use backend::{Row, StorageBackend};
pub use decryption::{ClearTextHeader, DecryptionEngine, EngineVariant, HybridDecryption};
pub use engine::{EngineCallbacks, IndexEngine, Progress, SearchRequest, UpsertRequest};
