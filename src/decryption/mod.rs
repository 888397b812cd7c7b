//! Decryption worker pool
//!
//! Hybrid-encrypted search results are decrypted in parallel by isolated
//! workers. Each worker owns its own decryption state and talks to the pool
//! through request/response messages only (INIT, DECRYPT, DESTROY). An entry
//! that fails to decrypt is skipped, never fatal to its batch.

mod entry;
mod error;
mod message;
#[cfg(feature = "reference")]
pub mod mock;
mod partition;
mod pool;
mod worker;

pub use entry::{join_ciphertext, split_ciphertext, EncryptedEntry, HEADER_LEN_PREFIX};
pub use error::{DecryptionError, WorkerError};
pub use message::{MessageKind, WorkerRequest, WorkerResponse};
pub use partition::{shard_ranges, split_into_shards};
pub use pool::WorkerPool;
pub use worker::{decrypt_batch, DecryptWorker, SkipObserver, WorkerHandle, WorkerOptions};
