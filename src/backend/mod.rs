//! Storage backend adapters
//!
//! - `relay`: binds any [`StorageBackend`](crate::traits::StorageBackend) to the
//!   engine's byte-level callbacks through the wire codec
//! - `memory`: in-process store for tests and the CLI

#[cfg(feature = "reference")]
pub mod memory;
mod relay;

#[cfg(feature = "reference")]
pub use memory::InMemoryBackend;
pub use relay::BackendRelay;
