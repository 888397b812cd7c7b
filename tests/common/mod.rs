//! Common test utilities and fixtures
//!
//! - In-memory index setup with fixed keys
//! - Builders for keywords, locations and encrypted batches
//! - Custom assertions for search results

pub mod assertions;
pub mod fixtures;

// Re-export commonly used items
pub use assertions::*;
pub use fixtures::*;

pub use std::sync::Arc;
