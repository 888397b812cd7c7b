//! Upsert and search orchestration
//!
//! [`Findex`] binds a storage backend and an index engine. It groups entries
//! before upserts, splits and combines multi-keyword searches, and strips
//! IndexedValues down to Locations. It holds no mutable state of its own:
//! concurrent calls only share the backend.

mod aliases;
mod results;
mod search;
mod upsert;

use std::sync::Arc;

use crate::backend::BackendRelay;
use crate::config::FindexConfig;
use crate::error::IndexResult;
use crate::traits::{IndexEngine, StorageBackend};

pub use aliases::{generate_aliases, generate_aliases_up_to, DEFAULT_MIN_ALIAS_CHARS};
pub use results::{IntermediateResults, SearchResults};
pub use search::{LogicalMode, ProgressFn, SearchOptions};
pub use upsert::group_entries;

/// Emit a per-call summary at `info` when verbose, `debug` otherwise
macro_rules! summary {
    ($verbose:expr, $($arg:tt)+) => {
        if $verbose {
            tracing::info!($($arg)+)
        } else {
            tracing::debug!($($arg)+)
        }
    };
}
pub(crate) use summary;

/// Encrypted multi-map index client
pub struct Findex {
    backend: Arc<dyn StorageBackend>,
    engine: Arc<dyn IndexEngine>,
    relay: BackendRelay,
    config: FindexConfig,
}

impl Findex {
    pub fn new(backend: Arc<dyn StorageBackend>, engine: Arc<dyn IndexEngine>) -> Self {
        Self::with_config(backend, engine, FindexConfig::default())
    }

    pub fn with_config(
        backend: Arc<dyn StorageBackend>,
        engine: Arc<dyn IndexEngine>,
        config: FindexConfig,
    ) -> Self {
        let relay = BackendRelay::new(Arc::clone(&backend));
        Self {
            backend,
            engine,
            relay,
            config,
        }
    }

    pub fn config(&self) -> &FindexConfig {
        &self.config
    }

    /// Search options pre-filled from this index's configuration
    pub fn search_options(&self) -> SearchOptions<'static> {
        SearchOptions::from_config(&self.config)
    }

    /// Wipe the Entry and Chain tables
    ///
    /// Invalidates every indexed value; the only deletion the index performs.
    pub async fn reset(&self) -> IndexResult<()> {
        self.backend.reset().await?;
        summary!(self.config.verbose, "Index tables reset");
        Ok(())
    }
}
