//! Decryption worker pool
//!
//! Each `decrypt` call fans the batch out to `workers` fresh worker tasks,
//! one contiguous shard each, runs INIT -> DECRYPT -> DESTROY on all of
//! them concurrently and concatenates the results in shard order.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::future::try_join_all;
use tracing::debug;

use super::entry::EncryptedEntry;
use super::error::WorkerError;
use super::partition::split_into_shards;
use super::worker::{DecryptWorker, SkipObserver, WorkerHandle, WorkerOptions};
use crate::config::PoolConfig;
use crate::index::summary;
use crate::traits::{DecryptionEngine, EngineVariant};

/// Parallel hybrid decryption over a fixed number of workers
pub struct WorkerPool {
    engine: Arc<dyn DecryptionEngine>,
    config: PoolConfig,
    on_skip: Option<SkipObserver>,
    terminated: AtomicBool,
}

impl WorkerPool {
    /// # Errors
    ///
    /// `WorkerError` if `config.workers` is 0.
    pub fn new(engine: Arc<dyn DecryptionEngine>, config: PoolConfig) -> Result<Self, WorkerError> {
        if config.workers == 0 {
            return Err(WorkerError::new("invalid number of workers: 0"));
        }
        Ok(Self {
            engine,
            config,
            on_skip: None,
            terminated: AtomicBool::new(false),
        })
    }

    /// Observe entries skipped because they failed to decrypt
    pub fn with_skip_observer(mut self, observer: SkipObserver) -> Self {
        self.on_skip = Some(observer);
        self
    }

    pub fn workers(&self) -> usize {
        self.config.workers
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Make the pool unusable; later `decrypt` calls fail
    pub fn terminate(&self) {
        self.terminated.store(true, Ordering::SeqCst);
        debug!(workers = self.config.workers, "Worker pool terminated");
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::SeqCst)
    }

    /// Decrypt `entries` with `user_key`, dropping entries that fail
    ///
    /// `is_alt_engine` selects the alternative hybrid scheme. The output
    /// holds shard 0's cleartexts first, then shard 1's, and so on.
    ///
    /// # Errors
    ///
    /// `WorkerError` if any worker fails at the transport level or refuses a
    /// request. The whole call fails; there is no per-shard retry.
    pub async fn decrypt(
        &self,
        user_key: &[u8],
        entries: Vec<EncryptedEntry>,
        is_alt_engine: bool,
    ) -> Result<Vec<Vec<u8>>, WorkerError> {
        if self.is_terminated() {
            return Err(WorkerError::new("pool terminated"));
        }

        let variant = EngineVariant::from_alt_flag(is_alt_engine);
        let total = entries.len();
        let workers = self.config.workers;

        let cleartexts = if workers == 1 {
            self.run_shard(0, user_key, variant, entries).await?
        } else {
            let shards = split_into_shards(entries, workers);
            let runs = shards
                .into_iter()
                .enumerate()
                .map(|(shard, entries)| self.run_shard(shard, user_key, variant, entries));
            try_join_all(runs).await?.into_iter().flatten().collect()
        };

        summary!(
            self.config.verbose,
            workers,
            variant = %variant,
            total,
            decrypted = cleartexts.len(),
            "Batch decrypted"
        );
        Ok(cleartexts)
    }

    /// Spawn one worker and drive it through a full lifecycle
    async fn run_shard(
        &self,
        shard: usize,
        user_key: &[u8],
        variant: EngineVariant,
        entries: Vec<EncryptedEntry>,
    ) -> Result<Vec<Vec<u8>>, WorkerError> {
        let options = WorkerOptions {
            channel_capacity: self.config.channel_capacity,
            verbose: self.config.verbose,
            on_skip: self.on_skip.clone(),
        };
        let (handle, task) = DecryptWorker::spawn(shard, Arc::clone(&self.engine), options);

        let outcome = drive(handle, user_key.to_vec(), variant, entries).await;

        match task.await {
            Ok(()) => outcome,
            Err(e) => Err(WorkerError::new(format!("worker {} crashed: {}", shard, e))),
        }
    }
}

/// INIT -> DECRYPT -> DESTROY; DESTROY is sent even when DECRYPT fails, and
/// a DECRYPT error takes precedence over a DESTROY error
async fn drive(
    handle: WorkerHandle,
    user_key: Vec<u8>,
    variant: EngineVariant,
    entries: Vec<EncryptedEntry>,
) -> Result<Vec<Vec<u8>>, WorkerError> {
    handle.init(user_key, variant).await?;
    let decrypted = handle.decrypt(entries).await;
    let destroyed = handle.destroy().await;
    let cleartexts = decrypted?;
    destroyed?;
    Ok(cleartexts)
}
