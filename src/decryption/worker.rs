//! Decrypt worker
//!
//! Each worker is a tokio task owning its decryption state and draining a
//! bounded request channel:
//! `Uninitialized -> INIT -> Ready -> DECRYPT* -> DESTROY -> Terminated`.
//! Decryption itself runs on the blocking pool.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use super::entry::EncryptedEntry;
use super::error::{DecryptionError, WorkerError};
use super::message::{MessageKind, WorkerRequest, WorkerResponse};
use crate::traits::{DecryptionEngine, EngineVariant, HybridDecryption};

/// Notified with `(worker, uid, reason)` for every skipped entry
pub type SkipObserver = Arc<dyn Fn(usize, &[u8], &DecryptionError) + Send + Sync>;

/// Per-worker settings
#[derive(Clone, Default)]
pub struct WorkerOptions {
    /// Bounded request channel capacity
    pub channel_capacity: usize,

    /// Log skipped entries at debug
    pub verbose: bool,

    pub on_skip: Option<SkipObserver>,
}

enum WorkerState {
    Uninitialized,
    Ready(Box<dyn HybridDecryption>),
    Terminated,
}

impl WorkerState {
    fn name(&self) -> &'static str {
        match self {
            WorkerState::Uninitialized => "uninitialized",
            WorkerState::Ready(_) => "ready",
            WorkerState::Terminated => "terminated",
        }
    }
}

/// Decrypt one entry: split, header, then block number 0
fn decrypt_entry(
    decryption: &mut dyn HybridDecryption,
    entry: &EncryptedEntry,
) -> Result<Vec<u8>, DecryptionError> {
    let (header, block) = entry.split()?;
    let cleartext_header = decryption.decrypt_header(header)?;
    decryption.decrypt_block(&cleartext_header.symmetric_key, block, &cleartext_header.uid, 0)
}

/// Decrypt every entry independently; failures are reported to `on_skip`
/// and left out of the output
pub fn decrypt_batch(
    decryption: &mut dyn HybridDecryption,
    entries: &[EncryptedEntry],
    mut on_skip: impl FnMut(&EncryptedEntry, DecryptionError),
) -> Vec<Vec<u8>> {
    let mut cleartexts = Vec::with_capacity(entries.len());
    for entry in entries {
        match decrypt_entry(decryption, entry) {
            Ok(cleartext) => cleartexts.push(cleartext),
            Err(e) => on_skip(entry, e),
        }
    }
    cleartexts
}

/// Worker task state
pub struct DecryptWorker {
    id: usize,
    engine: Arc<dyn DecryptionEngine>,
    state: WorkerState,
    rx: mpsc::Receiver<WorkerRequest>,
    verbose: bool,
    on_skip: Option<SkipObserver>,
}

impl DecryptWorker {
    /// Spawn a worker task and return its handle
    pub fn spawn(
        id: usize,
        engine: Arc<dyn DecryptionEngine>,
        options: WorkerOptions,
    ) -> (WorkerHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(options.channel_capacity.max(1));
        let worker = Self {
            id,
            engine,
            state: WorkerState::Uninitialized,
            rx,
            verbose: options.verbose,
            on_skip: options.on_skip,
        };
        let task = tokio::spawn(worker.run());
        (WorkerHandle { id, tx }, task)
    }

    /// Serve requests until every handle is dropped
    async fn run(mut self) {
        trace!(worker = self.id, "Decrypt worker started");

        while let Some(request) = self.rx.recv().await {
            let kind = request.kind();
            trace!(worker = self.id, kind = %kind, state = self.state.name(), "Request received");

            let (response, reply) = match request {
                WorkerRequest::Init {
                    user_key,
                    variant,
                    reply,
                } => (self.handle_init(user_key, variant).await, reply),
                WorkerRequest::Decrypt { entries, reply } => {
                    (self.handle_decrypt(entries).await, reply)
                }
                WorkerRequest::Destroy { reply } => (self.handle_destroy(), reply),
            };

            if let WorkerResponse::Error { message, .. } = &response {
                debug!(worker = self.id, kind = %kind, error = %message, "Request refused");
            }
            // Requester gone: nothing to report to.
            let _ = reply.send(response);
        }

        if let WorkerState::Ready(mut decryption) =
            std::mem::replace(&mut self.state, WorkerState::Terminated)
        {
            decryption.destroy();
        }
        trace!(worker = self.id, "Decrypt worker stopped");
    }

    async fn handle_init(&mut self, user_key: Vec<u8>, variant: EngineVariant) -> WorkerResponse {
        match self.state {
            WorkerState::Uninitialized => {}
            WorkerState::Ready(_) => {
                return WorkerResponse::error(MessageKind::Init, "worker already initialized")
            }
            WorkerState::Terminated => {
                return WorkerResponse::error(MessageKind::Init, "worker terminated")
            }
        }

        let engine = Arc::clone(&self.engine);
        let initialized =
            tokio::task::spawn_blocking(move || engine.init(&user_key, variant)).await;

        match initialized {
            Ok(Ok(decryption)) => {
                self.state = WorkerState::Ready(decryption);
                trace!(worker = self.id, variant = %variant, "Worker initialized");
                WorkerResponse::Init
            }
            Ok(Err(e)) => WorkerResponse::error(MessageKind::Init, e.to_string()),
            Err(e) => WorkerResponse::error(MessageKind::Init, format!("init task failed: {}", e)),
        }
    }

    async fn handle_decrypt(&mut self, entries: Vec<EncryptedEntry>) -> WorkerResponse {
        let mut decryption = match std::mem::replace(&mut self.state, WorkerState::Uninitialized) {
            WorkerState::Ready(decryption) => decryption,
            other => {
                let message = format!("worker {}", other.name());
                self.state = other;
                return WorkerResponse::error(MessageKind::Decrypt, message);
            }
        };

        let id = self.id;
        let verbose = self.verbose;
        let on_skip = self.on_skip.clone();

        let outcome = tokio::task::spawn_blocking(move || {
            let cleartexts = decrypt_batch(decryption.as_mut(), &entries, |entry, reason| {
                if verbose {
                    debug!(
                        worker = id,
                        uid = %hex::encode(&entry.uid),
                        reason = %reason,
                        "Skipped entry"
                    );
                }
                if let Some(observer) = &on_skip {
                    observer(id, &entry.uid, &reason);
                }
            });
            (decryption, cleartexts, entries.len())
        })
        .await;

        match outcome {
            Ok((decryption, cleartexts, total)) => {
                self.state = WorkerState::Ready(decryption);
                trace!(
                    worker = id,
                    total,
                    decrypted = cleartexts.len(),
                    "Shard decrypted"
                );
                WorkerResponse::Decrypt(cleartexts)
            }
            Err(e) => {
                // Decryption state was lost with the task.
                self.state = WorkerState::Terminated;
                let message = format!("decryption task failed: {}", e);
                WorkerResponse::error(MessageKind::Decrypt, message)
            }
        }
    }

    fn handle_destroy(&mut self) -> WorkerResponse {
        match std::mem::replace(&mut self.state, WorkerState::Terminated) {
            WorkerState::Ready(mut decryption) => {
                decryption.destroy();
                WorkerResponse::Destroy
            }
            WorkerState::Uninitialized => WorkerResponse::Destroy,
            WorkerState::Terminated => {
                WorkerResponse::error(MessageKind::Destroy, "worker terminated")
            }
        }
    }
}

/// Handle for sending requests to one worker
#[derive(Clone)]
pub struct WorkerHandle {
    id: usize,
    tx: mpsc::Sender<WorkerRequest>,
}

impl WorkerHandle {
    pub fn id(&self) -> usize {
        self.id
    }

    /// Send a request and wait for its response
    async fn request(
        &self,
        build: impl FnOnce(oneshot::Sender<WorkerResponse>) -> WorkerRequest,
    ) -> Result<WorkerResponse, WorkerError> {
        let (reply, response_rx) = oneshot::channel();
        let request = build(reply);
        let kind = request.kind();

        self.tx.send(request).await.map_err(|_| {
            WorkerError::new(format!("worker {} unreachable for {}", self.id, kind))
        })?;

        response_rx.await.map_err(|_| {
            WorkerError::new(format!("worker {} dropped {} response", self.id, kind))
        })
    }

    fn accept(
        &self,
        expected: MessageKind,
        response: WorkerResponse,
    ) -> Result<WorkerResponse, WorkerError> {
        match response {
            WorkerResponse::Error { kind, message } => Err(WorkerError::new(format!(
                "worker {} {}: {}",
                self.id, kind, message
            ))),
            response if response.kind() == expected => Ok(response),
            response => Err(WorkerError::new(format!(
                "worker {} answered {} with {}",
                self.id,
                expected,
                response.kind()
            ))),
        }
    }

    pub async fn init(&self, user_key: Vec<u8>, variant: EngineVariant) -> Result<(), WorkerError> {
        let response = self
            .request(|reply| WorkerRequest::Init {
                user_key,
                variant,
                reply,
            })
            .await?;
        self.accept(MessageKind::Init, response).map(|_| ())
    }

    pub async fn decrypt(&self, entries: Vec<EncryptedEntry>) -> Result<Vec<Vec<u8>>, WorkerError> {
        let response = self
            .request(|reply| WorkerRequest::Decrypt { entries, reply })
            .await?;
        match self.accept(MessageKind::Decrypt, response)? {
            WorkerResponse::Decrypt(cleartexts) => Ok(cleartexts),
            other => Err(WorkerError::new(format!(
                "worker {} answered DECRYPT with {}",
                self.id,
                other.kind()
            ))),
        }
    }

    pub async fn destroy(&self) -> Result<(), WorkerError> {
        let response = self.request(|reply| WorkerRequest::Destroy { reply }).await?;
        self.accept(MessageKind::Destroy, response).map(|_| ())
    }
}
