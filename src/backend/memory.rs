//! In-memory storage backend
//!
//! Reference implementation of the backend contract, used by the test
//! suite and the CLI. Failures can be injected per operation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::BackendError;
use crate::traits::{Row, StorageBackend};

type Table = RwLock<HashMap<Vec<u8>, Vec<u8>>>;

/// Entry and Chain tables held in process memory
#[derive(Default)]
pub struct InMemoryBackend {
    entries: Table,
    chains: Table,

    /// Whether fetches should fail
    pub fail_fetches: AtomicBool,

    /// Whether Entry table upserts should fail
    pub fail_entry_upserts: AtomicBool,

    /// Whether Chain table upserts should fail
    pub fail_chain_upserts: AtomicBool,

    /// Count of fetch calls (both tables)
    pub fetch_call_count: AtomicUsize,

    /// Count of upsert calls (both tables)
    pub upsert_call_count: AtomicUsize,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend whose every operation fails
    pub fn unavailable() -> Self {
        Self {
            fail_fetches: AtomicBool::new(true),
            fail_entry_upserts: AtomicBool::new(true),
            fail_chain_upserts: AtomicBool::new(true),
            ..Self::default()
        }
    }

    pub fn entry_count(&self) -> usize {
        self.entries.read().map(|t| t.len()).unwrap_or(0)
    }

    pub fn chain_count(&self) -> usize {
        self.chains.read().map(|t| t.len()).unwrap_or(0)
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_call_count.load(Ordering::SeqCst)
    }

    pub fn upsert_calls(&self) -> usize {
        self.upsert_call_count.load(Ordering::SeqCst)
    }

    /// Snapshot of the Entry table, for inspecting what the backend sees
    pub fn entry_rows(&self) -> Vec<Row> {
        snapshot(&self.entries)
    }

    /// Snapshot of the Chain table
    pub fn chain_rows(&self) -> Vec<Row> {
        snapshot(&self.chains)
    }

    fn fetch(&self, table: &Table, uids: Vec<Vec<u8>>) -> Result<Vec<Row>, BackendError> {
        self.fetch_call_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetches.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable("mock fetch failure".into()));
        }

        let table = table.read().map_err(poisoned)?;
        Ok(uids
            .into_iter()
            .filter_map(|uid| {
                let value = table.get(&uid)?.clone();
                Some(Row { uid, value })
            })
            .collect())
    }

    fn upsert(
        &self,
        table: &Table,
        rows: Vec<Row>,
        fail: &AtomicBool,
    ) -> Result<usize, BackendError> {
        self.upsert_call_count.fetch_add(1, Ordering::SeqCst);
        if fail.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable("mock upsert failure".into()));
        }

        let mut table = table.write().map_err(poisoned)?;
        let written = rows.len();
        for row in rows {
            table.insert(row.uid, row.value);
        }
        Ok(written)
    }
}

fn poisoned<T>(_: T) -> BackendError {
    BackendError::Unavailable("table lock poisoned".into())
}

fn snapshot(table: &Table) -> Vec<Row> {
    let mut rows: Vec<Row> = table
        .read()
        .map(|t| {
            t.iter()
                .map(|(uid, value)| Row::new(uid.clone(), value.clone()))
                .collect()
        })
        .unwrap_or_default();
    rows.sort_by(|a, b| a.uid.cmp(&b.uid));
    rows
}

#[async_trait]
impl StorageBackend for InMemoryBackend {
    async fn fetch_entries(&self, uids: Vec<Vec<u8>>) -> Result<Vec<Row>, BackendError> {
        self.fetch(&self.entries, uids)
    }

    async fn fetch_chains(&self, uids: Vec<Vec<u8>>) -> Result<Vec<Row>, BackendError> {
        self.fetch(&self.chains, uids)
    }

    async fn upsert_entries(&self, rows: Vec<Row>) -> Result<usize, BackendError> {
        self.upsert(&self.entries, rows, &self.fail_entry_upserts)
    }

    async fn upsert_chains(&self, rows: Vec<Row>) -> Result<usize, BackendError> {
        self.upsert(&self.chains, rows, &self.fail_chain_upserts)
    }

    async fn reset(&self) -> Result<(), BackendError> {
        self.entries.write().map_err(poisoned)?.clear();
        self.chains.write().map_err(poisoned)?.clear();
        Ok(())
    }
}
