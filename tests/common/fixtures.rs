//! Test fixtures and index setup utilities

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;

use findex_index::decryption::mock::MockDecryptionEngine;
use findex_index::traits::{EngineVariant, StorageBackend};
use findex_index::{
    EncryptedEntry, Findex, FindexKey, IndexResult, IndexedEntry, InMemoryBackend, Keyword,
    Label, Location, ReferenceEngine, SearchOptions,
};

/// Key used to seal and open test ciphertexts
pub const USER_KEY: &[u8] = b"test-user-key";

/// An in-memory index with its keys and label
pub struct TestIndex {
    pub findex: Findex,
    pub backend: Arc<InMemoryBackend>,
    pub search_key: FindexKey,
    pub update_key: FindexKey,
    pub label: Label,
}

/// Create an index over a fresh in-memory backend
pub fn test_index() -> TestIndex {
    let backend = Arc::new(InMemoryBackend::new());
    let findex = Findex::new(
        backend.clone() as Arc<dyn StorageBackend>,
        Arc::new(ReferenceEngine::new()),
    );
    TestIndex {
        findex,
        backend,
        search_key: FindexKey::new(vec![0x11; 32]),
        update_key: FindexKey::new(vec![0x22; 32]),
        label: Label::from("test-label"),
    }
}

impl TestIndex {
    pub async fn upsert(&self, entries: &[IndexedEntry]) -> IndexResult<()> {
        self.findex
            .upsert(&self.search_key, &self.update_key, &self.label, entries)
            .await
    }

    pub async fn search(
        &self,
        words: &[&str],
        options: &SearchOptions<'_>,
    ) -> IndexResult<HashSet<Location>> {
        self.findex
            .search(&self.search_key, &self.label, &keywords(words), options)
            .await
    }
}

pub fn keywords(words: &[&str]) -> Vec<Keyword> {
    words.iter().map(|w| Keyword::from(*w)).collect()
}

pub fn locations(names: &[&str]) -> HashSet<Location> {
    names.iter().map(|n| Location::from(*n)).collect()
}

/// `n` entries sealed for [`USER_KEY`]; entry `i` decrypts to `row-i`
pub fn sealed_batch(engine: &MockDecryptionEngine, n: usize) -> Vec<EncryptedEntry> {
    (0..n)
        .map(|i| {
            engine.seal(
                USER_KEY,
                EngineVariant::CoverCrypt,
                format!("uid-{}", i).as_bytes(),
                format!("row-{}", i).as_bytes(),
            )
        })
        .collect()
}

pub fn rows(indices: impl IntoIterator<Item = usize>) -> Vec<Vec<u8>> {
    indices
        .into_iter()
        .map(|i| format!("row-{}", i).into_bytes())
        .collect()
}
