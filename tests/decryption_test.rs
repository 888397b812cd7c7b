//! Worker pool tests with the mock decryption engine

#![cfg(feature = "reference")]

mod common;

use std::sync::atomic::Ordering;
use std::sync::Mutex;

use common::*;
use findex_index::decryption::mock::MockDecryptionEngine;
use findex_index::decryption::{shard_ranges, DecryptionError, SkipObserver};
use findex_index::traits::DecryptionEngine;
use findex_index::{EncryptedEntry, PoolConfig, WorkerPool};

fn pool(engine: &Arc<MockDecryptionEngine>, workers: usize) -> WorkerPool {
    let engine: Arc<dyn DecryptionEngine> = engine.clone();
    WorkerPool::new(engine, PoolConfig::with_workers(workers)).unwrap()
}

#[tokio::test]
async fn test_partial_failure_skips_corrupted_entry() {
    let engine = Arc::new(MockDecryptionEngine::new());
    let mut entries = sealed_batch(&engine, 3);
    let middle = entries[1].ciphertext.len() - 1;
    entries[1].ciphertext[middle] ^= 0x01;

    for workers in [1, 2, 3] {
        let cleartexts = pool(&engine, workers)
            .decrypt(USER_KEY, entries.clone(), false)
            .await
            .unwrap();
        assert_eq!(cleartexts, rows([0, 2]), "workers={}", workers);
    }
}

#[tokio::test]
async fn test_single_worker_matches_split_path() {
    let engine = Arc::new(MockDecryptionEngine::new());
    let mut entries = sealed_batch(&engine, 23);
    entries[5] = EncryptedEntry::new(b"garbage".to_vec(), vec![0xFF; 3]);

    let baseline = pool(&engine, 1)
        .decrypt(USER_KEY, entries.clone(), false)
        .await
        .unwrap();
    assert_eq!(baseline.len(), 22);

    for workers in 2..=8 {
        let split = pool(&engine, workers)
            .decrypt(USER_KEY, entries.clone(), false)
            .await
            .unwrap();
        assert_eq!(split, baseline, "workers={}", workers);
    }
}

#[tokio::test]
async fn test_entries_for_another_key_are_dropped() {
    let engine = Arc::new(MockDecryptionEngine::new());
    let mut entries = sealed_batch(&engine, 2);
    entries.push(engine.seal(
        b"someone-else",
        findex_index::traits::EngineVariant::CoverCrypt,
        b"uid-x",
        b"hidden",
    ));

    let skipped = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&skipped);
    let observer: SkipObserver = Arc::new(move |_, uid, reason| {
        sink.lock().unwrap().push((uid.to_vec(), reason.clone()));
    });
    let pool = pool(&engine, 2).with_skip_observer(observer);

    let cleartexts = pool.decrypt(USER_KEY, entries, false).await.unwrap();
    assert_eq!(cleartexts, rows([0, 1]));

    let skipped = skipped.lock().unwrap();
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].0, b"uid-x".to_vec());
    assert!(matches!(skipped[0].1, DecryptionError::Header(_)));
}

#[tokio::test]
async fn test_worker_failure_fails_whole_call() {
    let engine = Arc::new(MockDecryptionEngine::new());
    engine.panic_on_decrypt.store(true, Ordering::SeqCst);

    let err = pool(&engine, 3)
        .decrypt(USER_KEY, sealed_batch(&engine, 6), false)
        .await
        .unwrap_err();
    assert!(err.message().contains("DECRYPT"), "{}", err);
}

#[tokio::test]
async fn test_each_call_initializes_fresh_workers() {
    let engine = Arc::new(MockDecryptionEngine::new());
    let pool = pool(&engine, 2);

    pool.decrypt(USER_KEY, sealed_batch(&engine, 4), false).await.unwrap();
    pool.decrypt(USER_KEY, sealed_batch(&engine, 4), false).await.unwrap();

    assert_eq!(engine.init_count.load(Ordering::SeqCst), 4);
    assert_eq!(engine.destroy_count.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_concurrent_calls_share_a_pool() {
    let engine = Arc::new(MockDecryptionEngine::new());
    let pool = pool(&engine, 3);

    let (a, b) = tokio::join!(
        pool.decrypt(USER_KEY, sealed_batch(&engine, 5), false),
        pool.decrypt(USER_KEY, sealed_batch(&engine, 9), false),
    );
    assert_eq!(a.unwrap(), rows(0..5));
    assert_eq!(b.unwrap(), rows(0..9));
}

#[tokio::test]
async fn test_terminate() {
    let engine = Arc::new(MockDecryptionEngine::new());
    let pool = pool(&engine, 2);
    pool.terminate();

    let err = pool
        .decrypt(USER_KEY, sealed_batch(&engine, 1), false)
        .await
        .unwrap_err();
    assert_eq!(err.message(), "pool terminated");
}

#[test]
fn test_partition_covers_every_entry() {
    for n in 0..100 {
        for w in 1..12 {
            let total: usize = shard_ranges(n, w).iter().map(|r| r.len()).sum();
            assert_eq!(total, n);
        }
    }
}
