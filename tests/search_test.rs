//! End-to-end search tests over the in-memory backend and reference engine

#![cfg(feature = "reference")]

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};

use common::*;
use findex_index::index::{generate_aliases, IntermediateResults};
use findex_index::{IndexedEntry, Keyword, Label, LogicalMode, SearchOptions};

#[tokio::test]
async fn test_and_or_scenario() {
    let index = test_index();
    index
        .upsert(&[IndexedEntry::location("L1", ["alice", "bob"])])
        .await
        .unwrap();

    let or = SearchOptions::default();
    let and = SearchOptions::default().with_mode(LogicalMode::And);

    assert_locations(&index.search(&["alice"], &or).await.unwrap(), &["L1"]);
    assert_locations(&index.search(&["alice", "carol"], &and).await.unwrap(), &[]);
    assert_locations(&index.search(&["alice", "carol"], &or).await.unwrap(), &["L1"]);
    assert_locations(&index.search(&["alice", "bob"], &and).await.unwrap(), &["L1"]);
}

#[tokio::test]
async fn test_keyword_chain_respects_depth() {
    let index = test_index();
    index
        .upsert(&[
            IndexedEntry::keyword_link("pre", "full"),
            IndexedEntry::location("L2", ["full"]),
        ])
        .await
        .unwrap();

    let deep = SearchOptions::default().with_max_depth(1000);
    let shallow = SearchOptions::default().with_max_depth(0);

    let found = index.search(&["pre"], &deep).await.unwrap();
    assert_locations(&found, &["L2"]);
    assert_no_discriminator(&found);

    assert_locations(&index.search(&["pre"], &shallow).await.unwrap(), &[]);
}

#[tokio::test]
async fn test_depth_counts_keyword_hops() {
    let index = test_index();
    index
        .upsert(&[
            IndexedEntry::keyword_link("pre", "mid"),
            IndexedEntry::keyword_link("mid", "full"),
            IndexedEntry::location("L", ["full"]),
        ])
        .await
        .unwrap();

    let one_hop = SearchOptions::default().with_max_depth(1);
    assert_locations(&index.search(&["pre"], &one_hop).await.unwrap(), &[]);

    let two_hops = SearchOptions::default().with_max_depth(2);
    let found = index.search(&["pre"], &two_hops).await.unwrap();
    assert_locations(&found, &["L"]);
    assert_no_discriminator(&found);
}

#[tokio::test]
async fn test_cycles_terminate() {
    let index = test_index();
    index
        .upsert(&[
            IndexedEntry::keyword_link("a", "b"),
            IndexedEntry::keyword_link("b", "a"),
            IndexedEntry::keyword_link("b", "b"),
            IndexedEntry::location("L1", ["b"]),
        ])
        .await
        .unwrap();

    let found = index.search(&["a"], &SearchOptions::default()).await.unwrap();
    assert_locations(&found, &["L1"]);
}

#[tokio::test]
async fn test_early_stop_returns_partial_results() {
    let index = test_index();
    index
        .upsert(&[
            IndexedEntry::location("L1", ["start"]),
            IndexedEntry::keyword_link("start", "next"),
            IndexedEntry::location("L2", ["next"]),
        ])
        .await
        .unwrap();

    let calls = AtomicUsize::new(0);
    let stop = |results: &IntermediateResults| {
        calls.fetch_add(1, Ordering::SeqCst);
        assert!(!results.is_empty());
        false
    };
    let options = SearchOptions::default().with_progress(&stop);

    let found = index.search(&["start"], &options).await.unwrap();
    assert_locations(&found, &["L1"]);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let found = index.search(&["start"], &SearchOptions::default()).await.unwrap();
    assert_locations(&found, &["L1", "L2"]);
}

#[tokio::test]
async fn test_progress_sees_each_level() {
    let index = test_index();
    index
        .upsert(&[
            IndexedEntry::keyword_link("pre", "full"),
            IndexedEntry::location("L2", ["full"]),
        ])
        .await
        .unwrap();

    let levels = std::sync::Mutex::new(Vec::new());
    let record = |results: &IntermediateResults| {
        levels.lock().unwrap().push((
            results.locations().count(),
            results.keywords().cloned().collect::<Vec<_>>(),
        ));
        true
    };
    let options = SearchOptions::default().with_progress(&record);
    index.search(&["pre"], &options).await.unwrap();

    let levels = levels.into_inner().unwrap();
    assert_eq!(levels, vec![(0, vec![Keyword::from("full")]), (1, vec![])]);
}

#[tokio::test]
async fn test_and_is_order_independent() {
    let index = test_index();
    index
        .upsert(&[
            IndexedEntry::location("L1", ["a", "b"]),
            IndexedEntry::location("L2", ["a"]),
            IndexedEntry::location("L3", ["b", "c"]),
            IndexedEntry::location("L4", ["a", "b", "c"]),
        ])
        .await
        .unwrap();

    let and = SearchOptions::default().with_mode(LogicalMode::And);
    let ab = index.search(&["a", "b"], &and).await.unwrap();
    let ba = index.search(&["b", "a"], &and).await.unwrap();
    assert_eq!(ab, ba);
    assert_locations(&ab, &["L1", "L4"]);

    let abc = index.search(&["c", "a", "b"], &and).await.unwrap();
    assert_locations(&abc, &["L4"]);
}

#[tokio::test]
async fn test_and_issues_one_engine_call_per_keyword() {
    let index = test_index();
    index
        .upsert(&[IndexedEntry::location("L1", ["a", "b"])])
        .await
        .unwrap();
    let before = index.backend.fetch_calls();

    let and = SearchOptions::default().with_mode(LogicalMode::And);
    index.search(&["a", "b", "a"], &and).await.unwrap();
    let and_fetches = index.backend.fetch_calls() - before;

    let before = index.backend.fetch_calls();
    index.search(&["a", "b"], &SearchOptions::default()).await.unwrap();
    let or_fetches = index.backend.fetch_calls() - before;

    // Duplicate keywords are searched once; OR shares a single engine call.
    assert_eq!(and_fetches, 2 * or_fetches);
}

#[tokio::test]
async fn test_empty_keyword_set() {
    let index = test_index();
    index
        .upsert(&[IndexedEntry::location("L1", ["a"])])
        .await
        .unwrap();

    for mode in [LogicalMode::Or, LogicalMode::And] {
        let options = SearchOptions::default().with_mode(mode);
        assert!(index.search(&[], &options).await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_max_results_per_keyword() {
    let index = test_index();
    index
        .upsert(&[
            IndexedEntry::location("L1", ["k"]),
            IndexedEntry::location("L2", ["k"]),
            IndexedEntry::location("L3", ["k"]),
        ])
        .await
        .unwrap();

    let limited = SearchOptions::default().with_max_results_per_keyword(2);
    assert_eq!(index.search(&["k"], &limited).await.unwrap().len(), 2);

    let unlimited = SearchOptions::default().with_max_results_per_keyword(0);
    assert_eq!(index.search(&["k"], &unlimited).await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_later_upserts_extend_keyword() {
    let index = test_index();
    index
        .upsert(&[IndexedEntry::location("L1", ["alice"])])
        .await
        .unwrap();
    index
        .upsert(&[IndexedEntry::location("L2", ["alice"])])
        .await
        .unwrap();

    let found = index.search(&["alice"], &SearchOptions::default()).await.unwrap();
    assert_locations(&found, &["L1", "L2"]);
}

#[tokio::test]
async fn test_label_scopes_the_index() {
    let index = test_index();
    index
        .upsert(&[IndexedEntry::location("L1", ["alice"])])
        .await
        .unwrap();

    let found = index
        .findex
        .search(
            &index.search_key,
            &Label::from("other-label"),
            &keywords(&["alice"]),
            &SearchOptions::default(),
        )
        .await
        .unwrap();
    assert!(found.is_empty());
}

#[tokio::test]
async fn test_search_per_keyword() {
    let index = test_index();
    index
        .upsert(&[
            IndexedEntry::location("L1", ["alice", "bob"]),
            IndexedEntry::location("L2", ["bob"]),
        ])
        .await
        .unwrap();

    let results = index
        .findex
        .search_per_keyword(
            &index.search_key,
            &index.label,
            &keywords(&["alice", "bob", "carol"]),
            &SearchOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(results.get(&Keyword::from("alice")).unwrap().len(), 1);
    assert_eq!(results.get(&Keyword::from("bob")).unwrap().len(), 2);
    assert!(results.get(&Keyword::from("carol")).unwrap().is_empty());
    // L1 is found by both keywords but counted once.
    assert_eq!(results.total(), 2);
    assert_eq!(results.locations().len(), 2);
}

#[tokio::test]
async fn test_prefix_aliases() {
    let index = test_index();
    let mut entries = vec![IndexedEntry::location("L1", ["thibaud"])];
    entries.extend(generate_aliases("thibaud", 3));
    index.upsert(&entries).await.unwrap();

    for prefix in ["thi", "thib", "thibau", "thibaud"] {
        let found = index.search(&[prefix], &SearchOptions::default()).await.unwrap();
        assert_locations(&found, &["L1"]);
    }
    assert!(index
        .search(&["th"], &SearchOptions::default())
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_reset_wipes_index() {
    let index = test_index();
    index
        .upsert(&[IndexedEntry::location("L1", ["alice"])])
        .await
        .unwrap();
    assert!(index.backend.entry_count() > 0);

    index.findex.reset().await.unwrap();
    assert_eq!(index.backend.entry_count(), 0);
    assert_eq!(index.backend.chain_count(), 0);
    assert!(index
        .search(&["alice"], &SearchOptions::default())
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_backend_failure_aborts_search() {
    let index = test_index();
    index
        .upsert(&[IndexedEntry::location("L1", ["alice"])])
        .await
        .unwrap();
    index.backend.fail_fetches.store(true, Ordering::SeqCst);

    let err = index
        .search(&["alice"], &SearchOptions::default())
        .await
        .unwrap_err();
    assert_backend_failure(&err);
    assert!(matches!(err, findex_index::IndexError::BackendUnavailable(_)));
}

#[tokio::test]
async fn test_config_drives_default_options() {
    let backend = Arc::new(findex_index::InMemoryBackend::new());
    let config = findex_index::FindexConfig {
        max_depth: 0,
        ..Default::default()
    };
    let findex = findex_index::Findex::with_config(
        backend,
        Arc::new(findex_index::ReferenceEngine::new()),
        config,
    );
    let options = findex.search_options();
    assert_eq!(options.max_depth, 0);
    assert_eq!(options.mode, LogicalMode::Or);
}
