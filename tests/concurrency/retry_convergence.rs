//! Retry convergence: k < max conflicts still yield exactly one copy

use crate::common::*;
use docsync::{ConflictRetry, Error, MemoryStore, Mutation, MutationEngine, RetryConfig};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

async fn flaky_engine(conflicts: usize) -> (Arc<FlakyStore>, MutationEngine) {
    let store = Arc::new(FlakyStore::new(Arc::new(MemoryStore::new()), 0));
    let engine = MutationEngine::new(store.clone());
    seed(&engine, &doc("plan"), json!({"resources": []})).await;
    store
        .conflicts
        .store(conflicts, std::sync::atomic::Ordering::SeqCst);
    (store, engine)
}

#[tokio::test]
async fn converges_for_every_k_below_bound() {
    let max = RetryConfig::default().max_retries;
    for k in 0..max as usize {
        let (store, engine) = flaky_engine(k).await;
        let sleeper = RecordingSleeper::default();
        let retry = ConflictRetry::with_sleeper(RetryConfig::default(), sleeper.clone());

        let result = engine
            .apply_with_retry(
                &doc("plan"),
                &Mutation::append(path("resources"), json!({"id": "r1"})),
                &retry,
            )
            .await
            .unwrap();

        assert_eq!(result.value["resources"], json!([{"id": "r1"}]), "k={k}");
        assert_eq!(store.conditional_writes(), k + 1, "k={k}");
        let expected: Vec<_> = (1..=k as u32)
            .map(|n| Duration::from_millis(100) * n)
            .collect();
        assert_eq!(*sleeper.delays.lock(), expected, "k={k}");
    }
}

#[tokio::test]
async fn exhaustion_reports_attempts_and_writes_nothing() {
    let (store, engine) = flaky_engine(usize::MAX).await;
    let retry = ConflictRetry::with_sleeper(RetryConfig::default(), RecordingSleeper::default());

    let err = engine
        .apply_with_retry(
            &doc("plan"),
            &Mutation::append(path("resources"), json!({"id": "r1"})),
            &retry,
        )
        .await
        .unwrap_err();
    assert_eq!(err, Error::RetriesExhausted { attempts: 3 });
    assert_eq!(store.conditional_writes(), 3);
    assert_eq!(
        engine.fetch(&doc("plan")).await.unwrap().value["resources"],
        json!([])
    );
}

#[tokio::test]
async fn permanent_failure_is_not_retried() {
    let (store, engine) = flaky_engine(0).await;
    let sleeper = RecordingSleeper::default();
    let retry = ConflictRetry::with_sleeper(RetryConfig::default(), sleeper.clone());

    let err = engine
        .apply_with_retry(
            &doc("plan"),
            &Mutation::remove_by_id(path("resources"), json!("missing")),
            &retry,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ItemNotFound { .. }));
    assert_eq!(store.conditional_writes(), 0);
    assert!(sleeper.delays.lock().is_empty());
}
