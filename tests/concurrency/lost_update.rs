//! No lost update: concurrent appends all land exactly once

use crate::common::*;
use docsync::{ConflictRetry, FileStore, JsonValue, Mutation, MutationEngine, RetryConfig};
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use tempfile::TempDir;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn two_concurrent_appends_both_survive() {
    for backend in TestStore::all().await {
        let engine = backend.engine();
        let name = doc("pair");
        seed(&engine, &name, json!({"comments": []})).await;

        // Two writers conflict at most once each: the default bound suffices
        let retry = Arc::new(ConflictRetry::new(
            RetryConfig::default().with_base_delay_ms(1),
        ));
        let handles: Vec<_> = ["left", "right"]
            .into_iter()
            .map(|text| {
                let engine = engine.clone();
                let name = name.clone();
                let retry = Arc::clone(&retry);
                tokio::spawn(async move {
                    let mutation = Mutation::append(path("comments"), json!({"text": text}));
                    engine.apply_with_retry(&name, &mutation, retry.as_ref()).await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let doc = engine.fetch(&name).await.unwrap().value;
        let texts: HashSet<_> = doc["comments"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["text"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(doc["comments"].as_array().unwrap().len(), 2, "{}", backend.label);
        assert_eq!(
            texts,
            HashSet::from(["left".to_string(), "right".to_string()]),
            "{}",
            backend.label
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn many_writers_each_value_exactly_once() {
    const WRITERS: u32 = 16;

    for backend in TestStore::all().await {
        let engine = backend.engine();
        let name = doc("crowd");
        seed(&engine, &name, json!({"items": []})).await;

        // A writer only conflicts when another one commits, so WRITERS
        // attempts always suffice.
        let retry = Arc::new(ConflictRetry::new(fast_retry(WRITERS)));
        let handles: Vec<_> = (0..WRITERS)
            .map(|i| {
                let engine = engine.clone();
                let name = name.clone();
                let retry = Arc::clone(&retry);
                tokio::spawn(async move {
                    let mutation = Mutation::append(path("items"), json!({"id": i}));
                    engine.apply_with_retry(&name, &mutation, retry.as_ref()).await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let doc = engine.fetch(&name).await.unwrap().value;
        let mut ids: Vec<u64> = doc["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|item| item["id"].as_u64().unwrap())
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, (0..u64::from(WRITERS)).collect::<Vec<_>>(), "{}", backend.label);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn mixed_operations_on_different_paths_all_apply() {
    for backend in TestStore::all().await {
        let engine = backend.engine();
        let name = doc("mixed");
        seed(
            &engine,
            &name,
            json!({"title": "draft", "tags": [], "items": [{"id": "x"}, {"id": "y"}]}),
        )
        .await;

        let retry = Arc::new(ConflictRetry::new(fast_retry(3)));
        let mutations = vec![
            Mutation::patch_field(path("title"), json!("final")),
            Mutation::append(path("tags"), json!("urgent")),
            Mutation::remove_by_id(path("items"), json!("x")),
        ];
        let handles: Vec<_> = mutations
            .into_iter()
            .map(|mutation| {
                let engine = engine.clone();
                let name = name.clone();
                let retry = Arc::clone(&retry);
                tokio::spawn(async move {
                    engine
                        .apply_with_retry(&name, &mutation, retry.as_ref())
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let doc = engine.fetch(&name).await.unwrap().value;
        assert_eq!(
            doc,
            JsonValue::from(json!({"title": "final", "tags": ["urgent"], "items": [{"id": "y"}]})),
            "{}",
            backend.label
        );
    }
}

/// Two stores opened on one directory stand in for two server processes
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn writers_through_separate_file_stores_each_land_once() {
    const WRITERS: u32 = 16;

    let dir = TempDir::new().unwrap();
    let engines = [
        MutationEngine::new(Arc::new(FileStore::open(dir.path(), false).await.unwrap())),
        MutationEngine::new(Arc::new(FileStore::open(dir.path(), false).await.unwrap())),
    ];
    let name = doc("shared");
    seed(&engines[0], &name, json!({"items": []})).await;

    let retry = Arc::new(ConflictRetry::new(fast_retry(WRITERS)));
    let handles: Vec<_> = (0..WRITERS)
        .map(|i| {
            let engine = engines[(i % 2) as usize].clone();
            let name = name.clone();
            let retry = Arc::clone(&retry);
            tokio::spawn(async move {
                let mutation = Mutation::append(path("items"), json!({"id": i}));
                engine.apply_with_retry(&name, &mutation, retry.as_ref()).await
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    // Both stores see the same document
    let left = engines[0].fetch(&name).await.unwrap();
    let right = engines[1].fetch(&name).await.unwrap();
    assert_eq!(left, right);

    let mut ids: Vec<u64> = left.value["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_u64().unwrap())
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, (0..u64::from(WRITERS)).collect::<Vec<_>>());
}
