//! Randomized interleavings of concurrent appends
//!
//! Each writer starts after its own random delay, so reads and conditional
//! writes of different writers interleave differently every case.

use crate::common::*;
use docsync::{ConflictRetry, Mutation};
use proptest::prelude::*;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()
        .unwrap()
}

/// Run one append per entry of `delays` and return the sorted ids stored
async fn append_all(backend: &TestStore, delays: &[u64]) -> Vec<u64> {
    let engine = backend.engine();
    let name = doc("interleaved");
    seed(&engine, &name, json!({"items": []})).await;

    let retry = Arc::new(ConflictRetry::new(fast_retry(delays.len() as u32)));
    let handles: Vec<_> = delays
        .iter()
        .enumerate()
        .map(|(i, &delay)| {
            let engine = engine.clone();
            let name = name.clone();
            let retry = Arc::clone(&retry);
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(delay)).await;
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
    ids
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn every_append_lands_exactly_once(delays in prop::collection::vec(0u64..4, 2..10)) {
        let rt = runtime();
        let expected: Vec<u64> = (0..delays.len() as u64).collect();

        let results = rt.block_on(async {
            let mut results = Vec::new();
            for backend in TestStore::all().await {
                results.push((backend.label, append_all(&backend, &delays).await));
            }
            results
        });

        for (label, ids) in results {
            prop_assert_eq!(&ids, &expected, "{}", label);
        }
    }
}
