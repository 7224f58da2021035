//! Server-assigned sequence numbers stay unique under concurrent appends

use crate::common::*;
use docsync::{ConflictRetry, Mutation};
use serde_json::json;
use std::sync::Arc;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_week_appends_get_distinct_numbers() {
    const WRITERS: u32 = 8;

    for backend in TestStore::all().await {
        let engine = backend.engine();
        let name = doc("journal");
        seed(&engine, &name, json!({"weeks": []})).await;

        let retry = Arc::new(ConflictRetry::new(fast_retry(WRITERS)));
        let handles: Vec<_> = (0..WRITERS)
            .map(|i| {
                let engine = engine.clone();
                let name = name.clone();
                let retry = Arc::clone(&retry);
                tokio::spawn(async move {
                    // Every client claims week 1; the server decides
                    let mutation =
                        Mutation::append(path("weeks"), json!({"weekNumber": 1, "writer": i}));
                    engine.apply_with_retry(&name, &mutation, retry.as_ref()).await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let doc = engine.fetch(&name).await.unwrap().value;
        let numbers: Vec<u64> = doc["weeks"]
            .as_array()
            .unwrap()
            .iter()
            .map(|w| w["weekNumber"].as_u64().unwrap())
            .collect();
        assert_eq!(
            numbers,
            (1..=u64::from(WRITERS)).collect::<Vec<_>>(),
            "{}",
            backend.label
        );
    }
}
