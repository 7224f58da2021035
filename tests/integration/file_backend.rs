//! File backend through the whole stack, across restarts

use crate::common::*;
use docsync::{open_store, DocumentStore, JsonValue, MutationEngine, StoreConfig};
use serde_json::json;
use tempfile::TempDir;

#[tokio::test]
async fn mutations_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let config = StoreConfig::file(dir.path().join("docs"));
    let name = doc("journal");

    let last_version = {
        let engine = MutationEngine::new(open_store(&config).await.unwrap());
        seed(&engine, &name, json!({"weeks": [], "title": "Spring"})).await;
        engine
            .append(&name, path("weeks"), json!({"goal": "walk"}).into())
            .await
            .unwrap();
        engine
            .patch_field(&name, path("title"), json!("Summer").into())
            .await
            .unwrap()
            .version
    };

    let engine = MutationEngine::new(open_store(&config).await.unwrap());
    let read = engine.fetch(&name).await.unwrap();
    assert_eq!(read.version, last_version);
    assert_eq!(
        read.value,
        JsonValue::from(json!({"weeks": [{"goal": "walk", "weekNumber": 1}], "title": "Summer"}))
    );
}

#[tokio::test]
async fn two_processes_sharing_a_directory_still_conflict() {
    let dir = TempDir::new().unwrap();
    let config = StoreConfig::file(dir.path());
    let name = doc("shared");

    // Separate store instances stand in for separate handler processes
    let first = MutationEngine::new(open_store(&config).await.unwrap());
    let second = MutationEngine::new(open_store(&config).await.unwrap());
    seed(&first, &name, json!({"items": []})).await;

    let seen_by_second = second.fetch(&name).await.unwrap();
    first
        .append(&name, path("items"), json!(1).into())
        .await
        .unwrap();

    let err = second
        .store()
        .write_if_version(&name, &json!({"items": [2]}).into(), &seen_by_second.version)
        .await
        .unwrap_err();
    assert!(err.is_conflict());
}
