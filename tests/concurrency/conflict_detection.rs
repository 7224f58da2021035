//! Conflict detection: a write based on a superseded version is rejected

use crate::common::*;
use docsync::{DocumentStore, Error, JsonValue, Mutation, MutationEngine};
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn stale_version_write_conflicts() {
    for backend in TestStore::all().await {
        let engine = backend.engine();
        let name = doc("plan");
        seed(&engine, &name, json!({"n": 0})).await;

        let stale = engine.fetch(&name).await.unwrap();
        engine
            .patch_field(&name, path("n"), json!(1).into())
            .await
            .unwrap();

        let err = backend
            .store
            .write_if_version(&name, &JsonValue::from(json!({"n": 2})), &stale.version)
            .await
            .unwrap_err();
        assert!(err.is_conflict(), "{}: {err}", backend.label);
        assert_eq!(
            engine.fetch(&name).await.unwrap().value,
            JsonValue::from(json!({"n": 1})),
            "{}",
            backend.label
        );
    }
}

#[tokio::test]
async fn any_intervening_write_invalidates_the_token() {
    for backend in TestStore::all().await {
        let engine = backend.engine();
        let name = doc("plan");
        seed(&engine, &name, json!({"items": []})).await;
        let v1 = engine.fetch(&name).await.unwrap().version;

        // Even a write that leaves the content unchanged moves the version
        engine.replace(&name, json!({"items": []}).into()).await.unwrap();

        let err = backend
            .store
            .write_if_version(&name, &JsonValue::from(json!({"items": [1]})), &v1)
            .await
            .unwrap_err();
        assert!(err.is_conflict(), "{}", backend.label);
    }
}

#[tokio::test]
async fn engine_apply_surfaces_conflict_without_retrying() {
    for backend in TestStore::all().await {
        let base = backend.engine();
        let name = doc("plan");
        seed(&base, &name, json!({"items": []})).await;
        let snapshot = base.fetch(&name).await.unwrap();
        base.append(&name, path("items"), json!("first").into())
            .await
            .unwrap();

        // This engine's first read is the pre-append snapshot
        let stale = MutationEngine::new(Arc::new(PinnedFirstRead::new(
            Arc::clone(&backend.store),
            snapshot,
        )));
        let err = stale
            .apply(&name, &Mutation::append(path("items"), json!("second")))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict { .. }), "{}", backend.label);
        assert_eq!(
            base.fetch(&name).await.unwrap().value["items"],
            json!(["first"]),
            "{}",
            backend.label
        );
    }
}
