//! Shared test utilities for the workspace integration suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's main.rs.

#![allow(dead_code)]

use async_trait::async_trait;
use docsync::{
    DocName, DocPath, DocumentStore, Error, FileStore, JsonValue, MemoryStore, MutationEngine,
    Result, RetryConfig, Sleeper, VersionToken, Versioned,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

// ============================================================================
// Names and paths
// ============================================================================

pub fn doc(name: &str) -> DocName {
    DocName::new(name).unwrap()
}

pub fn path(s: &str) -> DocPath {
    s.parse().unwrap()
}

// ============================================================================
// Backends
// ============================================================================

/// A store under test plus the temp dir keeping a file backend alive
pub struct TestStore {
    pub label: &'static str,
    pub store: Arc<dyn DocumentStore>,
    pub dir: Option<TempDir>,
}

impl TestStore {
    pub fn memory() -> Self {
        Self {
            label: "memory",
            store: Arc::new(MemoryStore::new()),
            dir: None,
        }
    }

    pub async fn file() -> Self {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path(), false).await.unwrap();
        Self {
            label: "file",
            store: Arc::new(store),
            dir: Some(dir),
        }
    }

    /// One of each backend
    pub async fn all() -> Vec<TestStore> {
        vec![Self::memory(), Self::file().await]
    }

    pub fn engine(&self) -> MutationEngine {
        MutationEngine::new(Arc::clone(&self.store))
    }
}

/// Create `name` with `value` and return its first version
pub async fn seed(
    engine: &MutationEngine,
    name: &DocName,
    value: serde_json::Value,
) -> VersionToken {
    engine.replace(name, value.into()).await.unwrap()
}

// ============================================================================
// Retry helpers
// ============================================================================

/// Short delays so retry-heavy tests stay fast
pub fn fast_retry(max_retries: u32) -> RetryConfig {
    RetryConfig::new()
        .with_max_retries(max_retries)
        .with_base_delay_ms(1)
        .with_max_delay_ms(10)
}

/// Records delays instead of sleeping
#[derive(Default, Clone)]
pub struct RecordingSleeper {
    pub delays: Arc<Mutex<Vec<Duration>>>,
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, delay: Duration) {
        self.delays.lock().push(delay);
    }
}

// ============================================================================
// Store wrappers
// ============================================================================

/// Rejects the first `conflicts` conditional writes, counting every call
///
/// An injected conflict happens before the inner write, so a rejected
/// attempt never lands.
pub struct FlakyStore {
    pub inner: Arc<dyn DocumentStore>,
    pub conflicts: AtomicUsize,
    pub conditional_writes: AtomicUsize,
}

impl FlakyStore {
    pub fn new(inner: Arc<dyn DocumentStore>, conflicts: usize) -> Self {
        Self {
            inner,
            conflicts: AtomicUsize::new(conflicts),
            conditional_writes: AtomicUsize::new(0),
        }
    }

    pub fn conditional_writes(&self) -> usize {
        self.conditional_writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn read_with_version(&self, name: &DocName) -> Result<Versioned<JsonValue>> {
        self.inner.read_with_version(name).await
    }

    async fn write_if_version(
        &self,
        name: &DocName,
        document: &JsonValue,
        expected: &VersionToken,
    ) -> Result<VersionToken> {
        self.conditional_writes.fetch_add(1, Ordering::SeqCst);
        let injected = self
            .conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            return Err(Error::conflict(name.as_str(), expected.clone(), None));
        }
        self.inner.write_if_version(name, document, expected).await
    }

    async fn write_unconditional(
        &self,
        name: &DocName,
        document: &JsonValue,
    ) -> Result<VersionToken> {
        self.inner.write_unconditional(name, document).await
    }
}

/// Serves a pinned (possibly stale) snapshot for the first read, then
/// passes every call through
///
/// Models a client that read the document before someone else wrote it.
pub struct PinnedFirstRead {
    pub inner: Arc<dyn DocumentStore>,
    pinned: Mutex<Option<Versioned<JsonValue>>>,
}

impl PinnedFirstRead {
    pub fn new(inner: Arc<dyn DocumentStore>, snapshot: Versioned<JsonValue>) -> Self {
        Self {
            inner,
            pinned: Mutex::new(Some(snapshot)),
        }
    }
}

#[async_trait]
impl DocumentStore for PinnedFirstRead {
    async fn read_with_version(&self, name: &DocName) -> Result<Versioned<JsonValue>> {
        let pinned = self.pinned.lock().take();
        match pinned {
            Some(snapshot) => Ok(snapshot),
            None => self.inner.read_with_version(name).await,
        }
    }

    async fn write_if_version(
        &self,
        name: &DocName,
        document: &JsonValue,
        expected: &VersionToken,
    ) -> Result<VersionToken> {
        self.inner.write_if_version(name, document, expected).await
    }

    async fn write_unconditional(
        &self,
        name: &DocName,
        document: &JsonValue,
    ) -> Result<VersionToken> {
        self.inner.write_unconditional(name, document).await
    }
}
