//! In-memory document store
//!
//! # Design
//!
//! - DashMap: sharded map, lock-free reads
//! - Documents are held as serialized bytes, so every read hands out a
//!   private parsed copy and the stored form is always well-formed JSON
//! - Compare-and-swap runs under the entry's shard write lock
//! - One store-wide generation counter: every write gets a fresh token

use crate::gateway::DocumentStore;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use docsync_core::{DocName, Error, JsonValue, Result, VersionToken, Versioned};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// A stored document: canonical bytes plus the token they were written as
#[derive(Debug, Clone)]
struct StoredDoc {
    bytes: Arc<[u8]>,
    version: VersionToken,
}

/// Process-local document store
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: DashMap<DocName, StoredDoc>,
    generation: AtomicU64,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    /// Check if the store holds no documents
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    fn encode(&self, document: &JsonValue) -> StoredDoc {
        let bytes = document.to_bytes();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        StoredDoc {
            version: VersionToken::derive(generation, &bytes),
            bytes: bytes.into(),
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn read_with_version(&self, name: &DocName) -> Result<Versioned<JsonValue>> {
        let stored = self
            .docs
            .get(name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| Error::not_found(name.as_str()))?;
        let value = JsonValue::from_slice(&stored.bytes)?;
        Ok(Versioned::new(value, stored.version))
    }

    async fn write_if_version(
        &self,
        name: &DocName,
        document: &JsonValue,
        expected: &VersionToken,
    ) -> Result<VersionToken> {
        // Encode outside the shard lock; a conflicting attempt just wastes
        // one generation number.
        let next = self.encode(document);
        match self.docs.entry(name.clone()) {
            Entry::Vacant(_) => Err(Error::not_found(name.as_str())),
            Entry::Occupied(mut occupied) => {
                let current = &occupied.get().version;
                if current != expected {
                    debug!(doc = %name, %expected, actual = %current, "Conditional write rejected");
                    return Err(Error::conflict(
                        name.as_str(),
                        expected.clone(),
                        Some(current.clone()),
                    ));
                }
                let version = next.version.clone();
                occupied.insert(next);
                Ok(version)
            }
        }
    }

    async fn write_unconditional(
        &self,
        name: &DocName,
        document: &JsonValue,
    ) -> Result<VersionToken> {
        let next = self.encode(document);
        let version = next.version.clone();
        self.docs.insert(name.clone(), next);
        Ok(version)
    }
}
