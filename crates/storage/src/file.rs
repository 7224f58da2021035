//! File-backed document store
//!
//! One envelope file per document, `<root>/<name>.json`:
//!
//! ```text
//! { "generation": 3, "modified_at": "2024-05-01T10:00:00Z", "document": { ... } }
//! ```
//!
//! Writes go to a temp file that is flushed (and fsynced when `sync_writes`)
//! before an atomic rename over the document file, so readers always see
//! either the old or the new envelope, never a torn one.
//!
//! Every write holds an exclusive OS lock on `<root>/.<name>.lock` across
//! read-compare-rename. The lock is advisory and shared by every process
//! (and every `FileStore`) opened on the same directory, which makes it the
//! compare-and-swap primitive. Tasks in one store queue on an async mutex
//! first so only one of them waits on the OS lock at a time.

use crate::gateway::DocumentStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use docsync_core::{DocName, Error, JsonValue, Result, VersionToken, Versioned};
use serde::{Deserialize, Serialize};
use fs2::FileExt;
use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, warn};

/// On-disk envelope around a document
#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    generation: u64,
    modified_at: DateTime<Utc>,
    document: JsonValue,
}

impl Envelope {
    fn version(&self) -> VersionToken {
        VersionToken::derive(self.generation, &self.document.to_bytes())
    }
}

/// Exclusive hold on one document, released on drop
struct DocLock {
    file: std::fs::File,
    _local: OwnedMutexGuard<()>,
}

impl Drop for DocLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

/// Per-document locks: an async mutex per store, then a lock file per directory
#[derive(Default)]
struct WriteLocks {
    locks: DashMap<DocName, Arc<Mutex<()>>>,
}

impl WriteLocks {
    async fn lock(&self, root: &Path, name: &DocName) -> Result<DocLock> {
        let local = self
            .locks
            .entry(name.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone();
        let local = local.lock_owned().await;

        let lock_path = root.join(format!(".{}.lock", name));
        let file = tokio::task::spawn_blocking(move || -> std::io::Result<std::fs::File> {
            let file = OpenOptions::new()
                .create(true)
                .truncate(false)
                .read(true)
                .write(true)
                .open(&lock_path)?;
            FileExt::lock_exclusive(&file)?;
            Ok(file)
        })
        .await
        .map_err(|e| Error::upstream(format!("lock task failed for {name}: {e}")))??;

        Ok(DocLock {
            file,
            _local: local,
        })
    }
}

/// Document store keeping one JSON file per document
pub struct FileStore {
    root: PathBuf,
    sync_writes: bool,
    locks: WriteLocks,
}

impl FileStore {
    /// Open a store rooted at `root`, creating the directory if needed
    pub async fn open(root: impl Into<PathBuf>, sync_writes: bool) -> Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self {
            root,
            sync_writes,
            locks: WriteLocks::default(),
        })
    }

    /// Directory holding the document files
    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    fn doc_path(&self, name: &DocName) -> PathBuf {
        self.root.join(format!("{}.json", name))
    }

    async fn load(&self, name: &DocName) -> Result<Option<Envelope>> {
        let bytes = match tokio::fs::read(self.doc_path(name)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let envelope = serde_json::from_slice(&bytes).map_err(|e| {
            warn!(doc = %name, error = %e, "Stored document is not a valid envelope");
            Error::upstream(format!("corrupt document file for {name}: {e}"))
        })?;
        Ok(Some(envelope))
    }

    async fn save(&self, name: &DocName, envelope: &Envelope) -> Result<()> {
        let content = serde_json::to_vec(envelope)?;
        let path = self.doc_path(name);
        let tmp_path = self
            .root
            .join(format!(".{}.{}.tmp", name, uuid::Uuid::new_v4().simple()));

        let write_result = async {
            let mut file = tokio::fs::File::create(&tmp_path).await?;
            file.write_all(&content).await?;
            file.flush().await?;
            if self.sync_writes {
                file.sync_all().await?;
            }
            drop(file);
            tokio::fs::rename(&tmp_path, &path).await
        }
        .await;

        if let Err(e) = write_result {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FileStore {
    async fn read_with_version(&self, name: &DocName) -> Result<Versioned<JsonValue>> {
        let envelope = self
            .load(name)
            .await?
            .ok_or_else(|| Error::not_found(name.as_str()))?;
        let version = envelope.version();
        Ok(Versioned::new(envelope.document, version))
    }

    async fn write_if_version(
        &self,
        name: &DocName,
        document: &JsonValue,
        expected: &VersionToken,
    ) -> Result<VersionToken> {
        let _lock = self.locks.lock(&self.root, name).await?;

        let current = self
            .load(name)
            .await?
            .ok_or_else(|| Error::not_found(name.as_str()))?;
        let current_version = current.version();
        if &current_version != expected {
            debug!(doc = %name, %expected, actual = %current_version, "Conditional write rejected");
            return Err(Error::conflict(
                name.as_str(),
                expected.clone(),
                Some(current_version),
            ));
        }

        let next = Envelope {
            generation: current.generation + 1,
            modified_at: Utc::now(),
            document: document.clone(),
        };
        self.save(name, &next).await?;
        Ok(next.version())
    }

    async fn write_unconditional(
        &self,
        name: &DocName,
        document: &JsonValue,
    ) -> Result<VersionToken> {
        let _lock = self.locks.lock(&self.root, name).await?;

        // An unreadable envelope fails the write rather than restarting the
        // generation, which would re-issue tokens already handed out.
        let generation = self
            .load(name)
            .await?
            .map_or(1, |existing| existing.generation + 1);
        let next = Envelope {
            generation,
            modified_at: Utc::now(),
            document: document.clone(),
        };
        self.save(name, &next).await?;
        Ok(next.version())
    }
}
