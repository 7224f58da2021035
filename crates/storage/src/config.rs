//! Store configuration
//!
//! Built once at start-up and handed to [`open_store`]; request handlers
//! never read storage settings from the environment.

use crate::file::FileStore;
use crate::gateway::DocumentStore;
use crate::memory::MemoryStore;
use docsync_core::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Which gateway implementation backs the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    /// Process-local, lost on restart
    Memory,
    /// One JSON file per document under `root`
    File {
        /// Directory holding the document files
        root: PathBuf,
    },
}

/// Storage configuration
///
/// # Example
/// ```
/// use docsync_storage::StoreConfig;
///
/// let config = StoreConfig::file("./data").with_sync_writes(true);
/// assert!(config.sync_writes);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Backend selection
    pub backend: Backend,
    /// fsync every document write (file backend only)
    pub sync_writes: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Memory,
            sync_writes: true,
        }
    }
}

impl StoreConfig {
    /// In-memory store configuration
    pub fn memory() -> Self {
        Self::default()
    }

    /// File-backed store configuration rooted at `root`
    pub fn file(root: impl Into<PathBuf>) -> Self {
        Self {
            backend: Backend::File { root: root.into() },
            ..Self::default()
        }
    }

    /// Set whether writes are fsynced before they are acknowledged
    pub fn with_sync_writes(mut self, sync_writes: bool) -> Self {
        self.sync_writes = sync_writes;
        self
    }
}

/// Open the store described by `config`
///
/// Creates the root directory of a file backend if it is missing.
pub async fn open_store(config: &StoreConfig) -> Result<Arc<dyn DocumentStore>> {
    match &config.backend {
        Backend::Memory => {
            info!("Using in-memory document store");
            Ok(Arc::new(MemoryStore::new()))
        }
        Backend::File { root } => {
            let store = FileStore::open(root.clone(), config.sync_writes).await?;
            info!(root = %root.display(), sync_writes = config.sync_writes, "Using file document store");
            Ok(Arc::new(store))
        }
    }
}
