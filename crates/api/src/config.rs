//! Server configuration
//!
//! Parsed once from the command line and environment at start-up. Request
//! handlers only ever see the engine built from it.

use clap::{ArgAction, Parser};
use docsync_engine::{EngineConfig, SequenceRule};
use docsync_storage::StoreConfig;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Default request body limit (1 MiB)
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// `docsync-server` settings
#[derive(Debug, Clone, Parser)]
#[command(name = "docsync-server", version, about = "Path-addressed JSON document server")]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "DOCSYNC_ADDR", default_value = "127.0.0.1:8080")]
    pub addr: SocketAddr,

    /// Directory for document files; documents are kept in memory when unset
    #[arg(long, env = "DOCSYNC_STORAGE_DIR")]
    pub storage_dir: Option<PathBuf>,

    /// fsync each document write before acknowledging it
    #[arg(long, env = "DOCSYNC_SYNC_WRITES", default_value_t = true, action = ArgAction::Set)]
    pub sync_writes: bool,

    /// Server-computed sequence field, `path=field` (repeatable)
    ///
    /// Defaults to `weeks=weekNumber` when none are given.
    #[arg(
        long = "sequence",
        env = "DOCSYNC_SEQUENCE",
        value_name = "PATH=FIELD",
        value_delimiter = ','
    )]
    pub sequences: Vec<SequenceRule>,

    /// Largest accepted request body in bytes
    #[arg(long, env = "DOCSYNC_MAX_BODY_BYTES", default_value_t = DEFAULT_MAX_BODY_BYTES)]
    pub max_body_bytes: usize,
}

impl ServerConfig {
    /// Storage settings
    pub fn store_config(&self) -> StoreConfig {
        match &self.storage_dir {
            Some(dir) => StoreConfig::file(dir.clone()).with_sync_writes(self.sync_writes),
            None => StoreConfig::memory(),
        }
    }

    /// Engine settings
    pub fn engine_config(&self) -> EngineConfig {
        if self.sequences.is_empty() {
            EngineConfig::default()
        } else {
            EngineConfig::without_sequences().with_sequences(self.sequences.clone())
        }
    }
}
