//! docsync - path-addressed JSON documents with lost-update-free mutations
//!
//! Many clients edit small named JSON documents concurrently. Instead of
//! whole-document GET-modify-PUT, callers send one of three sub-document
//! mutations (append to an array, remove by id, patch one field). Each runs
//! as read-with-version, apply, conditional write; a stale version is
//! rejected and the caller re-runs the mutation after a short backoff.
//!
//! # Quick Start
//!
//! ```
//! use docsync::{DocName, MemoryStore, MutationEngine};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> docsync::Result<()> {
//! let engine = MutationEngine::new(Arc::new(MemoryStore::new()));
//! let name = DocName::new("plan")?;
//! engine.replace(&name, json!({"resources": []}).into()).await?;
//!
//! let updated = engine
//!     .append(&name, "resources".parse()?, json!({"id": "r1"}).into())
//!     .await?;
//! assert_eq!(updated.value["resources"][0]["id"], json!("r1"));
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! | Crate | Role |
//! |-------|------|
//! | `docsync-core` | documents, paths, the resolver, mutations, errors |
//! | `docsync-storage` | the store gateway and its compare-and-swap |
//! | `docsync-concurrency` | the conflict retry client |
//! | `docsync-engine` | read-mutate-conditional-write |
//! | `docsync-api` | HTTP surface and `docsync-server` |
//! | `docsync-client` | HTTP client for document consumers |

pub use docsync_api::{router, ApiError, AppState, ServerConfig};
pub use docsync_client::{ClientConfig, DocumentClient};
pub use docsync_concurrency::{ConflictRetry, RetryConfig, Sleeper, TokioSleeper};
pub use docsync_core::{
    resolve, resolve_mut, DocName, DocPath, Error, JsonValue, Mutation, PathSegment, Result,
    VersionToken, Versioned,
};
pub use docsync_engine::{EngineConfig, MutationEngine, SequenceRule};
pub use docsync_storage::{open_store, Backend, DocumentStore, FileStore, MemoryStore, StoreConfig};
