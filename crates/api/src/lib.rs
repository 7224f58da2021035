//! HTTP API for docsync
//!
//! - `http`: axum router and handlers over a [`MutationEngine`](docsync_engine::MutationEngine)
//! - `error`: mapping from the error taxonomy to status codes and JSON bodies
//! - `config`: `docsync-server` command line and environment settings

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod http;

pub use config::{ServerConfig, DEFAULT_MAX_BODY_BYTES};
pub use error::{ApiError, CONFLICT_MESSAGE};
pub use http::{router, AppState, DOCUMENT_PATH, HEALTH_PATH};
