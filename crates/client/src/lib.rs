//! HTTP client for docsync
//!
//! [`DocumentClient`] is what document consumers call. The three mutating
//! methods run through [`ConflictRetry`](docsync_concurrency::ConflictRetry):
//! a 409 from the server re-sends the whole request after a linear backoff,
//! and the server performs a fresh read each time. When retries run out the
//! caller gets `RetriesExhausted`; the client never falls back to a full
//! document PUT.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod config;

pub use client::DocumentClient;
pub use config::{ClientConfig, DEFAULT_BASE_URL};
