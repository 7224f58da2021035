//! Document Store Gateway contract
//!
//! The gateway is the sole authority over a document's canonical bytes and
//! version token. Everything above it works on private copies fetched for
//! the duration of one operation.
//!
//! # Atomicity
//!
//! `write_if_version` must compare the expected token and install the new
//! content as one atomic step. No other component locks anything: the
//! correctness of the whole system rests on this compare-and-swap.

use async_trait::async_trait;
use docsync_core::{DocName, JsonValue, Result, VersionToken, Versioned};

/// Conditional-write document store
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read a document with its current version token
    ///
    /// Fails with `NotFound` if no document exists under `name`.
    async fn read_with_version(&self, name: &DocName) -> Result<Versioned<JsonValue>>;

    /// Replace a document only if its current token equals `expected`
    ///
    /// Fails with `Conflict` if the stored token differs at the moment of the
    /// write, `NotFound` if the document does not exist. Returns the new token.
    async fn write_if_version(
        &self,
        name: &DocName,
        document: &JsonValue,
        expected: &VersionToken,
    ) -> Result<VersionToken>;

    /// Create or replace a document regardless of its current version
    ///
    /// Only the full-document create path uses this; mutations never do.
    async fn write_unconditional(&self, name: &DocName, document: &JsonValue)
        -> Result<VersionToken>;

    /// Check whether a document exists
    async fn exists(&self, name: &DocName) -> Result<bool> {
        match self.read_with_version(name).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }
}
