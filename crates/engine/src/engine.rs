//! Mutation Operations
//!
//! Every mutation follows the same template:
//!
//! 1. `read_with_version` the document (a private copy plus its token)
//! 2. resolve the target and check its shape
//! 3. apply the change in memory
//! 4. `write_if_version` with the token from step 1
//!
//! A failure in steps 1-3 means no write is attempted. A conflict in step 4
//! is returned as-is: the whole cycle must be re-run from a fresh read, which
//! is what [`MutationEngine::apply_with_retry`] does.

use crate::config::EngineConfig;
use docsync_concurrency::{ConflictRetry, Sleeper};
use docsync_core::{
    resolve, DocName, DocPath, Error, JsonValue, Mutation, Result, VersionToken, Versioned,
};
use docsync_storage::DocumentStore;
use serde_json::Value;
use std::borrow::Cow;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Applies mutations to documents held by a [`DocumentStore`]
///
/// Stateless apart from its configuration: any number of engines (in any
/// number of processes) may share one store.
#[derive(Clone)]
pub struct MutationEngine {
    store: Arc<dyn DocumentStore>,
    config: EngineConfig,
}

impl std::fmt::Debug for MutationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MutationEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl MutationEngine {
    /// Engine with the default configuration
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    /// Engine with an explicit configuration
    pub fn with_config(store: Arc<dyn DocumentStore>, config: EngineConfig) -> Self {
        Self { store, config }
    }

    /// The underlying store
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// The active configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Read a document with its version token
    pub async fn fetch(&self, name: &DocName) -> Result<Versioned<JsonValue>> {
        self.store.read_with_version(name).await
    }

    /// Create or replace a whole document, ignoring its current version
    ///
    /// This is the create path. Mutations never fall back to it.
    #[instrument(skip(self, name, document), fields(doc = %name))]
    pub async fn replace(&self, name: &DocName, document: JsonValue) -> Result<VersionToken> {
        document.validate()?;
        let version = self.store.write_unconditional(name, &document).await?;
        info!(%version, "Document replaced");
        Ok(version)
    }

    /// Push `value` onto the array at `path`
    pub async fn append(
        &self,
        name: &DocName,
        path: DocPath,
        value: JsonValue,
    ) -> Result<Versioned<JsonValue>> {
        self.apply(name, &Mutation::append(path, value)).await
    }

    /// Remove the first element of the array at `path` whose `id` equals `id`
    pub async fn remove_by_id(
        &self,
        name: &DocName,
        path: DocPath,
        id: JsonValue,
    ) -> Result<Versioned<JsonValue>> {
        self.apply(name, &Mutation::remove_by_id(path, id)).await
    }

    /// Create or overwrite the field at `path`
    pub async fn patch_field(
        &self,
        name: &DocName,
        path: DocPath,
        value: JsonValue,
    ) -> Result<Versioned<JsonValue>> {
        self.apply(name, &Mutation::patch_field(path, value)).await
    }

    /// Run one read-mutate-conditional-write cycle
    ///
    /// Returns the full post-mutation document with its new version.
    /// Fails with `Conflict` if another writer got in between the read and
    /// the write; this method does not retry.
    #[instrument(
        skip(self, name, mutation),
        fields(doc = %name, op = mutation.kind(), path = %mutation.path())
    )]
    pub async fn apply(&self, name: &DocName, mutation: &Mutation) -> Result<Versioned<JsonValue>> {
        let path = mutation.path();
        path.validate()
            .map_err(|e| Error::invalid_path(path.to_string(), e.to_string()))?;

        let (mut document, version) = self.store.read_with_version(name).await?.into_parts();
        debug!(%version, "Read document");

        let mutation = self.stamp_sequence(mutation, &document)?;
        mutation.apply_to(document.as_inner_mut())?;
        document.validate()?;

        let new_version = self
            .store
            .write_if_version(name, &document, &version)
            .await?;
        debug!(%new_version, "Mutation committed");
        Ok(Versioned::new(document, new_version))
    }

    /// Run a mutation through the conflict retry client
    ///
    /// Each attempt is a complete [`apply`](Self::apply) from a fresh read.
    pub async fn apply_with_retry<S: Sleeper>(
        &self,
        name: &DocName,
        mutation: &Mutation,
        retry: &ConflictRetry<S>,
    ) -> Result<Versioned<JsonValue>> {
        retry.perform(move || self.apply(name, mutation)).await
    }

    /// Assign the configured sequence field on an appended object
    ///
    /// The number comes from the same copy the append is applied to, so it
    /// is written (or rejected) together with the append.
    fn stamp_sequence<'m>(
        &self,
        mutation: &'m Mutation,
        document: &JsonValue,
    ) -> Result<Cow<'m, Mutation>> {
        let Mutation::Append { path, value } = mutation else {
            return Ok(Cow::Borrowed(mutation));
        };
        let Some(rule) = self.config.sequence_for(path) else {
            return Ok(Cow::Borrowed(mutation));
        };
        let Some(existing) = resolve(document, path).and_then(Value::as_array) else {
            return Ok(Cow::Borrowed(mutation));
        };

        let mut stamped = value.clone();
        if !rule.stamp(existing, stamped.as_inner_mut())? {
            return Ok(Cow::Borrowed(mutation));
        }
        debug!(field = rule.field(), "Assigned sequence number");
        Ok(Cow::Owned(Mutation::append(path.clone(), stamped)))
    }
}
