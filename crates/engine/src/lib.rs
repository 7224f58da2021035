//! Mutation engine for docsync
//!
//! This crate runs the three sub-document mutations against a
//! [`DocumentStore`](docsync_storage::DocumentStore):
//! - MutationEngine: read-with-version, apply, conditional write
//! - SequenceRule: ordering fields computed inside the mutation
//! - EngineConfig: start-up configuration
//!
//! The engine never retries internally and never locks. A conflicting
//! attempt is returned to the caller, who re-runs it through
//! [`ConflictRetry`](docsync_concurrency::ConflictRetry).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod engine;
pub mod sequence;

pub use config::EngineConfig;
pub use engine::MutationEngine;
pub use sequence::{PatternSegment, SequenceRule};
