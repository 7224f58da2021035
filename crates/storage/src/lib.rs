//! Storage layer for docsync
//!
//! This crate implements the Document Store Gateway:
//! - DocumentStore: read-with-version, conditional write, unconditional write
//! - MemoryStore: DashMap-backed, compare-and-swap under the shard lock
//! - FileStore: one envelope file per document, atomic rename on write
//! - StoreConfig / open_store: backend selection at start-up
//!
//! # Concurrency
//!
//! The store is the only component that serializes writers. Conditional
//! writes compare the caller's token with the stored one and install the new
//! content in a single step; everything above this crate is lock-free.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod file;
pub mod gateway;
pub mod memory;

pub use config::{open_store, Backend, StoreConfig};
pub use file::FileStore;
pub use gateway::DocumentStore;
pub use memory::MemoryStore;
