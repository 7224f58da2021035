//! Core types for docsync
//!
//! This crate defines the foundational types used throughout the system:
//! - JsonValue: the in-memory document (tagged JSON variant)
//! - DocPath / PathSegment: dot-separated addresses into a document
//! - resolve / resolve_mut: the path resolver
//! - DocName: validated document identity
//! - Mutation: Append, RemoveById and PatchField requests
//! - VersionToken / Versioned<T>: opaque ETags and versioned reads
//! - Error: the error taxonomy shared by every layer

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod contract;
pub mod error;
pub mod json;
pub mod mutation;
pub mod path;
pub mod types;

pub use contract::{VersionToken, Versioned};
pub use error::{Error, Result};
pub use json::{
    JsonValue, LimitError, MAX_ARRAY_SIZE, MAX_DOCUMENT_SIZE, MAX_NESTING_DEPTH, MAX_PATH_LENGTH,
};
pub use mutation::{Mutation, ID_FIELD};
pub use path::{node_kind, resolve, resolve_mut, DocPath, PathParseError, PathSegment};
pub use types::{DocName, MAX_DOC_NAME_LENGTH};
