//! Error types for docsync
//!
//! Every failure above the storage boundary is one of the typed conditions
//! below, so callers can tell "retry may help" apart from "retry is pointless".
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! # Categories
//!
//! | Category | Variants | Retried by the conflict retry client |
//! |----------|----------|--------------------------------------|
//! | Not Found | `NotFound`, `ItemNotFound` | no |
//! | Validation | `InvalidPath`, `InvalidInput` | no |
//! | Concurrency | `Conflict` | yes, bounded |
//! | Concurrency | `RetriesExhausted` | no (terminal) |
//! | System | `Upstream` | no |

use crate::contract::VersionToken;
use crate::json::LimitError;
use crate::path::PathParseError;
use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

/// Result type alias for docsync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for docsync
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum Error {
    // ==================== Not Found ====================
    /// Named document does not exist
    #[error("document not found: {name}")]
    NotFound {
        /// Document name
        name: String,
    },

    /// RemoveById found no element with the given id
    #[error("no item with id {id} at '{path}'")]
    ItemNotFound {
        /// Path of the array that was scanned
        path: String,
        /// The id that was searched for (JSON text)
        id: String,
    },

    // ==================== Validation ====================
    /// Path does not resolve to a container of the required shape
    #[error("invalid path '{path}': {reason}")]
    InvalidPath {
        /// The offending path
        path: String,
        /// Why it was rejected
        reason: String,
    },

    /// Malformed request: bad document name, oversized document, bad body
    #[error("invalid input: {reason}")]
    InvalidInput {
        /// Why it was rejected
        reason: String,
    },

    // ==================== Concurrency ====================
    /// Version precondition failed on write
    #[error("version conflict on {name}: expected {expected}")]
    Conflict {
        /// Document name
        name: String,
        /// Token the writer supplied
        expected: VersionToken,
        /// Token currently held by the store, when known
        actual: Option<VersionToken>,
    },

    /// Conflict persisted past the retry bound
    #[error("gave up after {attempts} conflicting attempts")]
    RetriesExhausted {
        /// Number of attempts made
        attempts: u32,
    },

    // ==================== System ====================
    /// Storage or transport failure
    #[error("upstream error: {reason}")]
    Upstream {
        /// Underlying failure
        reason: String,
    },
}

impl Error {
    /// Document not found
    pub fn not_found(name: impl Into<String>) -> Self {
        Error::NotFound { name: name.into() }
    }

    /// Invalid path with a reason
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Invalid input with a reason
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Error::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Upstream failure with a reason
    pub fn upstream(reason: impl Into<String>) -> Self {
        Error::Upstream {
            reason: reason.into(),
        }
    }

    /// Version conflict
    pub fn conflict(
        name: impl Into<String>,
        expected: VersionToken,
        actual: Option<VersionToken>,
    ) -> Self {
        Error::Conflict {
            name: name.into(),
            expected,
            actual,
        }
    }

    /// Check if this is a version conflict
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::Conflict { .. })
    }

    /// Check if retrying the whole read-mutate-write cycle may succeed
    ///
    /// Only version conflicts qualify; everything else is permanent for the
    /// request or an infrastructure failure this layer does not retry.
    pub fn is_retryable(&self) -> bool {
        self.is_conflict()
    }

    /// Check if the named document is missing
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// Stable snake-case code, as used in serialized error bodies
    pub fn code(&self) -> &'static str {
        match self {
            Error::NotFound { .. } => "not_found",
            Error::ItemNotFound { .. } => "item_not_found",
            Error::InvalidPath { .. } => "invalid_path",
            Error::InvalidInput { .. } => "invalid_input",
            Error::Conflict { .. } => "conflict",
            Error::RetriesExhausted { .. } => "retries_exhausted",
            Error::Upstream { .. } => "upstream",
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::upstream(format!("I/O error: {e}"))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::upstream(format!("serialization error: {e}"))
    }
}

impl From<LimitError> for Error {
    fn from(e: LimitError) -> Self {
        Error::invalid_input(e.to_string())
    }
}

impl From<PathParseError> for Error {
    fn from(e: PathParseError) -> Self {
        Error::InvalidPath {
            path: e.path().to_string(),
            reason: e.to_string(),
        }
    }
}
