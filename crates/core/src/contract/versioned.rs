//! Generic versioned wrapper type
//!
//! Every read from a document store returns data wrapped in `Versioned<T>`,
//! and every mutation operation returns the post-write document the same way.
//!
//! ```text
//! fn read_with_version(&self, name) -> Result<Versioned<JsonValue>>
//! fn write_if_version(&self, name, doc, expected) -> Result<VersionToken>
//! ```

use super::VersionToken;
use serde::{Deserialize, Serialize};

/// A value with the version token it was read at (or written as)
///
/// ## Invariants
///
/// - `version` identifies exactly the stored content `value` was taken from
/// - The value is a private copy; mutating it never touches the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Versioned<T> {
    /// The actual value
    pub value: T,

    /// Version token of the stored content
    pub version: VersionToken,
}

impl<T> Versioned<T> {
    /// Create a new versioned value
    pub fn new(value: T, version: VersionToken) -> Self {
        Versioned { value, version }
    }

    /// Map the inner value to a new type
    pub fn map<U, F>(self, f: F) -> Versioned<U>
    where
        F: FnOnce(T) -> U,
    {
        Versioned {
            value: f(self.value),
            version: self.version,
        }
    }

    /// Split into value and version
    pub fn into_parts(self) -> (T, VersionToken) {
        (self.value, self.version)
    }

    /// Discard the version and keep the value
    pub fn into_value(self) -> T {
        self.value
    }
}
