//! Document identity
//!
//! A document is addressed by a [`DocName`]. Names flow straight into URLs
//! and, on the file backend, into file names, so they are validated once at
//! the boundary and carried as a newtype afterwards.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum document name length in bytes
pub const MAX_DOC_NAME_LENGTH: usize = 255;

/// Validated document name
///
/// Rejects empty names, names longer than [`MAX_DOC_NAME_LENGTH`] bytes, path
/// separators, `..`, NUL and other control characters.
///
/// ```
/// use docsync_core::DocName;
///
/// assert!(DocName::new("season-3").is_ok());
/// assert!(DocName::new("../etc/passwd").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocName(String);

impl DocName {
    /// Validate and wrap a document name
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::invalid_input("document name cannot be empty"));
        }
        if name.len() > MAX_DOC_NAME_LENGTH {
            return Err(Error::invalid_input(format!(
                "document name exceeds {MAX_DOC_NAME_LENGTH} bytes"
            )));
        }
        if name.contains('/') || name.contains('\\') || name.contains("..") {
            return Err(Error::invalid_input(format!(
                "document name contains invalid characters: {name:?}"
            )));
        }
        if name.chars().any(|c| c.is_control()) {
            return Err(Error::invalid_input(format!(
                "document name contains control characters: {name:?}"
            )));
        }
        Ok(DocName(name))
    }

    /// The name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for DocName {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        DocName::new(value)
    }
}

impl From<DocName> for String {
    fn from(name: DocName) -> Self {
        name.0
    }
}

impl AsRef<str> for DocName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
