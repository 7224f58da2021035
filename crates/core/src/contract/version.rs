//! Version token type
//!
//! A `VersionToken` is the opaque marker of a document's content generation
//! (the ETag of the HTTP surface). Every read returns one, every conditional
//! write requires one.
//!
//! ## Invariants
//!
//! - Two reads of the same stored content return equal tokens
//! - Every successful write produces a token never seen before for that store
//!
//! Callers must treat the token as opaque: the only meaningful operation is
//! equality. The stores in this workspace build it from a monotonic write
//! generation plus a content digest, see [`VersionToken::derive`].

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Number of hex characters of the content digest kept in a derived token
const DIGEST_PREFIX_LEN: usize = 16;

/// Opaque version token for a stored document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionToken(String);

impl VersionToken {
    /// Wrap an opaque token received from a store or a client
    ///
    /// Surrounding ETag quotes are stripped so `"abc"` and `abc` compare equal.
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let trimmed = raw.trim().trim_matches('"');
        VersionToken(trimmed.to_string())
    }

    /// Derive a token from a write generation and the stored bytes
    ///
    /// The generation makes tokens distinct across writes even when the
    /// content is identical; the digest lets a reader spot a torn or
    /// externally edited file.
    pub fn derive(generation: u64, bytes: &[u8]) -> Self {
        let digest = hex::encode(Sha256::digest(bytes));
        VersionToken(format!(
            "{:016x}-{}",
            generation,
            &digest[..DIGEST_PREFIX_LEN]
        ))
    }

    /// Raw token text (unquoted)
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Token formatted as a strong HTTP ETag (quoted)
    pub fn to_etag(&self) -> String {
        format!("\"{}\"", self.0)
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VersionToken {
    fn from(raw: &str) -> Self {
        VersionToken::new(raw)
    }
}

impl From<String> for VersionToken {
    fn from(raw: String) -> Self {
        VersionToken::new(raw)
    }
}

// ============================================================================
// Tests
// ============================================================================
