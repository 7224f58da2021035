//! Document paths and the path resolver
//!
//! A [`DocPath`] is a dot-separated address into a document tree:
//! `weeks.1.completions` is key `weeks`, index `1`, key `completions`.
//!
//! # Path Syntax
//!
//! | Syntax | Meaning | Example |
//! |--------|---------|---------|
//! | `key` | Object property | `resources` |
//! | `n` (all digits) | Array index | `0` |
//! | `a.b` | Nested segments | `weeks.0.event` |
//! | (empty) | Root | `` |
//!
//! # Reserved keys
//!
//! A segment made only of ASCII digits is always an array index. Object keys
//! that consist only of digits are therefore reserved: they cannot be
//! addressed by a parsed path, and an index segment applied to an object
//! never resolves.
//!
//! # Resolution
//!
//! [`resolve`] and [`resolve_mut`] pattern-match the tagged JSON variant at
//! every step. They are pure: no intermediate containers are created.

use crate::json::{LimitError, MAX_PATH_LENGTH};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// Parse Errors
// =============================================================================

/// Error type for path parsing
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathParseError {
    /// Empty segment (leading, trailing or doubled dot)
    #[error("empty segment at position {position}")]
    EmptySegment {
        /// Full path text
        path: String,
        /// Segment position (0-based)
        position: usize,
    },

    /// All-digit segment that does not fit an index
    #[error("index out of range at position {position}")]
    InvalidIndex {
        /// Full path text
        path: String,
        /// Segment position (0-based)
        position: usize,
    },

    /// Too many segments
    #[error("{1}")]
    TooLong(String, LimitError),
}

impl PathParseError {
    /// The path text that failed to parse
    pub fn path(&self) -> &str {
        match self {
            PathParseError::EmptySegment { path, .. } => path,
            PathParseError::InvalidIndex { path, .. } => path,
            PathParseError::TooLong(path, _) => path,
        }
    }
}

// =============================================================================
// DocPath and PathSegment
// =============================================================================

/// A segment in a document path
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathSegment {
    /// Object key
    Key(String),
    /// Array index
    Index(usize),
}

impl PathSegment {
    fn parse(raw: &str) -> Option<PathSegment> {
        if raw.bytes().all(|b| b.is_ascii_digit()) {
            raw.parse().ok().map(PathSegment::Index)
        } else {
            Some(PathSegment::Key(raw.to_string()))
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(k) => f.write_str(k),
            PathSegment::Index(i) => write!(f, "{}", i),
        }
    }
}

/// A path into a JSON document
///
/// # Examples
///
/// ```
/// use docsync_core::DocPath;
///
/// let path: DocPath = "weeks.1.completions".parse().unwrap();
/// assert_eq!(path, DocPath::root().key("weeks").index(1).key("completions"));
/// assert_eq!(path.to_string(), "weeks.1.completions");
///
/// let (parent, last) = path.split_last().unwrap();
/// assert_eq!(parent.to_string(), "weeks.1");
/// assert_eq!(last.to_string(), "completions");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct DocPath {
    segments: Vec<PathSegment>,
}

impl DocPath {
    /// Create the root path (empty path)
    pub fn root() -> Self {
        DocPath {
            segments: Vec::new(),
        }
    }

    /// Create a path from a vector of segments
    pub fn from_segments(segments: Vec<PathSegment>) -> Self {
        DocPath { segments }
    }

    /// Parse a path, rejecting empty segments and over-long paths
    pub fn parse(s: &str) -> Result<Self, PathParseError> {
        s.parse()
    }

    /// Get the path segments
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Get the number of segments in the path
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Check if this is the root path (no segments)
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Append a key segment (builder pattern)
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.segments.push(PathSegment::Key(key.into()));
        self
    }

    /// Append an index segment (builder pattern)
    pub fn index(mut self, idx: usize) -> Self {
        self.segments.push(PathSegment::Index(idx));
        self
    }

    /// Split into parent path and final segment (None if root)
    pub fn split_last(&self) -> Option<(DocPath, &PathSegment)> {
        let (last, parent) = self.segments.split_last()?;
        Some((DocPath::from_segments(parent.to_vec()), last))
    }

    /// Validate path length limit
    pub fn validate(&self) -> Result<(), LimitError> {
        let length = self.segments.len();
        if length > MAX_PATH_LENGTH {
            Err(LimitError::PathTooLong {
                length,
                max: MAX_PATH_LENGTH,
            })
        } else {
            Ok(())
        }
    }
}

impl FromStr for DocPath {
    type Err = PathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(DocPath::root());
        }

        let mut segments = Vec::new();
        for (position, raw) in s.split('.').enumerate() {
            if raw.is_empty() {
                return Err(PathParseError::EmptySegment {
                    path: s.to_string(),
                    position,
                });
            }
            let segment = PathSegment::parse(raw).ok_or_else(|| PathParseError::InvalidIndex {
                path: s.to_string(),
                position,
            })?;
            segments.push(segment);
        }

        let path = DocPath { segments };
        path.validate()
            .map_err(|e| PathParseError::TooLong(s.to_string(), e))?;
        Ok(path)
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", seg)?;
        }
        Ok(())
    }
}

impl Serialize for DocPath {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DocPath {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Resolver
// =============================================================================

/// Resolve a path against a document
///
/// Returns `None` ("unresolved") as soon as a segment is missing or the
/// current node cannot be indexed by the segment. The root path resolves to
/// the document itself.
///
/// ```
/// use docsync_core::{resolve, DocPath};
/// use serde_json::json;
///
/// let doc = json!({"weeks": [{"completions": []}, {"completions": ["a"]}]});
/// let path: DocPath = "weeks.1.completions".parse().unwrap();
/// assert_eq!(resolve(&doc, &path), Some(&json!(["a"])));
///
/// let missing: DocPath = "weeks.5.completions".parse().unwrap();
/// assert_eq!(resolve(&doc, &missing), None);
/// ```
pub fn resolve<'a>(root: &'a Value, path: &DocPath) -> Option<&'a Value> {
    let mut current = root;
    for segment in path.segments() {
        current = match (segment, current) {
            (PathSegment::Key(key), Value::Object(obj)) => obj.get(key)?,
            (PathSegment::Index(idx), Value::Array(arr)) => arr.get(*idx)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Mutable counterpart of [`resolve`]
pub fn resolve_mut<'a>(root: &'a mut Value, path: &DocPath) -> Option<&'a mut Value> {
    let mut current = root;
    for segment in path.segments() {
        current = match (segment, current) {
            (PathSegment::Key(key), Value::Object(obj)) => obj.get_mut(key)?,
            (PathSegment::Index(idx), Value::Array(arr)) => arr.get_mut(*idx)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Type name of a node, for error messages
pub fn node_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
