//! Documents as JSON values, and the limits every stored document obeys
//!
//! | Limit | Value | Constant |
//! |-------|-------|----------|
//! | Serialized size | 16 MiB | [`MAX_DOCUMENT_SIZE`] |
//! | Nesting depth | 100 levels | [`MAX_NESTING_DEPTH`] |
//! | Path length | 256 segments | [`MAX_PATH_LENGTH`] |
//! | Array length | 1M elements | [`MAX_ARRAY_SIZE`] |

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::ops::{Deref, DerefMut};
use thiserror::Error;

/// Largest serialized document, in bytes
pub const MAX_DOCUMENT_SIZE: usize = 16 * 1024 * 1024;

/// Deepest object/array nesting
pub const MAX_NESTING_DEPTH: usize = 100;

/// Longest path, in segments
pub const MAX_PATH_LENGTH: usize = 256;

/// Longest array anywhere in a document
pub const MAX_ARRAY_SIZE: usize = 1_000_000;

/// A document or path outside the limits
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum LimitError {
    #[error("document is {size} bytes, limit is {max}")]
    DocumentTooLarge { size: usize, max: usize },

    #[error("document nests deeper than {max} levels")]
    NestingTooDeep { max: usize },

    #[error("path has {length} segments, limit is {max}")]
    PathTooLong { length: usize, max: usize },

    #[error("array has {size} elements, limit is {max}")]
    ArrayTooLarge { size: usize, max: usize },
}

/// A whole document, or a value headed into one
///
/// Derefs to [`serde_json::Value`], so indexing and the `as_*` accessors
/// work directly.
///
/// ```
/// use docsync_core::JsonValue;
/// use serde_json::json;
///
/// let doc = JsonValue::from(json!({"weeks": [{"weekNumber": 1}]}));
/// assert_eq!(doc["weeks"][0]["weekNumber"], 1);
/// assert!(doc.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JsonValue(Value);

#[allow(missing_docs)]
impl JsonValue {
    pub fn into_inner(self) -> Value {
        self.0
    }

    pub fn as_inner(&self) -> &Value {
        &self.0
    }

    pub fn as_inner_mut(&mut self) -> &mut Value {
        &mut self.0
    }

    /// Compact serialized form; this is what gets stored and hashed
    pub fn to_bytes(&self) -> Vec<u8> {
        // A Value has only string keys, so this cannot fail
        serde_json::to_vec(&self.0).unwrap_or_default()
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes).map(JsonValue)
    }

    /// Check depth, array lengths and serialized size, in that order
    ///
    /// Depth is checked during the same walk that measures arrays, and the
    /// walk stops descending once the limit is passed, so a hostile document
    /// cannot make validation itself recurse without bound.
    pub fn validate(&self) -> Result<(), LimitError> {
        let mut longest_array = 0;
        if !walk(&self.0, 0, &mut longest_array) {
            return Err(LimitError::NestingTooDeep {
                max: MAX_NESTING_DEPTH,
            });
        }
        if longest_array > MAX_ARRAY_SIZE {
            return Err(LimitError::ArrayTooLarge {
                size: longest_array,
                max: MAX_ARRAY_SIZE,
            });
        }
        let size = self.to_bytes().len();
        if size > MAX_DOCUMENT_SIZE {
            return Err(LimitError::DocumentTooLarge {
                size,
                max: MAX_DOCUMENT_SIZE,
            });
        }
        Ok(())
    }
}

/// Record the longest array under `value`; false once nesting passes the limit
fn walk(value: &Value, depth: usize, longest_array: &mut usize) -> bool {
    match value {
        Value::Array(items) => {
            *longest_array = (*longest_array).max(items.len());
            depth < MAX_NESTING_DEPTH
                && items.iter().all(|item| walk(item, depth + 1, longest_array))
        }
        Value::Object(fields) => {
            depth < MAX_NESTING_DEPTH
                && fields.values().all(|field| walk(field, depth + 1, longest_array))
        }
        _ => true,
    }
}

impl Deref for JsonValue {
    type Target = Value;

    fn deref(&self) -> &Value {
        &self.0
    }
}

impl DerefMut for JsonValue {
    fn deref_mut(&mut self) -> &mut Value {
        &mut self.0
    }
}

impl fmt::Display for JsonValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<JsonValue> for Value {
    fn from(v: JsonValue) -> Self {
        v.0
    }
}

macro_rules! from_via_value {
    ($($ty:ty),*) => {
        $(impl From<$ty> for JsonValue {
            fn from(v: $ty) -> Self {
                JsonValue(Value::from(v))
            }
        })*
    };
}

from_via_value!(Value, bool, i64, u64, &str, String);
