//! Mutation requests
//!
//! A [`Mutation`] is one structural change to one path of one document. It is
//! applied to a private, freshly read copy of the document; applying it never
//! touches the store. Shape checks happen here, so a mutation that fails to
//! apply never leads to a write.
//!
//! | Mutation | Target | Effect |
//! |----------|--------|--------|
//! | `Append` | array at `path` | push `value` to the end |
//! | `RemoveById` | array of objects at `path` | remove first element whose `id` equals `id` |
//! | `PatchField` | field named by the last segment of `path` | create or overwrite with `value` |

use crate::error::{Error, Result};
use crate::json::JsonValue;
use crate::path::{node_kind, resolve_mut, DocPath, PathSegment};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Field compared by [`Mutation::RemoveById`]
pub const ID_FIELD: &str = "id";

/// A single-path document mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Mutation {
    /// Push `value` onto the array at `path`
    Append {
        /// Path of the target array
        path: DocPath,
        /// Value to push
        value: JsonValue,
    },
    /// Remove the first element of the array at `path` whose `id` equals `id`
    RemoveById {
        /// Path of the target array
        path: DocPath,
        /// Identity to match against each element's `id` field
        id: JsonValue,
    },
    /// Create or overwrite the field named by the last segment of `path`
    PatchField {
        /// Path of the field
        path: DocPath,
        /// New field value
        value: JsonValue,
    },
}

impl Mutation {
    /// Create an Append mutation
    pub fn append(path: DocPath, value: impl Into<JsonValue>) -> Self {
        Mutation::Append {
            path,
            value: value.into(),
        }
    }

    /// Create a RemoveById mutation
    pub fn remove_by_id(path: DocPath, id: impl Into<JsonValue>) -> Self {
        Mutation::RemoveById {
            path,
            id: id.into(),
        }
    }

    /// Create a PatchField mutation
    pub fn patch_field(path: DocPath, value: impl Into<JsonValue>) -> Self {
        Mutation::PatchField {
            path,
            value: value.into(),
        }
    }

    /// Path targeted by this mutation
    pub fn path(&self) -> &DocPath {
        match self {
            Mutation::Append { path, .. } => path,
            Mutation::RemoveById { path, .. } => path,
            Mutation::PatchField { path, .. } => path,
        }
    }

    /// Short operation name, for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Mutation::Append { .. } => "append",
            Mutation::RemoveById { .. } => "remove_by_id",
            Mutation::PatchField { .. } => "patch_field",
        }
    }

    /// Apply this mutation to an in-memory document
    ///
    /// On error the document is left unchanged.
    pub fn apply_to(&self, doc: &mut Value) -> Result<()> {
        match self {
            Mutation::Append { path, value } => {
                target_array(doc, path)?.push(value.clone().into_inner());
                Ok(())
            }
            Mutation::RemoveById { path, id } => {
                let arr = target_array(doc, path)?;
                let position = arr
                    .iter()
                    .position(|item| item.get(ID_FIELD) == Some(id.as_inner()))
                    .ok_or_else(|| Error::ItemNotFound {
                        path: path.to_string(),
                        id: id.to_string(),
                    })?;
                arr.remove(position);
                Ok(())
            }
            Mutation::PatchField { path, value } => patch_field(doc, path, value),
        }
    }
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mutation::Append { path, value } => write!(f, "APPEND {} <- {}", path, value),
            Mutation::RemoveById { path, id } => write!(f, "REMOVE {} id={}", path, id),
            Mutation::PatchField { path, value } => write!(f, "PATCH {} = {}", path, value),
        }
    }
}

/// Resolve `path` and require an array there
fn target_array<'a>(doc: &'a mut Value, path: &DocPath) -> Result<&'a mut Vec<Value>> {
    match resolve_mut(doc, path) {
        Some(Value::Array(arr)) => Ok(arr),
        Some(other) => Err(Error::invalid_path(
            path.to_string(),
            format!("expected array, found {}", node_kind(other)),
        )),
        None => Err(Error::invalid_path(path.to_string(), "path does not resolve")),
    }
}

/// Same rule at every depth: object parents take a key (created or
/// overwritten), array parents take an in-bounds index (overwritten).
fn patch_field(doc: &mut Value, path: &DocPath, value: &JsonValue) -> Result<()> {
    let Some((parent_path, last)) = path.split_last() else {
        return Err(Error::invalid_path("", "cannot patch the document root"));
    };
    let parent = resolve_mut(doc, &parent_path).ok_or_else(|| {
        Error::invalid_path(path.to_string(), "parent path does not resolve")
    })?;

    match (last, parent) {
        (PathSegment::Key(key), Value::Object(obj)) => {
            obj.insert(key.clone(), value.clone().into_inner());
            Ok(())
        }
        (PathSegment::Index(idx), Value::Array(arr)) => {
            if *idx >= arr.len() {
                return Err(Error::invalid_path(
                    path.to_string(),
                    format!("index {} out of bounds for array of length {}", idx, arr.len()),
                ));
            }
            arr[*idx] = value.clone().into_inner();
            Ok(())
        }
        (PathSegment::Key(_), Value::Array(_)) => Err(Error::invalid_path(
            path.to_string(),
            "key segment applied to an array",
        )),
        (PathSegment::Index(_), Value::Object(_)) => Err(Error::invalid_path(
            path.to_string(),
            "index segment applied to an object",
        )),
        (_, other) => Err(Error::invalid_path(
            path.to_string(),
            format!("parent is a {}, not a container", node_kind(other)),
        )),
    }
}
