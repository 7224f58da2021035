//! Server-computed sequence fields
//!
//! Some arrays carry an ordering number on each element (`weeks[n].weekNumber`).
//! Two clients appending at once would both compute the same next number from
//! their own copy, so the number is assigned inside the mutation instead,
//! from the array the append actually lands on.
//!
//! A rule is written `pattern=field`, where `pattern` is a dot path whose
//! segments may be `*`:
//!
//! ```text
//! weeks=weekNumber
//! plans.*.days=dayNumber
//! ```

use docsync_core::{DocPath, Error, PathSegment, Result};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// One segment of a rule pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternSegment {
    /// `*`: any key or index
    Any,
    /// Exact path segment
    Exact(PathSegment),
}

/// Assigns `field` on values appended to arrays matching `pattern`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRule {
    pattern: Vec<PatternSegment>,
    field: String,
}

impl SequenceRule {
    /// Rule for an exact path
    pub fn new(path: DocPath, field: impl Into<String>) -> Self {
        Self {
            pattern: path
                .segments()
                .iter()
                .cloned()
                .map(PatternSegment::Exact)
                .collect(),
            field: field.into(),
        }
    }

    /// Field this rule assigns
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Check whether an append target path is covered by this rule
    pub fn matches(&self, path: &DocPath) -> bool {
        self.pattern.len() == path.len()
            && self
                .pattern
                .iter()
                .zip(path.segments())
                .all(|(pattern, segment)| match pattern {
                    PatternSegment::Any => true,
                    PatternSegment::Exact(exact) => exact == segment,
                })
    }

    /// Next sequence number for an append to `existing`
    ///
    /// One past the last element's field when it is a non-negative integer,
    /// otherwise one past the array length. A number past `u64::MAX` is
    /// rejected as [`Error::InvalidInput`].
    pub fn next_number(&self, existing: &[Value]) -> Result<u64> {
        let base = match existing.last() {
            None => 0,
            Some(last) => match last.get(&self.field).and_then(Value::as_u64) {
                Some(n) => n,
                None => existing.len() as u64,
            },
        };
        base.checked_add(1).ok_or_else(|| {
            Error::invalid_input(format!(
                "sequence field '{}' cannot advance past {base}",
                self.field
            ))
        })
    }

    /// Overwrite the field on `value` if it is an object
    ///
    /// Returns false, leaving `value` untouched, for non-object values.
    pub fn stamp(&self, existing: &[Value], value: &mut Value) -> Result<bool> {
        let Some(obj) = value.as_object_mut() else {
            return Ok(false);
        };
        let next = self.next_number(existing)?;
        obj.insert(self.field.clone(), Value::from(next));
        Ok(true)
    }
}

impl FromStr for SequenceRule {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (pattern, field) = s
            .split_once('=')
            .ok_or_else(|| Error::invalid_input(format!("sequence rule '{s}' is not path=field")))?;
        let field = field.trim();
        if field.is_empty() {
            return Err(Error::invalid_input(format!(
                "sequence rule '{s}' names no field"
            )));
        }

        let pattern = pattern.trim();
        if pattern.is_empty() {
            return Err(Error::invalid_input(format!(
                "sequence rule '{s}' names no path"
            )));
        }
        let pattern = pattern
            .split('.')
            .map(|segment| match segment {
                "*" => Ok(PatternSegment::Any),
                _ => {
                    let parsed: DocPath = segment.parse()?;
                    match parsed.segments() {
                        [only] => Ok(PatternSegment::Exact(only.clone())),
                        _ => Err(Error::invalid_input(format!(
                            "sequence rule '{s}' has an empty segment"
                        ))),
                    }
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            pattern,
            field: field.to_string(),
        })
    }
}

impl fmt::Display for SequenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.pattern.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            match segment {
                PatternSegment::Any => f.write_str("*")?,
                PatternSegment::Exact(exact) => write!(f, "{exact}")?,
            }
        }
        write!(f, "={}", self.field)
    }
}
