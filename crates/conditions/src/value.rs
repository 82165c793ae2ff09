// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime values a condition can compare against.

use std::fmt;

/// A value resolved from the execution context, or a literal written in a
/// condition's configuration.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Number(f64),
    String(String),
    /// Milliseconds since the Unix epoch, for `date`/`datetime` comparisons.
    TimestampMs(i64),
    List(Vec<FieldValue>),
    Null,
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::TimestampMs(ms) => Some(*ms as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::Number(n) => write!(f, "{n}"),
            FieldValue::String(s) => write!(f, "{s}"),
            FieldValue::TimestampMs(ms) => write!(f, "{ms}"),
            FieldValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            FieldValue::Null => write!(f, "null"),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

/// Resolves a dotted field path (`"file.sizeKB"`, `"env.HOME"`, a custom
/// variable name) against whatever the caller's execution context holds.
///
/// Implemented by `cronplus-engine`'s `ExecutionContext`; kept as a trait
/// here so this crate has no dependency on the engine.
pub trait FieldSource {
    /// Resolve a field path. Returns `FieldValue::Null` (not an error) when
    /// the field genuinely does not exist, matching the `exists`/`notExists`
    /// operators' need to distinguish "false" from "absent".
    fn resolve(&self, field: &str) -> FieldValue;
}

#[cfg(test)]
#[path = "value_tests.rs"]
mod tests;
