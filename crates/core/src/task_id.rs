// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Identifiers for tasks, executions, and dead-letter records.
//!
//! [`TaskId`] is user-supplied (the `name` field of a task configuration) so
//! it wraps a [`smol_str::SmolStr`] rather than the fixed-capacity
//! [`crate::id::IdBuf`]: task names are author-chosen and not bounded to 23
//! bytes. [`ExecutionId`] and [`DlqId`] are generated per execution/record
//! and use [`crate::define_id`] like every other generated identifier in
//! this codebase.

use smol_str::SmolStr;
use std::fmt;

/// Identifier for a configured task. Equal to the task's `name` field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct TaskId(SmolStr);

impl TaskId {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(SmolStr::new(name.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for TaskId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl std::borrow::Borrow<str> for TaskId {
    fn borrow(&self) -> &str {
        self.0.as_str()
    }
}

impl PartialEq<str> for TaskId {
    fn eq(&self, other: &str) -> bool {
        self.0.as_str() == other
    }
}

impl PartialEq<&str> for TaskId {
    fn eq(&self, other: &&str) -> bool {
        self.0.as_str() == *other
    }
}

crate::define_id! {
    /// Identifier for one run of a task's pipeline, generated when an
    /// admitted filesystem event is handed to the executor.
    pub struct ExecutionId("exe-");
}

crate::define_id! {
    /// Identifier for a dead-letter record, generated on enqueue.
    pub struct DlqId("dlq-");
}

#[cfg(test)]
#[path = "task_id_tests.rs"]
mod tests;
