// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tasksSnapshot` entry shape (spec §6).

use serde::{Deserialize, Serialize};

/// One task's reconciled, observable state, as returned by
/// `tasksSnapshot()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    pub id: String,
    pub enabled: bool,
    pub directory: String,
    pub glob: String,
    pub max_concurrent: u32,
    /// Supervisor state as a lowercase string (`"idle"`, `"processing"`, ...).
    pub status: String,
    /// Set when the task failed validation at apply-time and was disabled
    /// in lenient mode (spec §4.9) rather than started.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_started_reason: Option<String>,
    pub processed: u64,
    pub errors: u64,
    pub active_executions: u32,
}
