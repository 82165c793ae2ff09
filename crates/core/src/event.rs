// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Observability events.
//!
//! Every state transition an operator cares about is expressed as an
//! [`Event`] and broadcast on [`crate::clock`]-independent, best-effort
//! channel (a bounded `tokio::sync::broadcast` in the daemon, wired up in
//! `cronplus-daemon::observability`). These are distinct from the durable
//! `LedgerEvent`/`DlqEvent` entries cronplus-storage writes to the WAL:
//! events here are fire-and-forget notifications for logs, the control
//! surface, and metrics counters; the WAL is the durability layer for facts
//! that must survive a restart.

use crate::task_id::{DlqId, ExecutionId, TaskId};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Supervisor lifecycle state, mirrored from `cronplus-daemon::supervisor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SupervisorState {
    Starting,
    Running,
    Draining,
    Stopped,
    Failed,
}

crate::simple_display! {
    SupervisorState {
        Starting => "starting",
        Running => "running",
        Draining => "draining",
        Stopped => "stopped",
        Failed => "failed",
    }
}

/// A structured, loggable event describing something that happened.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    SupervisorStateChanged { task: TaskId, from: SupervisorState, to: SupervisorState },
    ExecutionStarted { task: TaskId, execution: ExecutionId, path: PathBuf },
    ExecutionCompleted { task: TaskId, execution: ExecutionId, elapsed_ms: u64 },
    ExecutionFailed { task: TaskId, execution: ExecutionId, step: String, error: String },
    StepStarted { task: TaskId, execution: ExecutionId, step: String },
    StepCompleted { task: TaskId, execution: ExecutionId, step: String, elapsed_ms: u64 },
    StepRetried { task: TaskId, execution: ExecutionId, step: String, attempt: u32 },
    DlqEnqueued { task: TaskId, execution: ExecutionId, dlq_id: DlqId, reason: String },
    DlqRetryScheduled { dlq_id: DlqId, attempt: u32, at_ms: u64 },
    DlqResolved { dlq_id: DlqId },
    DlqExhausted { dlq_id: DlqId, attempts: u32 },
    ConfigApplied { added: usize, removed: usize, updated: usize, unchanged: usize },
}

impl Event {
    /// The task this event is about, if any (config-level events have none).
    pub fn task(&self) -> Option<&TaskId> {
        match self {
            Event::SupervisorStateChanged { task, .. }
            | Event::ExecutionStarted { task, .. }
            | Event::ExecutionCompleted { task, .. }
            | Event::ExecutionFailed { task, .. }
            | Event::StepStarted { task, .. }
            | Event::StepCompleted { task, .. }
            | Event::StepRetried { task, .. } => Some(task),
            Event::DlqEnqueued { task, .. } => Some(task),
            Event::DlqRetryScheduled { .. }
            | Event::DlqResolved { .. }
            | Event::DlqExhausted { .. }
            | Event::ConfigApplied { .. } => None,
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
