// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable facts written to the write-ahead log (spec §4.1, §3 "Processed-File
//! Ledger Entry" / "Dead-Letter Record").
//!
//! Distinct from `cronplus_core::Event`: that type is a fire-and-forget
//! observability notification; `StoreEvent` is the only thing this crate
//! ever persists, and every variant here must be replayable into
//! [`crate::state::MaterializedState`] idempotently (applying the same
//! entry twice must not change the result of applying it once).

use cronplus_core::{DlqId, TaskId};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Why a dead-letter record currently sits in the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DlqStatus {
    Failed,
    Resolved,
    Exhausted,
    Ignored,
}

/// A dead-letter record (spec §3). Carries the serialized original execution
/// result as an opaque JSON value so this crate does not need to depend on
/// `cronplus-engine`'s `ExecutionOutcome` type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DlqRecord {
    pub id: DlqId,
    pub task_id: TaskId,
    pub file_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failing_step: Option<String>,
    pub error: String,
    pub attempts: u32,
    pub max_attempts: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_retry_at_ms: Option<u64>,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
    pub status: DlqStatus,
    #[serde(default)]
    pub original_result: serde_json::Value,
}

/// One entry appended to the WAL. Two logical collections (ledger, DLQ)
/// share one physical file, tagged by variant, per spec §4.1 ("embedded
/// key/value... two logical collections").
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum StoreEvent {
    /// A pipeline completed successfully for `(task_id, path)`.
    Processed {
        task_id: TaskId,
        path: PathBuf,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fingerprint: Option<String>,
        result_digest: String,
        completed_at_ms: u64,
    },
    DlqEnqueued {
        record: DlqRecord,
    },
    DlqUpdated {
        record: DlqRecord,
    },
    DlqDeleted {
        id: DlqId,
    },
    DlqPurged {
        ids: Vec<DlqId>,
    },
}
