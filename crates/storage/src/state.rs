// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory view rebuilt by replaying [`crate::wal::Wal`] entries
//! (spec §4.1): one map per logical collection, one `apply_event` dispatcher.
//!
//! # Idempotency requirement
//!
//! Every handler here must be idempotent: applying the same [`StoreEvent`]
//! twice must leave the state identical to applying it once. This matters
//! because WAL replay and the live write path both call `apply_event` for
//! the same logical write (the store applies in-memory immediately for
//! read-your-writes consistency, and replays the same entry again if the
//! process restarts before a snapshot captures it).

use crate::event::{DlqRecord, DlqStatus, StoreEvent};
use cronplus_core::{DlqId, TaskId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// A processed-file ledger entry (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub fingerprint: Option<String>,
    pub result_digest: String,
    pub completed_at_ms: u64,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MaterializedState {
    pub ledger: HashMap<(TaskId, PathBuf), LedgerEntry>,
    pub dlq: HashMap<DlqId, DlqRecord>,
}

impl MaterializedState {
    pub fn apply_event(&mut self, event: &StoreEvent) {
        match event {
            StoreEvent::Processed { task_id, path, fingerprint, result_digest, completed_at_ms } => {
                self.ledger.insert(
                    (task_id.clone(), path.clone()),
                    LedgerEntry {
                        fingerprint: fingerprint.clone(),
                        result_digest: result_digest.clone(),
                        completed_at_ms: *completed_at_ms,
                    },
                );
            }
            StoreEvent::DlqEnqueued { record } | StoreEvent::DlqUpdated { record } => {
                self.dlq.insert(record.id, record.clone());
            }
            StoreEvent::DlqDeleted { id } => {
                self.dlq.remove(id);
            }
            StoreEvent::DlqPurged { ids } => {
                for id in ids {
                    self.dlq.remove(id);
                }
            }
        }
    }

    pub fn has_processed(&self, task_id: &TaskId, path: &std::path::Path) -> bool {
        self.ledger.contains_key(&(task_id.clone(), path.to_path_buf()))
    }

    pub fn due_retries(&self, now_ms: u64) -> Vec<&DlqRecord> {
        let mut due: Vec<&DlqRecord> = self
            .dlq
            .values()
            .filter(|r| {
                r.status == DlqStatus::Failed
                    && r.attempts < r.max_attempts
                    && r.next_retry_at_ms.is_some_and(|at| at <= now_ms)
            })
            .collect();
        due.sort_by_key(|r| r.next_retry_at_ms.unwrap_or(0));
        due
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
