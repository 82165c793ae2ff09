// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded concurrency, per-path serialization, and admission shedding
//! (spec §4.6, §5). Per-path serialization uses a
//! `HashMap<PathBuf, Arc<tokio::sync::Mutex<()>>>` guarded by a
//! `parking_lot::Mutex` for the map itself — the two-tier locking idiom
//! used throughout this codebase (`parking_lot::Mutex` guarding plain data,
//! `tokio::sync` primitives guarding async critical sections).

use cronplus_watcher::ReadyFile;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Notify, OwnedSemaphorePermit, Semaphore};

/// Default admission queue depth, sized relative to `maxConcurrent` so a
/// burst can outrun the worker pool briefly without shedding immediately.
pub const ADMISSION_MULTIPLIER: usize = 4;

/// Per-task bounded worker pool (spec §4.6 "a bounded semaphore of size
/// `maxConcurrent` gates executions") plus a bounded, shedding admission
/// queue in front of it (spec §5 "never buffered unbounded").
pub struct WorkerPool {
    semaphore: Arc<Semaphore>,
    max_concurrent: u32,
    path_locks: Mutex<HashMap<PathBuf, Arc<tokio::sync::Mutex<()>>>>,
    admission: AdmissionQueue,
}

impl WorkerPool {
    pub fn new(max_concurrent: u32) -> Self {
        let capacity = (max_concurrent as usize).saturating_mul(ADMISSION_MULTIPLIER).max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent as usize)),
            max_concurrent,
            path_locks: Mutex::new(HashMap::new()),
            admission: AdmissionQueue::new(capacity),
        }
    }

    pub fn max_concurrent(&self) -> u32 {
        self.max_concurrent
    }

    /// Enqueues a stabilized file event for admission. If the queue is
    /// already at capacity the oldest un-admitted event is dropped and
    /// counted as shed (spec §4.6/§5).
    pub fn offer(&self, event: ReadyFile) {
        self.admission.push(event);
    }

    /// Waits for the next admitted event. Returns `None` once the queue is
    /// closed (supervisor shutting down).
    pub async fn next_admitted(&self) -> Option<ReadyFile> {
        self.admission.pop().await
    }

    pub fn close(&self) {
        self.admission.close();
    }

    pub fn shed_count(&self) -> u64 {
        self.admission.shed.load(Ordering::Relaxed)
    }

    /// Acquires a concurrency slot, waiting if the pool is already at
    /// `maxConcurrent` active executions (spec invariant: "at no time does
    /// a supervisor run more than `maxConcurrent` executions").
    pub async fn acquire_slot(&self) -> OwnedSemaphorePermit {
        Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .unwrap_or_else(|_| unreachable!("semaphore is never closed while the supervisor is alive"))
    }

    /// Acquires the per-path serialization lock for `path` (spec invariant:
    /// "no two executions with identical `(taskId, path)` run
    /// concurrently"). The returned guard must be held for the duration of
    /// the execution.
    pub async fn acquire_path(&self, path: &Path) -> PathGuard {
        let lock = {
            let mut locks = self.path_locks.lock();
            Arc::clone(locks.entry(path.to_path_buf()).or_insert_with(|| Arc::new(tokio::sync::Mutex::new(()))))
        };
        let guard = lock.lock_owned().await;
        PathGuard { _guard: guard, lock }
    }

    /// Drops the per-path lock entry for `path` if nothing else holds a
    /// reference to it, so the map doesn't grow without bound across a
    /// long-running task's lifetime.
    pub fn gc_path(&self, path: &Path) {
        let mut locks = self.path_locks.lock();
        if let Some(lock) = locks.get(path) {
            if Arc::strong_count(lock) == 1 {
                locks.remove(path);
            }
        }
    }

    pub fn tracked_paths(&self) -> usize {
        self.path_locks.lock().len()
    }
}

/// Holds the per-path mutex for the lifetime of one execution.
pub struct PathGuard {
    _guard: tokio::sync::OwnedMutexGuard<()>,
    lock: Arc<tokio::sync::Mutex<()>>,
}

impl PathGuard {
    pub fn into_lock(self) -> Arc<tokio::sync::Mutex<()>> {
        self.lock
    }
}

struct AdmissionQueue {
    inner: Mutex<Inner>,
    capacity: usize,
    notify: Notify,
    shed: AtomicU64,
}

struct Inner {
    items: VecDeque<ReadyFile>,
    closed: bool,
}

impl AdmissionQueue {
    fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner { items: VecDeque::new(), closed: false }),
            capacity,
            notify: Notify::new(),
            shed: AtomicU64::new(0),
        }
    }

    fn push(&self, item: ReadyFile) {
        let mut inner = self.inner.lock();
        if inner.closed {
            return;
        }
        if inner.items.len() >= self.capacity {
            inner.items.pop_front();
            self.shed.fetch_add(1, Ordering::Relaxed);
        }
        inner.items.push_back(item);
        drop(inner);
        self.notify.notify_one();
    }

    async fn pop(&self) -> Option<ReadyFile> {
        loop {
            {
                let mut inner = self.inner.lock();
                if let Some(item) = inner.items.pop_front() {
                    return Some(item);
                }
                if inner.closed {
                    return None;
                }
            }
            self.notify.notified().await;
        }
    }

    fn close(&self) {
        self.inner.lock().closed = true;
        self.notify.notify_waiters();
    }
}

/// Tracks per-task health/throughput counters (spec §3 "Supervisor State").
#[derive(Default)]
pub struct Counters {
    processed: AtomicU64,
    errors: AtomicU64,
    consecutive_errors: AtomicU64,
    duplicate: AtomicU64,
    active_executions: std::sync::atomic::AtomicU32,
    last_activity_at_ms: AtomicU64,
}

impl Counters {
    pub fn record_success(&self, now_ms: u64) {
        self.processed.fetch_add(1, Ordering::Relaxed);
        self.consecutive_errors.store(0, Ordering::Relaxed);
        self.last_activity_at_ms.store(now_ms, Ordering::Relaxed);
    }

    /// Records a failure and returns the new consecutive-failure count
    /// (spec §4.6 health policy: 5 -> Degraded, 10 -> Failed).
    pub fn record_failure(&self, now_ms: u64) -> u64 {
        self.errors.fetch_add(1, Ordering::Relaxed);
        self.last_activity_at_ms.store(now_ms, Ordering::Relaxed);
        self.consecutive_errors.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn record_duplicate(&self) {
        self.duplicate.fetch_add(1, Ordering::Relaxed);
    }

    pub fn enter_execution(&self) {
        self.active_executions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn exit_execution(&self) {
        self.active_executions.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }

    pub fn duplicate(&self) -> u64 {
        self.duplicate.load(Ordering::Relaxed)
    }

    pub fn consecutive_errors(&self) -> u64 {
        self.consecutive_errors.load(Ordering::Relaxed)
    }

    pub fn active_executions(&self) -> u32 {
        self.active_executions.load(Ordering::Relaxed)
    }

    pub fn last_activity_at_ms(&self) -> u64 {
        self.last_activity_at_ms.load(Ordering::Relaxed)
    }

    /// Error rate over all attempts recorded so far (spec §4.6 self-check:
    /// "error rate > 10%"). Returns `0.0` with no attempts yet.
    pub fn error_rate(&self) -> f64 {
        let total = self.processed() + self.errors();
        if total == 0 {
            0.0
        } else {
            self.errors() as f64 / total as f64
        }
    }
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;
