// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dead-Letter retry driver (spec §4.7): a single background loop that
//! polls the state store for due retries and re-runs their pipeline,
//! independent of the supervisor that originally produced them (a task's
//! supervisor may have since been reconfigured or restarted).

use cronplus_adapters::{HttpAdapter, PrinterAdapter};
use cronplus_config::{Step, Variable};
use cronplus_core::{Clock, Event, TaskId};
use cronplus_engine::{ExecutionContext, StepAdapters};
use cronplus_storage::{DlqRecord, DlqStatus, StateStore};
use parking_lot::Mutex;
use rand::Rng;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::observability::EventBus;

/// Base polling interval; jittered by up to `POLL_JITTER_MS` on each tick
/// so a fleet of daemons restarted together doesn't thunder the store at
/// once (spec §4.7: "polls periodically, e.g. every 5-10 seconds").
const POLL_INTERVAL_MS: u64 = 5_000;
const POLL_JITTER_MS: u64 = 5_000;

/// Looks up the current pipeline and variables for a task, so the driver
/// always retries against the live configuration rather than whatever was
/// active when the record was first enqueued (spec §4.7: "uses the task's
/// *current* pipeline definition, not a snapshot").
pub trait TaskLookup: Send + Sync {
    fn pipeline_for(&self, task_id: &TaskId) -> Option<(Vec<Step>, Vec<Variable>)>;
}

/// Runs the retry driver until `cancel` fires.
pub async fn run<C: Clock + 'static>(
    store: Arc<StateStore<C>>,
    bus: EventBus,
    printer: Arc<dyn PrinterAdapter>,
    http: Arc<dyn HttpAdapter>,
    clock: C,
    tasks: Arc<dyn TaskLookup>,
    cancel: CancellationToken,
) {
    let path_locks: Arc<Mutex<HashMap<(TaskId, PathBuf), Arc<tokio::sync::Mutex<()>>>>> =
        Arc::new(Mutex::new(HashMap::new()));

    loop {
        let jitter = rand::thread_rng().gen_range(0..=POLL_JITTER_MS);
        let sleep = Duration::from_millis(POLL_INTERVAL_MS + jitter);
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(sleep) => {}
        }

        let due = store.due_retries(clock.epoch_ms());
        if due.is_empty() {
            continue;
        }
        info!(count = due.len(), "retrying due dead-letter records");

        for record in due {
            if cancel.is_cancelled() {
                return;
            }
            retry_one(
                record,
                &store,
                &bus,
                printer.as_ref(),
                http.as_ref(),
                &clock,
                tasks.as_ref(),
                &path_locks,
                &cancel,
            )
            .await;
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn retry_one<C: Clock>(
    record: DlqRecord,
    store: &Arc<StateStore<C>>,
    bus: &EventBus,
    printer: &dyn PrinterAdapter,
    http: &dyn HttpAdapter,
    clock: &C,
    tasks: &dyn TaskLookup,
    path_locks: &Arc<Mutex<HashMap<(TaskId, PathBuf), Arc<tokio::sync::Mutex<()>>>>>,
    cancel: &CancellationToken,
) {
    let key = (record.task_id.clone(), record.file_path.clone());
    let lock = {
        let mut locks = path_locks.lock();
        Arc::clone(locks.entry(key.clone()).or_insert_with(|| Arc::new(tokio::sync::Mutex::new(()))))
    };
    let _guard = lock.lock().await;

    let Some((pipeline, variables)) = tasks.pipeline_for(&record.task_id) else {
        // The owning task was removed entirely; nothing left to retry
        // against. Leave the record as-is for an operator to inspect or
        // purge via `purgeDlq`.
        warn!(task = %record.task_id, dlq_id = %record.id, "no live task for dead-letter record; skipping retry");
        return;
    };

    let epoch_ms = clock.epoch_ms();
    let Ok(mut ctx) = ExecutionContext::new(record.task_id.clone(), record.file_path.clone(), &variables, epoch_ms)
    else {
        let _ = store.update_dlq(record.id, |r| r.status = DlqStatus::Exhausted);
        bus.publish(Event::DlqExhausted { dlq_id: record.id, attempts: record.attempts });
        return;
    };

    let adapters = StepAdapters { printer, http };
    let result = cronplus_engine::executor::run(&pipeline, &mut ctx, cancel, &adapters).await;

    if result.ok {
        let digest = format!("dlq-retry-{}", record.id);
        store.record_processed(&record.task_id, &record.file_path, None, digest);
        let _ = store.update_dlq(record.id, |r| r.status = DlqStatus::Resolved);
        bus.publish(Event::DlqResolved { dlq_id: record.id });
        info!(task = %record.task_id, dlq_id = %record.id, "dead-letter retry succeeded");
        path_locks.lock().retain(|k, v| k != &key || Arc::strong_count(v) > 1);
        return;
    }

    let attempts = record.attempts + 1;
    if attempts >= record.max_attempts {
        let _ = store.update_dlq(record.id, |r| {
            r.attempts = attempts;
            r.status = DlqStatus::Exhausted;
            r.next_retry_at_ms = None;
        });
        bus.publish(Event::DlqExhausted { dlq_id: record.id, attempts });
        warn!(task = %record.task_id, dlq_id = %record.id, attempts, "dead-letter record exhausted its retry budget");
    } else {
        let next_retry_at_ms = clock.epoch_ms() + dlq_backoff(attempts).as_millis() as u64;
        let _ = store.update_dlq(record.id, |r| {
            r.attempts = attempts;
            r.error = result.error.clone().unwrap_or_else(|| "unknown failure".to_string());
            r.failing_step = result.failing_step.clone();
            r.next_retry_at_ms = Some(next_retry_at_ms);
        });
        bus.publish(Event::DlqRetryScheduled { dlq_id: record.id, attempt: attempts, at_ms: next_retry_at_ms });
    }
}

/// The DLQ driver's own reschedule backoff (spec §4.7 step 4:
/// `nextRetryAt = now + pow(2, attempts) * 10s`). Distinct from a step's
/// per-attempt `retry` policy (§4.3/§4.5), which governs attempts *within*
/// a single execution; this one paces re-runs of the whole pipeline across
/// the DLQ driver's periodic sweeps.
fn dlq_backoff(attempts: u32) -> Duration {
    Duration::from_secs(2u64.saturating_pow(attempts) * 10)
}

#[cfg(test)]
#[path = "dlq_driver_tests.rs"]
mod tests;
