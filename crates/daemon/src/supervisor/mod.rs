// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task Supervisor (spec §4.6): owns one task's watcher, bounded worker
//! pool, and state machine, and drives stabilized file-ready events through
//! dedup, admission, and the Pipeline Executor.

mod pool;
mod state;

pub use pool::{Counters, WorkerPool};
pub use state::{StateMachine, SupervisorState, TransitionError};

use crate::observability::EventBus;
use cronplus_adapters::{HttpAdapter, PrinterAdapter};
use cronplus_config::TaskConfig;
use cronplus_core::{Clock, Event, TaskId};
use cronplus_engine::{ExecutionContext, StepAdapters};
use cronplus_storage::StateStore;
use cronplus_watcher::{ReadyFile, WatchSpec};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Consecutive-failure thresholds for the health policy (spec §4.6).
const DEGRADED_AFTER: u64 = 5;
const FAILED_AFTER: u64 = 10;

/// Interval between self-checks (spec §4.6: "A periodic (1 min)
/// self-check").
const SELF_CHECK_INTERVAL: Duration = Duration::from_secs(60);
/// Idleness threshold the self-check demotes on (spec §4.6).
const IDLE_THRESHOLD: Duration = Duration::from_secs(3600);
/// Error-rate threshold the self-check demotes on (spec §4.6).
const ERROR_RATE_THRESHOLD: f64 = 0.10;

/// A handle to a running supervisor task, owned exclusively by the
/// [`crate::manager::Manager`] (spec §3 ownership rules).
pub struct SupervisorHandle {
    pub task_id: TaskId,
    pub config_hash: String,
    state: Arc<StateMachine>,
    counters: Arc<Counters>,
    max_concurrent: u32,
    watch_directory: String,
    watch_glob: String,
    bus: EventBus,
    cancel: CancellationToken,
    join: tokio::task::JoinHandle<()>,
}

impl SupervisorHandle {
    pub fn state(&self) -> SupervisorState {
        self.state.current()
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    pub fn max_concurrent(&self) -> u32 {
        self.max_concurrent
    }

    pub fn watch_directory(&self) -> &str {
        &self.watch_directory
    }

    pub fn watch_glob(&self) -> &str {
        &self.watch_glob
    }

    /// Requests shutdown and waits up to `graceful_timeout` for in-flight
    /// executions to drain before forcing the task to stop (spec §4.8,
    /// §5 "Supervisor `Stop` cancels all in-flight executions and waits up
    /// to `gracefulTimeout` for them to drain, then forces exit").
    pub async fn stop(self, graceful_timeout: Duration) {
        transition(&self.task_id, &self.state, &self.bus, SupervisorState::Stopping);
        self.cancel.cancel();
        if tokio::time::timeout(graceful_timeout, self.join).await.is_err() {
            warn!(task = %self.task_id, "supervisor did not drain within graceful timeout; abandoning");
        }
    }
}

/// The dependencies every supervisor needs, shared across the whole daemon
/// (spec §5 "Shared resources").
pub struct SupervisorDeps<C: Clock> {
    pub store: Arc<StateStore<C>>,
    pub bus: EventBus,
    pub printer: Arc<dyn PrinterAdapter>,
    pub http: Arc<dyn HttpAdapter>,
    pub clock: C,
}

impl<C: Clock> Clone for SupervisorDeps<C> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            bus: self.bus.clone(),
            printer: Arc::clone(&self.printer),
            http: Arc::clone(&self.http),
            clock: self.clock.clone(),
        }
    }
}

/// Starts a supervisor for `config` and returns a handle to it. The
/// supervisor begins in `Created`, immediately transitions through
/// `Initializing` to `Idle`, and starts watching its directory.
pub fn spawn<C: Clock + 'static>(
    task_id: TaskId,
    config: TaskConfig,
    config_hash: String,
    deps: SupervisorDeps<C>,
) -> SupervisorHandle {
    let state = Arc::new(StateMachine::new());
    let counters = Arc::new(Counters::default());
    let pool = Arc::new(WorkerPool::new(config.max_concurrent));
    let cancel = CancellationToken::new();

    let max_concurrent = config.max_concurrent;
    let watch_directory = config.watch.directory.clone();
    let watch_glob = config.watch.glob.clone();
    let bus = deps.bus.clone();

    let join = tokio::spawn(run(
        task_id.clone(),
        config,
        Arc::clone(&state),
        Arc::clone(&counters),
        Arc::clone(&pool),
        deps,
        cancel.clone(),
    ));

    SupervisorHandle {
        task_id,
        config_hash,
        state,
        counters,
        max_concurrent,
        watch_directory,
        watch_glob,
        bus,
        cancel,
        join,
    }
}

async fn run<C: Clock + 'static>(
    task_id: TaskId,
    config: TaskConfig,
    state: Arc<StateMachine>,
    counters: Arc<Counters>,
    pool: Arc<WorkerPool>,
    deps: SupervisorDeps<C>,
    cancel: CancellationToken,
) {
    transition(&task_id, &state, &deps.bus, SupervisorState::Initializing);

    let (ready_tx, mut ready_rx) = mpsc::channel::<ReadyFile>(256);
    let watch_spec = WatchSpec {
        directory: PathBuf::from(&config.watch.directory),
        glob: config.watch.glob.clone(),
        debounce_ms: config.watch.debounce_ms,
        stabilization_ms: config.watch.stabilization_ms,
        poll_interval_ms: 200,
    };
    let watcher_cancel = cancel.clone();
    let watcher_task = tokio::spawn(cronplus_watcher::run_supervised(watch_spec, ready_tx, watcher_cancel));

    // Feeds the (backpressured) watcher channel into the (shedding)
    // admission queue without ever blocking the watcher on a slow pool.
    let pump_pool = Arc::clone(&pool);
    let pump_cancel = cancel.clone();
    let pump_task = tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = pump_cancel.cancelled() => break,
                event = ready_rx.recv() => match event {
                    Some(event) => pump_pool.offer(event),
                    None => break,
                },
            }
        }
    });

    transition(&task_id, &state, &deps.bus, SupervisorState::Idle);
    info!(task = %task_id, directory = %config.watch.directory, "supervisor idle, watching directory");

    let mut self_check = tokio::time::interval(SELF_CHECK_INTERVAL);
    self_check.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = self_check.tick() => self_check_health(&task_id, &state, &counters, &deps),
            admitted = pool.next_admitted() => match admitted {
                Some(ready) => admit(&task_id, &config, &state, &counters, &pool, &deps, &cancel, ready),
                None => break,
            },
        }
    }

    pool.close();
    watcher_task.abort();
    pump_task.abort();
    transition(&task_id, &state, &deps.bus, SupervisorState::Stopped);
}

/// Handles one admitted ready-file event: dedup against the ledger, then
/// spawn a serialized, concurrency-gated execution (spec §4.5 step 1-2,
/// §4.6 dedup/ordering).
fn admit<C: Clock + 'static>(
    task_id: &TaskId,
    config: &TaskConfig,
    state: &Arc<StateMachine>,
    counters: &Arc<Counters>,
    pool: &Arc<WorkerPool>,
    deps: &SupervisorDeps<C>,
    cancel: &CancellationToken,
    ready: ReadyFile,
) {
    if deps.store.has_processed(task_id, &ready.path) {
        counters.record_duplicate();
        return;
    }

    let task_id = task_id.clone();
    let pipeline = config.pipeline.clone();
    let variables = config.variables.clone();
    let state = Arc::clone(state);
    let counters = Arc::clone(counters);
    let pool = Arc::clone(pool);
    let deps = deps.clone();
    let cancel = cancel.clone();

    tokio::spawn(async move {
        let path_guard = pool.acquire_path(&ready.path).await;
        let _slot = pool.acquire_slot().await;

        let prior_active = counters.active_executions();
        counters.enter_execution();
        if prior_active == 0 {
            transition(&task_id, &state, &deps.bus, SupervisorState::Processing);
        }

        let outcome = execute_one(&task_id, &pipeline, &variables, &ready.path, &deps, &cancel).await;

        counters.exit_execution();
        record_outcome(&task_id, &ready.path, outcome, &state, &counters, &deps);

        if counters.active_executions() == 0 {
            let current = state.current();
            if current == SupervisorState::Processing || current == SupervisorState::Degraded {
                transition(&task_id, &state, &deps.bus, SupervisorState::Idle);
            }
        }

        drop(path_guard);
        pool.gc_path(&ready.path);
    });
}

enum Outcome {
    Success,
    Failed { failing_step: Option<String>, error: String },
    Cancelled,
}

async fn execute_one<C: Clock + 'static>(
    task_id: &TaskId,
    pipeline: &[cronplus_config::Step],
    variables: &[cronplus_config::Variable],
    path: &PathBuf,
    deps: &SupervisorDeps<C>,
    cancel: &CancellationToken,
) -> Outcome {
    let execution_id = cronplus_core::ExecutionId::new();
    let epoch_ms = deps.clock.epoch_ms();
    let mut ctx = match ExecutionContext::new(task_id.clone(), path.clone(), variables, epoch_ms) {
        Ok(ctx) => ctx,
        Err(error) => return Outcome::Failed { failing_step: None, error: error.to_string() },
    };

    deps.bus.publish(Event::ExecutionStarted { task: task_id.clone(), execution: execution_id, path: path.clone() });

    let adapters = StepAdapters { printer: deps.printer.as_ref(), http: deps.http.as_ref() };
    let result = cronplus_engine::executor::run(pipeline, &mut ctx, cancel, &adapters).await;

    if result.cancelled {
        deps.bus.publish(Event::ExecutionFailed {
            task: task_id.clone(),
            execution: execution_id,
            step: result.failing_step.clone().unwrap_or_default(),
            error: "cancelled".to_string(),
        });
        return Outcome::Cancelled;
    }

    if result.ok {
        deps.bus.publish(Event::ExecutionCompleted {
            task: task_id.clone(),
            execution: execution_id,
            elapsed_ms: deps.clock.epoch_ms().saturating_sub(epoch_ms),
        });
        Outcome::Success
    } else {
        let error = result.error.clone().unwrap_or_else(|| "unknown failure".to_string());
        deps.bus.publish(Event::ExecutionFailed {
            task: task_id.clone(),
            execution: execution_id,
            step: result.failing_step.clone().unwrap_or_default(),
            error: error.clone(),
        });
        Outcome::Failed { failing_step: result.failing_step, error }
    }
}

fn record_outcome<C: Clock + 'static>(
    task_id: &TaskId,
    path: &PathBuf,
    outcome: Outcome,
    state: &Arc<StateMachine>,
    counters: &Arc<Counters>,
    deps: &SupervisorDeps<C>,
) {
    let now = deps.clock.epoch_ms();
    match outcome {
        Outcome::Success => {
            counters.record_success(now);
            let digest = content_digest(task_id, path, now);
            deps.store.record_processed(task_id, path, None, digest);
        }
        Outcome::Cancelled => {
            // Spec §7: cancellation is not retried, not DLQ'd.
        }
        Outcome::Failed { failing_step, error } => {
            let consecutive = counters.record_failure(now);
            apply_health_policy(task_id, state, &deps.bus, consecutive);

            let retry_policy = cronplus_config::RetryPolicy::default();
            let next_retry_at_ms = now + retry_policy.delay_for(1).as_millis() as u64;
            let dlq_id = deps.store.enqueue_dlq(
                task_id.clone(),
                path.clone(),
                failing_step,
                error.clone(),
                retry_policy.max_attempts,
                Some(next_retry_at_ms),
                serde_json::json!({ "error": error }),
            );
            deps.bus.publish(Event::DlqEnqueued { task: task_id.clone(), execution: cronplus_core::ExecutionId::new(), dlq_id, reason: error });
        }
    }
}

fn apply_health_policy(task_id: &TaskId, state: &Arc<StateMachine>, bus: &EventBus, consecutive_errors: u64) {
    if consecutive_errors >= FAILED_AFTER {
        transition(task_id, state, bus, SupervisorState::Failed);
    } else if consecutive_errors >= DEGRADED_AFTER {
        transition(task_id, state, bus, SupervisorState::Degraded);
    }
}

/// Maps this crate's fine-grained supervisor state onto the coarser
/// `cronplus_core::SupervisorState` carried by `Event::SupervisorStateChanged`
/// (spec §4.6's own lifecycle vs. the shared observability vocabulary every
/// other cronplus crate emits against).
fn to_core_state(state: SupervisorState) -> cronplus_core::SupervisorState {
    use cronplus_core::SupervisorState as Core;
    match state {
        SupervisorState::Created | SupervisorState::Initializing => Core::Starting,
        SupervisorState::Idle | SupervisorState::Processing | SupervisorState::Paused => Core::Running,
        SupervisorState::Degraded | SupervisorState::Stopping => Core::Draining,
        SupervisorState::Stopped => Core::Stopped,
        SupervisorState::Failed => Core::Failed,
    }
}

/// Attempts a transition and, if legal, publishes the mapped
/// `SupervisorStateChanged` event (spec §4.6: "every change is timestamped
/// and emitted as an event for observability"). Illegal attempts are
/// logged and otherwise ignored, matching `StateMachine::transition`'s
/// contract.
fn transition(task_id: &TaskId, state: &Arc<StateMachine>, bus: &EventBus, to: SupervisorState) {
    match state.transition(to) {
        Ok(from) => {
            bus.publish(Event::SupervisorStateChanged {
                task: task_id.clone(),
                from: to_core_state(from),
                to: to_core_state(to),
            });
        }
        Err(error) => warn!(task = %task_id, %error, "rejected illegal supervisor state transition"),
    }
}

/// Periodic self-check (spec §4.6): demotes to `Degraded` on a high error
/// rate or prolonged idleness while still enabled.
fn self_check_health<C: Clock + 'static>(
    task_id: &TaskId,
    state: &Arc<StateMachine>,
    counters: &Arc<Counters>,
    deps: &SupervisorDeps<C>,
) {
    let now = deps.clock.epoch_ms();
    let last_activity = counters.last_activity_at_ms();
    let idle_for = Duration::from_millis(now.saturating_sub(last_activity));

    let should_demote = counters.error_rate() > ERROR_RATE_THRESHOLD
        || (last_activity > 0 && idle_for >= IDLE_THRESHOLD);

    if should_demote && state.current() == SupervisorState::Idle {
        transition(task_id, state, &deps.bus, SupervisorState::Degraded);
        warn!(task = %task_id, error_rate = counters.error_rate(), idle_for_secs = idle_for.as_secs(), "self-check demoted supervisor to degraded");
    }
}

/// A stable content digest recorded with the ledger entry. Cheap
/// placeholder derived from task/path/time rather than file bytes — actual
/// byte-level verification for `verifyChecksum` steps happens inside the
/// copy/move step itself (spec §4.3); this digest only needs to be stable
/// enough to detect "we already marked this exact path done."
fn content_digest(task_id: &TaskId, path: &PathBuf, completed_at_ms: u64) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(task_id.as_str().as_bytes());
    hasher.update(path.to_string_lossy().as_bytes());
    hasher.update(completed_at_ms.to_le_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
