// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Manager / Reconciler (spec §4.8): owns the live set of
//! [`crate::supervisor::SupervisorHandle`]s and diffs an incoming
//! [`cronplus_config::Config`] against them — never hot-mutating a running
//! supervisor, only starting, stopping, or replacing whole tasks.

use crate::dlq_driver::TaskLookup;
use crate::observability::EventBus;
use crate::supervisor::{self, SupervisorDeps, SupervisorHandle, SupervisorState};
use cronplus_adapters::{HttpAdapter, PrinterAdapter};
use cronplus_config::{Config, Step, TaskConfig, Variable};
use cronplus_core::{Clock, Event, TaskId};
use cronplus_storage::StateStore;
use parking_lot::RwLock;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// A task that failed per-task validation and was skipped rather than
/// aborting the whole `applyConfig` (spec §4.9 lenient apply mode).
#[derive(Debug, Clone, Serialize)]
pub struct DisabledTask {
    pub id: String,
    pub reason: String,
}

/// Outcome of one `applyConfig` call (spec §4.8).
#[derive(Debug, Clone, Serialize, Default)]
pub struct ApplyOutcome {
    pub added: usize,
    pub removed: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub disabled: Vec<DisabledTask>,
}

/// Default time the manager waits for a replaced/removed task's
/// in-flight executions to drain before forcing it to stop (spec §4.8).
pub const DEFAULT_GRACEFUL_TIMEOUT: Duration = Duration::from_secs(30);

struct Entry {
    handle: SupervisorHandle,
    config: TaskConfig,
}

/// A task not currently running, with the reason it isn't (spec §4.9: either
/// disabled in configuration, or disabled because it failed validation).
struct NotStarted {
    config: TaskConfig,
    reason: String,
}

/// Owns every live supervisor and reconciles configuration changes into
/// start/stop/replace operations (spec §4.8 "never hot-mutate a running
/// supervisor").
pub struct Manager<C: Clock> {
    entries: RwLock<HashMap<TaskId, Entry>>,
    not_started: RwLock<HashMap<TaskId, NotStarted>>,
    store: Arc<StateStore<C>>,
    bus: EventBus,
    printer: Arc<dyn PrinterAdapter>,
    http: Arc<dyn HttpAdapter>,
    clock: C,
    graceful_timeout: Duration,
}

impl<C: Clock + 'static> Manager<C> {
    pub fn new(
        store: Arc<StateStore<C>>,
        bus: EventBus,
        printer: Arc<dyn PrinterAdapter>,
        http: Arc<dyn HttpAdapter>,
        clock: C,
    ) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            not_started: RwLock::new(HashMap::new()),
            store,
            bus,
            printer,
            http,
            clock,
            graceful_timeout: DEFAULT_GRACEFUL_TIMEOUT,
        }
    }

    /// Applies a new configuration document, diffing it against the live
    /// supervisor set (spec §4.8):
    ///   - unchanged (same config hash): left running untouched
    ///   - added: started
    ///   - removed: stopped with `gracefulTimeout`
    ///   - changed: stopped then a fresh supervisor started (never hot-mutated)
    ///
    /// A task that fails its own structural validation is skipped (not
    /// started/replaced) and recorded in [`ApplyOutcome::disabled`]
    /// instead of aborting the whole apply (spec §4.9 lenient mode).
    pub async fn apply(&self, config: &Config) -> ApplyOutcome {
        let mut outcome = ApplyOutcome::default();
        let mut desired: HashMap<TaskId, (TaskConfig, String)> = HashMap::new();
        let mut not_started: HashMap<TaskId, NotStarted> = HashMap::new();

        for task in &config.tasks {
            let task_id = TaskId::new(&task.id);
            if !task.enabled {
                not_started.insert(task_id, NotStarted { config: task.clone(), reason: "disabled in configuration".to_string() });
                continue;
            }
            if let Err(error) = task.validate() {
                let reason = error.to_string();
                outcome.disabled.push(DisabledTask { id: task.id.clone(), reason: reason.clone() });
                not_started.insert(task_id, NotStarted { config: task.clone(), reason });
                continue;
            }
            let hash = config_hash(task);
            desired.insert(task_id, (task.clone(), hash));
        }
        *self.not_started.write() = not_started;

        let to_remove: Vec<TaskId> = {
            let entries = self.entries.read();
            entries.keys().filter(|id| !desired.contains_key(*id)).cloned().collect()
        };
        for task_id in to_remove {
            if let Some(entry) = self.entries.write().remove(&task_id) {
                info!(task = %task_id, "removing task no longer present in configuration");
                entry.handle.stop(self.graceful_timeout).await;
                outcome.removed += 1;
            }
        }

        for (task_id, (task_config, hash)) in desired {
            let existing_hash = self.entries.read().get(&task_id).map(|e| e.handle.config_hash.clone());
            match existing_hash {
                Some(current) if current == hash => {
                    outcome.unchanged += 1;
                }
                Some(_) => {
                    info!(task = %task_id, "configuration changed; replacing supervisor");
                    if let Some(entry) = self.entries.write().remove(&task_id) {
                        entry.handle.stop(self.graceful_timeout).await;
                    }
                    self.start_task(task_id, task_config, hash);
                    outcome.updated += 1;
                }
                None => {
                    info!(task = %task_id, "starting newly configured task");
                    self.start_task(task_id, task_config, hash);
                    outcome.added += 1;
                }
            }
        }

        self.bus.publish(Event::ConfigApplied {
            added: outcome.added,
            removed: outcome.removed,
            updated: outcome.updated,
            unchanged: outcome.unchanged,
        });
        outcome
    }

    fn start_task(&self, task_id: TaskId, task_config: TaskConfig, hash: String) {
        let deps = SupervisorDeps {
            store: Arc::clone(&self.store),
            bus: self.bus.clone(),
            printer: Arc::clone(&self.printer),
            http: Arc::clone(&self.http),
            clock: self.clock.clone(),
        };
        let handle = supervisor::spawn(task_id.clone(), task_config.clone(), hash, deps);
        self.entries.write().insert(task_id, Entry { handle, config: task_config });
    }

    /// Stops every running supervisor, waiting up to `gracefulTimeout` each
    /// (spec §6 "clean shutdown drains every supervisor").
    pub async fn shutdown(&self) {
        let drained: Vec<(TaskId, Entry)> = self.entries.write().drain().collect();
        for (task_id, entry) in drained {
            info!(task = %task_id, "stopping supervisor for daemon shutdown");
            entry.handle.stop(self.graceful_timeout).await;
        }
    }

    /// A point-in-time snapshot of every task for the control surface's
    /// `tasksSnapshot` operation (spec §6).
    pub fn snapshot(&self) -> Vec<cronplus_wire::TaskSnapshot> {
        let mut snapshot: Vec<cronplus_wire::TaskSnapshot> = self
            .entries
            .read()
            .iter()
            .map(|(task_id, entry)| cronplus_wire::TaskSnapshot {
                id: task_id.to_string(),
                enabled: entry.config.enabled,
                directory: entry.handle.watch_directory().to_string(),
                glob: entry.handle.watch_glob().to_string(),
                max_concurrent: entry.handle.max_concurrent(),
                status: entry.handle.state().to_string(),
                not_started_reason: None,
                processed: entry.handle.counters().processed(),
                errors: entry.handle.counters().errors(),
                active_executions: entry.handle.counters().active_executions(),
            })
            .collect();
        snapshot.extend(self.not_started.read().iter().map(|(task_id, not_started)| cronplus_wire::TaskSnapshot {
            id: task_id.to_string(),
            enabled: not_started.config.enabled,
            directory: not_started.config.watch.directory.clone(),
            glob: not_started.config.watch.glob.clone(),
            max_concurrent: not_started.config.max_concurrent,
            status: "disabled".to_string(),
            not_started_reason: Some(not_started.reason.clone()),
            processed: 0,
            errors: 0,
            active_executions: 0,
        }));
        snapshot
    }

    pub fn task_count(&self) -> usize {
        self.entries.read().len()
    }

    pub fn task_state(&self, task_id: &TaskId) -> Option<SupervisorState> {
        self.entries.read().get(task_id).map(|e| e.handle.state())
    }
}

impl<C: Clock + 'static> TaskLookup for Manager<C> {
    fn pipeline_for(&self, task_id: &TaskId) -> Option<(Vec<Step>, Vec<Variable>)> {
        self.entries.read().get(task_id).map(|e| (e.config.pipeline.clone(), e.config.variables.clone()))
    }
}

/// A stable hash of a task's configuration, used to decide whether a
/// reconcile leaves the task untouched or replaces it (spec §4.8). Steps
/// like `http`/`print` carry `HashMap` fields (headers, options) whose
/// direct `Serialize` impl iterates in the map's own randomized order, so
/// hashing `to_vec(task)` directly is not reproducible across identical
/// configs. Routing through `serde_json::Value` first canonicalizes object
/// key order (`Value`'s map is a `BTreeMap`), making the hash stable
/// regardless of `HashMap` iteration order or process restarts.
fn config_hash(task: &TaskConfig) -> String {
    let canonical = serde_json::to_value(task)
        .and_then(|value| serde_json::to_vec(&value))
        .unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(&canonical);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
