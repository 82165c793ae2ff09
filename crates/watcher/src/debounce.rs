// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The debounce engine (spec §4.2 steps 2-5): coalesce a burst of raw
//! filesystem events per path, wait out the debounce window, then hand
//! the path to [`crate::stabilize`] before declaring it ready.
//!
//! Kept independent of `notify` so it can be driven by synthetic events
//! in tests without touching the real filesystem watcher.

use crate::pending::PendingEntry;
use crate::stabilize::{self, StabilizeOutcome};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// A raw, unfiltered, un-debounced change observed on disk.
#[derive(Debug, Clone)]
pub enum RawChange {
    Upsert(PathBuf),
    Remove(PathBuf),
}

/// A file the pipeline is ready to act on.
#[derive(Debug, Clone)]
pub struct ReadyFile {
    pub path: PathBuf,
    pub detected_at_ms: u64,
    pub stabilization_skipped: bool,
}

pub struct DebounceConfig {
    pub debounce_ms: u64,
    pub stabilization_ms: u64,
    pub poll_interval_ms: u64,
    pub safety_deadline: Duration,
    /// How often the pending table is swept for debounce-eligible entries.
    pub sweep_interval: Duration,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            stabilization_ms: 2_000,
            poll_interval_ms: 200,
            safety_deadline: Duration::from_secs(600),
            sweep_interval: Duration::from_millis(100),
        }
    }
}

/// Drives raw changes to ready files. Consumes `raw_rx` until the channel
/// closes or `cancel` fires, emitting onto `ready_tx` as files stabilize.
pub async fn run(
    config: DebounceConfig,
    mut raw_rx: mpsc::Receiver<RawChange>,
    ready_tx: mpsc::Sender<ReadyFile>,
    cancel: CancellationToken,
) {
    let mut pending: HashMap<PathBuf, PendingEntry> = HashMap::new();
    let mut stabilizing: JoinSet<(PathBuf, StabilizeOutcome)> = JoinSet::new();
    let mut sweep = tokio::time::interval(config.sweep_interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            maybe_change = raw_rx.recv() => {
                match maybe_change {
                    Some(RawChange::Upsert(path)) => {
                        pending.entry(path).and_modify(|e| e.refresh(Instant::now())).or_insert_with(|| PendingEntry::new(Instant::now()));
                    }
                    Some(RawChange::Remove(path)) => {
                        pending.remove(&path);
                    }
                    None => break,
                }
            }
            _ = sweep.tick() => {
                let now = Instant::now();
                let eligible: Vec<PathBuf> = pending
                    .iter()
                    .filter(|(_, entry)| entry.is_eligible(now, config.debounce_ms))
                    .map(|(path, _)| path.clone())
                    .collect();
                for path in eligible {
                    pending.remove(&path);
                    let stabilization_ms = config.stabilization_ms;
                    let poll_interval_ms = config.poll_interval_ms;
                    let safety_deadline = config.safety_deadline;
                    let child_cancel = cancel.clone();
                    stabilizing.spawn(async move {
                        let outcome = stabilize::wait_for_stable(
                            &path,
                            stabilization_ms,
                            poll_interval_ms,
                            safety_deadline,
                            &child_cancel,
                        )
                        .await;
                        (path, outcome)
                    });
                }
            }
            Some(joined) = stabilizing.join_next(), if !stabilizing.is_empty() => {
                let Ok((path, outcome)) = joined else { continue };
                match outcome {
                    StabilizeOutcome::Ready { skipped_deadline } => {
                        let ready = ReadyFile {
                            path,
                            detected_at_ms: crate::now_ms(),
                            stabilization_skipped: skipped_deadline,
                        };
                        if ready_tx.send(ready).await.is_err() {
                            break;
                        }
                    }
                    StabilizeOutcome::Disappeared | StabilizeOutcome::Cancelled => {}
                }
            }
        }
    }
    while stabilizing.join_next().await.is_some() {}
}

#[cfg(test)]
#[path = "debounce_tests.rs"]
mod tests;
