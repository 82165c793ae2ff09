// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ties the notify bridge and debounce engine together into one watch on
//! a single directory (spec §4.2).

use crate::debounce::{self, DebounceConfig, ReadyFile};
use crate::error::WatcherError;
use crate::glob_filter::GlobFilter;
use crate::notify_bridge::NotifyBridge;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub struct WatchSpec {
    pub directory: PathBuf,
    pub glob: String,
    pub debounce_ms: u64,
    pub stabilization_ms: u64,
    pub poll_interval_ms: u64,
}

impl WatchSpec {
    fn debounce_config(&self) -> DebounceConfig {
        DebounceConfig {
            debounce_ms: self.debounce_ms,
            stabilization_ms: self.stabilization_ms,
            poll_interval_ms: self.poll_interval_ms,
            ..DebounceConfig::default()
        }
    }
}

/// Runs one watch to completion (until `cancel` fires or the notifier dies).
/// Returns an error if the notifier could not be established in the first
/// place; a notifier that dies mid-run causes the channel to close and this
/// function to return `Ok(())` so the caller's restart loop can retry.
pub async fn watch_once(
    spec: &WatchSpec,
    ready_tx: mpsc::Sender<ReadyFile>,
    cancel: CancellationToken,
) -> Result<(), WatcherError> {
    let (raw_tx, raw_rx) = mpsc::channel(256);
    let filter = GlobFilter::new(&spec.glob)?;
    let bridge = NotifyBridge::start(&spec.directory, filter, raw_tx)?;

    debounce::run(spec.debounce_config(), raw_rx, ready_tx, cancel).await;
    drop(bridge);
    Ok(())
}

/// Runs `watch_once` under a restart loop with exponential backoff
/// (1s -> 30s) whenever the notifier dies. Pending entries do not survive
/// a restart (the debounce engine is recreated), but a fresh notify
/// subscription re-observes any file still present on disk.
pub async fn run_supervised(spec: WatchSpec, ready_tx: mpsc::Sender<ReadyFile>, cancel: CancellationToken) {
    const MIN_BACKOFF: Duration = Duration::from_secs(1);
    const MAX_BACKOFF: Duration = Duration::from_secs(30);
    let mut backoff = MIN_BACKOFF;

    loop {
        if cancel.is_cancelled() {
            return;
        }
        info!(directory = %spec.directory.display(), "starting directory watch");
        match watch_once(&spec, ready_tx.clone(), cancel.clone()).await {
            Ok(()) => {
                if cancel.is_cancelled() {
                    return;
                }
                warn!(directory = %spec.directory.display(), backoff_secs = backoff.as_secs(), "watcher stopped unexpectedly, restarting");
            }
            Err(error) => {
                warn!(directory = %spec.directory.display(), %error, backoff_secs = backoff.as_secs(), "watcher failed to start, retrying");
            }
        }

        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(backoff) => {}
        }
        backoff = (backoff * 2).min(MAX_BACKOFF);
    }
}

#[cfg(test)]
#[path = "watcher_tests.rs"]
mod tests;
