// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The stabilization window (spec §4.2 step 4): sample size+mtime every
//! `pollIntervalMs` and consider the file ready once both have stayed
//! unchanged for a full `stabilizationMs` window, capped by a 10-minute
//! safety deadline.

use std::path::Path;
use std::time::{Duration, SystemTime};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Outcome of waiting for a file to stabilize.
pub enum StabilizeOutcome {
    /// The file was stable for the full window.
    Ready { skipped_deadline: bool },
    /// The file disappeared mid-wait; the caller drops the event silently.
    Disappeared,
    /// Stabilization was cancelled (watcher shutdown).
    Cancelled,
}

#[derive(PartialEq, Eq, Clone, Copy)]
struct Sample {
    len: u64,
    modified: Option<SystemTime>,
}

fn sample(path: &Path) -> Option<Sample> {
    let metadata = std::fs::metadata(path).ok()?;
    Some(Sample { len: metadata.len(), modified: metadata.modified().ok() })
}

/// Waits for `path` to stabilize. If `stabilization_ms` is 0, returns
/// `Ready` immediately without polling (spec edge case).
pub async fn wait_for_stable(
    path: &Path,
    stabilization_ms: u64,
    poll_interval_ms: u64,
    safety_deadline: Duration,
    cancel: &CancellationToken,
) -> StabilizeOutcome {
    let Some(mut last) = sample(path) else {
        return StabilizeOutcome::Disappeared;
    };
    if stabilization_ms == 0 {
        return StabilizeOutcome::Ready { skipped_deadline: false };
    }

    let stabilization_window = Duration::from_millis(stabilization_ms);
    let poll_interval = Duration::from_millis(poll_interval_ms.max(1));
    let deadline = Instant::now() + safety_deadline;
    let mut window_start = Instant::now();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => return StabilizeOutcome::Cancelled,
            _ = tokio::time::sleep(poll_interval) => {}
        }

        if Instant::now() >= deadline {
            return StabilizeOutcome::Ready { skipped_deadline: true };
        }

        let Some(current) = sample(path) else {
            return StabilizeOutcome::Disappeared;
        };
        if current != last {
            last = current;
            window_start = Instant::now();
            continue;
        }
        if Instant::now().saturating_duration_since(window_start) >= stabilization_window {
            return StabilizeOutcome::Ready { skipped_deadline: false };
        }
    }
}

#[cfg(test)]
#[path = "stabilize_tests.rs"]
mod tests;
