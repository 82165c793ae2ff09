// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bridges the OS-level `notify` watcher into the debounce engine's
//! [`RawChange`] vocabulary (spec §4.2 step 1).

use crate::debounce::RawChange;
use crate::error::WatcherError;
use crate::glob_filter::GlobFilter;
use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use tokio::sync::mpsc;

/// Owns the OS watch handle; dropping it stops the watch.
pub struct NotifyBridge {
    _watcher: RecommendedWatcher,
}

impl NotifyBridge {
    /// Starts watching `directory` non-recursively, forwarding filtered
    /// changes onto `raw_tx`.
    pub fn start(
        directory: &Path,
        filter: GlobFilter,
        raw_tx: mpsc::Sender<RawChange>,
    ) -> Result<Self, WatcherError> {
        let handler = move |res: notify::Result<Event>| {
            let Ok(event) = res else { return };
            for change in classify(&event, &filter) {
                let _ = raw_tx.blocking_send(change);
            }
        };
        let mut watcher = RecommendedWatcher::new(handler, notify::Config::default())
            .map_err(|source| WatcherError::NotifyInit { directory: directory.to_path_buf(), source })?;
        watcher
            .watch(directory, RecursiveMode::NonRecursive)
            .map_err(|source| WatcherError::NotifyInit { directory: directory.to_path_buf(), source })?;
        Ok(Self { _watcher: watcher })
    }
}

fn classify(event: &Event, filter: &GlobFilter) -> Vec<RawChange> {
    // A rename with both paths present reports [from, to]; treat the
    // source as removed and the destination as a fresh upsert.
    if let EventKind::Modify(ModifyKind::Name(RenameMode::Both)) = &event.kind {
        let mut out = Vec::new();
        if let [from, to] = event.paths.as_slice() {
            if filter.matches(from) {
                out.push(RawChange::Remove(from.clone()));
            }
            if filter.matches(to) {
                out.push(RawChange::Upsert(to.clone()));
            }
        }
        return out;
    }

    let mut out = Vec::new();
    for path in &event.paths {
        if !filter.matches(path) {
            continue;
        }
        match &event.kind {
            EventKind::Remove(_) => out.push(RawChange::Remove(path.clone())),
            EventKind::Modify(ModifyKind::Name(RenameMode::From)) => out.push(RawChange::Remove(path.clone())),
            EventKind::Modify(ModifyKind::Name(RenameMode::To)) => out.push(RawChange::Upsert(path.clone())),
            EventKind::Create(_) | EventKind::Modify(_) => out.push(RawChange::Upsert(path.clone())),
            _ => {}
        }
    }
    out
}

#[cfg(test)]
#[path = "notify_bridge_tests.rs"]
mod tests;
