// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Directory watching: turns raw filesystem notifications into debounced,
//! stabilized, glob-filtered file-ready events (spec §4.2).

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

mod debounce;
mod error;
mod glob_filter;
mod notify_bridge;
mod pending;
mod stabilize;
mod watcher;

pub use debounce::{DebounceConfig, ReadyFile};
pub use error::WatcherError;
pub use glob_filter::GlobFilter;
pub use watcher::{run_supervised, watch_once, WatchSpec};

pub(crate) fn now_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
}
