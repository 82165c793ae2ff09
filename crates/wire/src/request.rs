// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Requests the CLI sends to the daemon (spec §6 control surface).

use cronplus_config::Config;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    /// Health check.
    Ping,
    /// Returns the currently-applied configuration.
    GetConfig,
    /// Reconciles the running supervisor set against `config` (spec §4.8).
    ApplyConfig { config: Box<Config> },
    /// Re-reads the config from the daemon's configured path and applies
    /// it, equivalent to `ApplyConfig` with a config loaded from disk.
    Reload,
    /// Returns one row per configured task (spec §6 `tasksSnapshot`).
    TasksSnapshot,
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
