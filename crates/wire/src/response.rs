// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Responses the daemon sends back to the CLI (spec §6 control surface).

use crate::snapshot::TaskSnapshot;
use cronplus_config::Config;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Response {
    Pong,
    Config { config: Box<Config> },
    /// Result of a reconciliation pass (spec §4.8): counts plus the tasks
    /// that were disabled for failing validation in lenient mode.
    Applied {
        added: usize,
        removed: usize,
        updated: usize,
        unchanged: usize,
        disabled: Vec<DisabledTask>,
    },
    TasksSnapshot { tasks: Vec<TaskSnapshot> },
    Error { message: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisabledTask {
    pub id: String,
    pub reason: String,
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;
