// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cronplus-daemon: the Task Supervisor (spec §4.6), Dead-Letter Queue
//! retry driver (§4.7), Task Manager/Reconciler (§4.8), crash-recovery
//! startup, and control-surface listener (§6). This is the `cronplusd`
//! binary's library half; `main.rs` only wires up CLI argument parsing,
//! logging, and the process exit codes (spec §6).

pub mod dlq_driver;
pub mod error;
pub mod lifecycle;
pub mod listener;
pub mod manager;
pub mod observability;
pub mod supervisor;

pub use error::DaemonError;
pub use manager::{ApplyOutcome, DisabledTask, Manager};
pub use observability::EventBus;
pub use supervisor::{SupervisorHandle, SupervisorState, TransitionError};
