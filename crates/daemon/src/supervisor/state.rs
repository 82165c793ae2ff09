// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Supervisor state machine (spec §4.6): a guarded transition table, not a
//! generic FSM crate — narrow, hand-rolled transition guards over a
//! generalized state-machine abstraction.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupervisorState {
    Created,
    Initializing,
    Idle,
    Processing,
    Paused,
    Degraded,
    Stopping,
    Stopped,
    Failed,
}

cronplus_core::simple_display! {
    SupervisorState {
        Created => "created",
        Initializing => "initializing",
        Idle => "idle",
        Processing => "processing",
        Paused => "paused",
        Degraded => "degraded",
        Stopping => "stopping",
        Stopped => "stopped",
        Failed => "failed",
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid supervisor transition: {from} -> {to}")]
pub struct TransitionError {
    pub from: SupervisorState,
    pub to: SupervisorState,
}

impl SupervisorState {
    /// Whether `self -> to` is a legal transition per spec §4.6's table.
    pub fn can_transition_to(self, to: SupervisorState) -> bool {
        use SupervisorState::*;
        matches!(
            (self, to),
            (Created, Initializing)
                | (Initializing, Idle)
                | (Initializing, Failed)
                | (Idle, Processing)
                | (Idle, Paused)
                | (Idle, Stopping)
                | (Idle, Degraded)
                | (Processing, Idle)
                | (Processing, Degraded)
                | (Processing, Stopping)
                | (Processing, Failed)
                | (Paused, Idle)
                | (Paused, Stopping)
                | (Degraded, Idle)
                | (Degraded, Stopping)
                | (Degraded, Failed)
                | (Stopping, Stopped)
                | (Stopping, Failed)
                | (Failed, Stopping)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, SupervisorState::Stopped)
    }
}

/// The current state plus the guard that enforces legal transitions.
/// Every change is intended to be paired with a timestamped
/// `Event::SupervisorStateChanged` by the caller (spec §4.6: "every change
/// is timestamped and emitted as an event for observability").
pub struct StateMachine {
    current: Mutex<SupervisorState>,
}

impl StateMachine {
    pub fn new() -> Self {
        Self { current: Mutex::new(SupervisorState::Created) }
    }

    pub fn current(&self) -> SupervisorState {
        *self.current.lock()
    }

    /// Attempts the transition. Invalid attempts are rejected (the caller
    /// logs a warning, per spec §4.6) and the state is left unchanged.
    pub fn transition(&self, to: SupervisorState) -> Result<SupervisorState, TransitionError> {
        let mut current = self.current.lock();
        if !current.can_transition_to(to) {
            return Err(TransitionError { from: *current, to });
        }
        let from = *current;
        *current = to;
        Ok(from)
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
