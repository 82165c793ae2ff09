// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

/// Proptest strategies for core types, reused by every crate's property tests.
pub mod strategies {
    use crate::event::SupervisorState;
    use crate::task_id::TaskId;
    use proptest::prelude::*;

    pub fn arb_supervisor_state() -> impl Strategy<Value = SupervisorState> {
        prop_oneof![
            Just(SupervisorState::Starting),
            Just(SupervisorState::Running),
            Just(SupervisorState::Draining),
            Just(SupervisorState::Stopped),
            Just(SupervisorState::Failed),
        ]
    }

    pub fn arb_task_id() -> impl Strategy<Value = TaskId> {
        "[a-z][a-z0-9_-]{0,19}".prop_map(TaskId::new)
    }
}
