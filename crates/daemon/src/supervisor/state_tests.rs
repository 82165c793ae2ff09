// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    created_to_initializing = { SupervisorState::Created, SupervisorState::Initializing, true },
    initializing_to_idle = { SupervisorState::Initializing, SupervisorState::Idle, true },
    initializing_to_failed = { SupervisorState::Initializing, SupervisorState::Failed, true },
    idle_to_processing = { SupervisorState::Idle, SupervisorState::Processing, true },
    idle_to_paused = { SupervisorState::Idle, SupervisorState::Paused, true },
    idle_to_degraded = { SupervisorState::Idle, SupervisorState::Degraded, true },
    processing_to_idle = { SupervisorState::Processing, SupervisorState::Idle, true },
    processing_to_failed = { SupervisorState::Processing, SupervisorState::Failed, true },
    paused_to_idle = { SupervisorState::Paused, SupervisorState::Idle, true },
    degraded_to_failed = { SupervisorState::Degraded, SupervisorState::Failed, true },
    stopping_to_stopped = { SupervisorState::Stopping, SupervisorState::Stopped, true },
    failed_to_stopping = { SupervisorState::Failed, SupervisorState::Stopping, true },
    created_to_idle_is_illegal = { SupervisorState::Created, SupervisorState::Idle, false },
    stopped_to_anything_is_illegal = { SupervisorState::Stopped, SupervisorState::Idle, false },
    idle_to_failed_is_illegal = { SupervisorState::Idle, SupervisorState::Failed, false },
    processing_to_created_is_illegal = { SupervisorState::Processing, SupervisorState::Created, false },
)]
fn transition_table_matches_spec(from: SupervisorState, to: SupervisorState, expected: bool) {
    assert_eq!(from.can_transition_to(to), expected);
}

#[test]
fn stopped_is_terminal() {
    assert!(SupervisorState::Stopped.is_terminal());
    assert!(!SupervisorState::Idle.is_terminal());
}

#[test]
fn new_machine_starts_created() {
    let machine = StateMachine::new();
    assert_eq!(machine.current(), SupervisorState::Created);
}

#[test]
fn valid_transition_updates_current_and_returns_prior_state() {
    let machine = StateMachine::new();
    let prior = machine.transition(SupervisorState::Initializing).expect("valid");
    assert_eq!(prior, SupervisorState::Created);
    assert_eq!(machine.current(), SupervisorState::Initializing);
}

#[test]
fn invalid_transition_is_rejected_and_state_is_unchanged() {
    let machine = StateMachine::new();
    let result = machine.transition(SupervisorState::Processing);
    assert!(result.is_err());
    assert_eq!(machine.current(), SupervisorState::Created);
}

#[test]
fn full_lifecycle_reaches_stopped() {
    let machine = StateMachine::new();
    machine.transition(SupervisorState::Initializing).expect("init");
    machine.transition(SupervisorState::Idle).expect("idle");
    machine.transition(SupervisorState::Processing).expect("processing");
    machine.transition(SupervisorState::Idle).expect("idle again");
    machine.transition(SupervisorState::Stopping).expect("stopping");
    machine.transition(SupervisorState::Stopped).expect("stopped");
    assert_eq!(machine.current(), SupervisorState::Stopped);
}
