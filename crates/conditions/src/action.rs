// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Control-flow actions a matched rule or condition can take (spec §4.5.3.b/f).

use serde::{Deserialize, Serialize};

/// What the executor does when a `decision` rule matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum DecisionAction {
    Continue,
    Skip,
    Stop,
    Fail,
    Jump { jump_target: String },
}

/// What the executor does when a bare `condition` step's `onTrue`/`onFalse`
/// branch fires. A narrower set than [`DecisionAction`]: conditions cannot
/// jump (spec §3: "`onTrue`/`onFalse` ∈ {continue, skip, stop, fail}").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BranchAction {
    Continue,
    Skip,
    Stop,
    Fail,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_action_jump_round_trips_through_json() {
        let action = DecisionAction::Jump { jump_target: "big".to_string() };
        let json = serde_json::to_string(&action).unwrap();
        let parsed: DecisionAction = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, action);
    }

    #[test]
    fn branch_action_serializes_camel_case() {
        assert_eq!(serde_json::to_string(&BranchAction::Stop).unwrap(), "\"stop\"");
    }
}
