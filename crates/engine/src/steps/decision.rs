// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `decision` step (spec §4.3/§4.5): the first matching rule's `action`
//! wins; if none match, `defaultAction` applies. A matched rule's
//! `setVariable` is applied to the context before the action is returned.

use crate::context::ExecutionContext;
use crate::step_result::StepOutcome;
use cronplus_conditions::{evaluate_all, DecisionAction};
use cronplus_config::DecisionStep;
use serde_json::Value;
use std::time::Instant;

pub fn evaluate(step: &DecisionStep, ctx: &mut ExecutionContext) -> (StepOutcome, DecisionAction) {
    let started = Instant::now();
    for rule in &step.rules {
        if evaluate_all(&rule.conditions, rule.logic, &*ctx) {
            if let Some(set_variable) = &rule.set_variable {
                ctx.variables.insert(set_variable.name.clone(), Value::String(set_variable.value.clone()));
            }
            let message = format!("rule matched, action={:?}", rule.action);
            return (StepOutcome::success(message, started.elapsed()), rule.action.clone());
        }
    }
    let message = format!("no rule matched, defaultAction={:?}", step.default_action);
    (StepOutcome::success(message, started.elapsed()), step.default_action.clone())
}

#[cfg(test)]
#[path = "decision_tests.rs"]
mod tests;
