// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline-level validation (spec §4.9): jump target resolution and
//! decision-jump acyclicity, built on top of [`cronplus_conditions::JumpGraph`].

use crate::error::ConfigError;
use crate::step::{Step, StepKind};
use cronplus_conditions::{DecisionAction, JumpGraph};
use std::collections::{HashMap, HashSet};

/// Builds the jump graph implied by a pipeline's `decision` steps and
/// validates both that every `jumpTarget` resolves to a known step name and
/// that no cycle is reachable among jump edges.
pub fn validate_jump_graph(pipeline: &[Step]) -> Result<(), ConfigError> {
    let step_names: HashSet<&str> = pipeline.iter().filter_map(|s| s.name.as_deref()).collect();

    let mut edges: HashMap<&str, Vec<&str>> = HashMap::new();
    for step in pipeline {
        let Some(name) = step.name.as_deref() else { continue };
        let StepKind::Decision(decision) = &step.kind else { continue };
        for rule in &decision.rules {
            if let DecisionAction::Jump { jump_target } = &rule.action {
                edges.entry(name).or_default().push(jump_target.as_str());
            }
        }
        if let DecisionAction::Jump { jump_target } = &decision.default_action {
            edges.entry(name).or_default().push(jump_target.as_str());
        }
    }

    let graph = JumpGraph::new(step_names, edges);
    graph.validate_targets()?;
    graph.validate_acyclic()?;
    Ok(())
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
