// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Acyclicity check for `decision`-originated jump edges (spec §4.9: "No
//! reachable cycle among decision-originated jumps (DFS with a recursion
//! stack)").

use crate::error::ConditionError;
use std::collections::{HashMap, HashSet};

/// Every step name that can legally appear as a `jumpTarget`, and the set of
/// jump targets reachable directly from each step (a step with no `jump`
/// action has no outgoing edges).
pub struct JumpGraph<'a> {
    pub step_names: HashSet<&'a str>,
    pub edges: HashMap<&'a str, Vec<&'a str>>,
}

impl<'a> JumpGraph<'a> {
    pub fn new(step_names: HashSet<&'a str>, edges: HashMap<&'a str, Vec<&'a str>>) -> Self {
        Self { step_names, edges }
    }

    /// Every `jumpTarget` must resolve to a step name in the pipeline.
    pub fn validate_targets(&self) -> Result<(), ConditionError> {
        for targets in self.edges.values() {
            for target in targets {
                if !self.step_names.contains(target) {
                    return Err(ConditionError::UnresolvedJumpTarget(target.to_string()));
                }
            }
        }
        Ok(())
    }

    /// DFS with a recursion stack: a back-edge to a node still on the stack
    /// is a cycle.
    pub fn validate_acyclic(&self) -> Result<(), ConditionError> {
        let mut visited = HashSet::new();
        let mut stack = HashSet::new();
        for &start in &self.step_names {
            if !visited.contains(start) {
                self.dfs(start, &mut visited, &mut stack)?;
            }
        }
        Ok(())
    }

    fn dfs<'b>(
        &'b self,
        node: &'b str,
        visited: &mut HashSet<&'b str>,
        stack: &mut HashSet<&'b str>,
    ) -> Result<(), ConditionError> {
        visited.insert(node);
        stack.insert(node);
        if let Some(targets) = self.edges.get(node) {
            for &next in targets {
                if stack.contains(next) {
                    return Err(ConditionError::CyclicJump(next.to_string()));
                }
                if !visited.contains(next) {
                    self.dfs(next, visited, stack)?;
                }
            }
        }
        stack.remove(node);
        Ok(())
    }
}

#[cfg(test)]
#[path = "jump_graph_tests.rs"]
mod tests;
