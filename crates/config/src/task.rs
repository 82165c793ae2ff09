// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task configuration (spec §3): watch settings, variables, and the
//! pipeline of steps that runs for each matched file.

use crate::error::ConfigError;
use crate::step::Step;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableType {
    String,
    Int,
    Bool,
    Date,
    Datetime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    #[serde(rename = "type")]
    pub var_type: VariableType,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchConfig {
    pub directory: String,
    #[serde(default = "default_glob")]
    pub glob: String,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_stabilization_ms")]
    pub stabilization_ms: u64,
}

fn default_glob() -> String {
    "*".to_string()
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_stabilization_ms() -> u64 {
    500
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskConfig {
    pub id: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub watch: WatchConfig,
    #[serde(default)]
    pub variables: Vec<Variable>,
    pub pipeline: Vec<Step>,
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: u32,
}

fn default_max_concurrent() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

impl TaskConfig {
    /// Per-task structural validation (spec §4.9): non-empty pipeline,
    /// positive concurrency, unique step names, resolvable jump targets,
    /// an acyclic decision-jump graph, and every step's own `validate()`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pipeline.is_empty() {
            return Err(ConfigError::EmptyPipeline { task_id: self.id.clone() });
        }
        if self.max_concurrent == 0 {
            return Err(ConfigError::InvalidConcurrency { task_id: self.id.clone(), value: self.max_concurrent });
        }

        let mut seen = std::collections::HashSet::new();
        for step in &self.pipeline {
            if let Some(name) = &step.name {
                if !seen.insert(name.as_str()) {
                    return Err(ConfigError::DuplicateStepName(name.clone()));
                }
            }
            step.validate()?;
        }

        crate::validate::validate_jump_graph(&self.pipeline)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
