// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Root configuration document (spec §6): logging, runtime, metrics, and
//! the task list.

use crate::error::ConfigError;
use crate::task::TaskConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeConfig {
    #[serde(default = "default_max_concurrent_per_task")]
    pub max_concurrent_per_task: u32,
    #[serde(default = "default_state_db_path")]
    pub state_db_path: String,
    #[serde(default = "default_dead_letter_dir")]
    pub dead_letter_dir: String,
}

fn default_max_concurrent_per_task() -> u32 {
    1
}

fn default_state_db_path() -> String {
    "/var/lib/cronplus/state".to_string()
}

fn default_dead_letter_dir() -> String {
    "/var/lib/cronplus/dlq".to_string()
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_concurrent_per_task: default_max_concurrent_per_task(),
            state_db_path: default_state_db_path(),
            dead_letter_dir: default_dead_letter_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsConfig {
    #[serde(default)]
    pub enable_prometheus: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listen: Option<String>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enable_prometheus: false, listen: None }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub version: u32,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub tasks: Vec<TaskConfig>,
}

impl Config {
    /// Parses and structurally validates a config document from its JSON
    /// text. Does not touch the filesystem; see [`load_from_path`] for
    /// that.
    pub fn parse(json: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Per-document validation: unique task ids plus every task's own
    /// [`TaskConfig::validate`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = std::collections::HashSet::new();
        for task in &self.tasks {
            if !seen.insert(task.id.as_str()) {
                return Err(ConfigError::DuplicateTaskId(task.id.clone()));
            }
            task.validate()?;
        }
        Ok(())
    }
}

/// Loads and validates a config document from disk. Reconciliation
/// (spec §4.8) and hot-reload are out of scope for this crate, which is a
/// deliberate Non-goal per spec §9 — callers in `cronplus-daemon` own the
/// control-surface `reload`/`applyConfig` flow and call this as their
/// parse step.
pub fn load_from_path(path: &Path) -> Result<Config, ConfigError> {
    let text = std::fs::read_to_string(path)
        .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
    Config::parse(&text)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
