// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration load and validation errors.

use cronplus_conditions::ConditionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    Read { path: std::path::PathBuf, #[source] source: std::io::Error },

    #[error("failed to parse config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("field {field}: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("duplicate step name {0:?} within one pipeline")]
    DuplicateStepName(String),

    #[error("duplicate task id {0:?}")]
    DuplicateTaskId(String),

    #[error("task {task_id:?} pipeline is empty")]
    EmptyPipeline { task_id: String },

    #[error("task {task_id:?} maxConcurrent must be >= 1, got {value}")]
    InvalidConcurrency { task_id: String, value: u32 },

    #[error(transparent)]
    Condition(#[from] ConditionError),
}
