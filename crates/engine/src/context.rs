// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Execution Context (spec §3, §4.4 built-ins): the per-run bundle of file
//! metadata, variables, and log passed down a pipeline.

use crate::error::EngineError;
use chrono::{DateTime, Utc};
use cronplus_conditions::{FieldSource, FieldValue};
use cronplus_config::{Variable, VariableType};
use cronplus_core::TaskId;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// One step's contribution to the execution log (spec §3 `log`).
#[derive(Debug, Clone, serde::Serialize)]
pub struct StepLogEntry {
    pub step_name: String,
    pub started_at_ms: u64,
    pub ok: bool,
    pub message: String,
    pub elapsed_ms: u64,
}

/// Per-execution, mutable, single-owner bundle (spec §3 Execution Context,
/// §9 "pass the Execution Context by value into step calls... require
/// steps to return outputs rather than mutate shared state in place").
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pub task_id: TaskId,
    pub file_path: PathBuf,
    pub variables: HashMap<String, Value>,
    pub log: Vec<StepLogEntry>,
    pub started_at_ms: u64,
}

const BUILTIN_FILE_NAME: &str = "fileName";
const BUILTIN_FILE_NAME_NO_EXT: &str = "fileNameWithoutExt";
const BUILTIN_FILE_EXT: &str = "fileExt";
const BUILTIN_FILE_DIR: &str = "fileDir";
const BUILTIN_FILE_PATH: &str = "filePath";
const BUILTIN_TASK_ID: &str = "taskId";
const BUILTIN_DATE: &str = "date";
const BUILTIN_TIME: &str = "time";
const BUILTIN_DATETIME: &str = "datetime";
const BUILTIN_TIMESTAMP: &str = "timestamp";

impl ExecutionContext {
    /// Seeds built-ins and task variables (spec §4.5 step 2). `epoch_ms`
    /// comes from the caller's [`cronplus_core::Clock`] so tests can pin it.
    pub fn new(
        task_id: TaskId,
        file_path: PathBuf,
        task_variables: &[Variable],
        epoch_ms: u64,
    ) -> Result<Self, EngineError> {
        let mut variables = HashMap::new();

        let file_name = file_path.file_name().and_then(|n| n.to_str()).unwrap_or_default().to_string();
        let file_ext = file_path.extension().and_then(|e| e.to_str()).unwrap_or_default().to_string();
        let file_name_no_ext = file_path.file_stem().and_then(|n| n.to_str()).unwrap_or_default().to_string();
        let file_dir = file_path.parent().map(|p| p.display().to_string()).unwrap_or_default();

        let datetime = DateTime::<Utc>::from_timestamp_millis(epoch_ms as i64).unwrap_or_else(Utc::now);

        variables.insert(BUILTIN_FILE_NAME.to_string(), Value::String(file_name));
        variables.insert(BUILTIN_FILE_NAME_NO_EXT.to_string(), Value::String(file_name_no_ext));
        variables.insert(BUILTIN_FILE_EXT.to_string(), Value::String(file_ext));
        variables.insert(BUILTIN_FILE_DIR.to_string(), Value::String(file_dir));
        variables.insert(BUILTIN_FILE_PATH.to_string(), Value::String(file_path.display().to_string()));
        variables.insert(BUILTIN_TASK_ID.to_string(), Value::String(task_id.as_str().to_string()));
        variables.insert(BUILTIN_DATE.to_string(), Value::String(datetime.format("%Y-%m-%d").to_string()));
        variables.insert(BUILTIN_TIME.to_string(), Value::String(datetime.format("%H:%M:%S").to_string()));
        variables.insert(BUILTIN_DATETIME.to_string(), Value::String(datetime.to_rfc3339()));
        variables.insert(BUILTIN_TIMESTAMP.to_string(), Value::Number((epoch_ms / 1000).into()));

        for variable in task_variables {
            variables.insert(variable.name.clone(), parse_variable(variable)?);
        }

        Ok(Self { task_id, file_path, variables, log: Vec::new(), started_at_ms: epoch_ms })
    }

    /// Merges a step's `outputs` into the context (spec §4.5 step e).
    pub fn merge_outputs(&mut self, outputs: HashMap<String, Value>) {
        self.variables.extend(outputs);
    }

    pub fn record(&mut self, entry: StepLogEntry) {
        self.log.push(entry);
    }

    pub fn file_metadata(&self) -> Option<std::fs::Metadata> {
        std::fs::metadata(&self.file_path).ok()
    }
}

fn parse_variable(variable: &Variable) -> Result<Value, EngineError> {
    let err = |reason: &str| EngineError::InvalidVariable {
        name: variable.name.clone(),
        reason: reason.to_string(),
    };
    Ok(match variable.var_type {
        VariableType::String => Value::String(variable.value.clone()),
        VariableType::Int => {
            let n: i64 = variable.value.parse().map_err(|_| err("not a valid integer"))?;
            Value::Number(n.into())
        }
        VariableType::Bool => {
            let b: bool = variable.value.parse().map_err(|_| err("not a valid bool"))?;
            Value::Bool(b)
        }
        VariableType::Date | VariableType::Datetime => {
            // Stored as the original string; timestamp comparisons go
            // through `json_to_field_value`'s ISO-8601 parse below.
            Value::String(variable.value.clone())
        }
    })
}

/// Walks a dotted/indexed path (`"user.email"`, `"items[0].id"`) through a
/// JSON value tree.
pub fn walk_json_path(root: &Value, path: &str) -> Option<Value> {
    let mut current = root.clone();
    for segment in tokenize_path(path) {
        current = match segment {
            PathSegment::Key(key) => current.get(&key)?.clone(),
            PathSegment::Index(index) => current.get(index)?.clone(),
        };
    }
    Some(current)
}

enum PathSegment {
    Key(String),
    Index(usize),
}

fn tokenize_path(path: &str) -> Vec<PathSegment> {
    let mut segments = Vec::new();
    for part in path.split('.') {
        let mut rest = part;
        while let Some(open) = rest.find('[') {
            if open > 0 {
                segments.push(PathSegment::Key(rest[..open].to_string()));
            }
            let Some(close) = rest[open..].find(']') else { break };
            let index_str = &rest[open + 1..open + close];
            if let Ok(index) = index_str.parse::<usize>() {
                segments.push(PathSegment::Index(index));
            }
            rest = &rest[open + close + 1..];
        }
        if !rest.is_empty() {
            segments.push(PathSegment::Key(rest.to_string()));
        }
    }
    segments
}

/// Converts a resolved JSON value into the condition language's value type.
pub fn json_to_field_value(value: &Value) -> FieldValue {
    match value {
        Value::Null => FieldValue::Null,
        Value::Bool(b) => FieldValue::Bool(*b),
        Value::Number(n) => FieldValue::Number(n.as_f64().unwrap_or(f64::NAN)),
        Value::String(s) => {
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                FieldValue::TimestampMs(dt.timestamp_millis())
            } else {
                FieldValue::String(s.clone())
            }
        }
        Value::Array(items) => FieldValue::List(items.iter().map(json_to_field_value).collect()),
        Value::Object(_) => FieldValue::Null,
    }
}

fn file_size_bytes(path: &Path) -> Option<u64> {
    std::fs::metadata(path).ok().map(|m| m.len())
}

fn file_age_minutes(path: &Path, now_ms: u64) -> Option<f64> {
    let metadata = std::fs::metadata(path).ok()?;
    let modified = metadata.modified().ok()?;
    let modified_ms = modified.duration_since(std::time::UNIX_EPOCH).ok()?.as_millis() as u64;
    Some((now_ms.saturating_sub(modified_ms)) as f64 / 60_000.0)
}

impl FieldSource for ExecutionContext {
    fn resolve(&self, field: &str) -> FieldValue {
        if let Some(name) = field.strip_prefix("env.") {
            return std::env::var(name).map(FieldValue::String).unwrap_or(FieldValue::Null);
        }
        match field {
            // spec §4.3 lists the condition-resolvable field as lowercase
            // `filename`, distinct from the interpolation built-in `fileName`.
            "filename" => return self.resolve(BUILTIN_FILE_NAME),
            "fileSize" => return file_size_bytes(&self.file_path).map(|n| FieldValue::Number(n as f64)).unwrap_or(FieldValue::Null),
            "fileAgeMinutes" => {
                return file_age_minutes(&self.file_path, current_epoch_ms())
                    .map(FieldValue::Number)
                    .unwrap_or(FieldValue::Null)
            }
            "file.sizeKB" => {
                return file_size_bytes(&self.file_path)
                    .map(|n| FieldValue::Number(n as f64 / 1024.0))
                    .unwrap_or(FieldValue::Null)
            }
            _ => {}
        }
        match walk_json_path(&Value::Object(self.variables.clone().into_iter().collect()), field) {
            Some(value) => json_to_field_value(&value),
            None => FieldValue::Null,
        }
    }
}

fn current_epoch_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
