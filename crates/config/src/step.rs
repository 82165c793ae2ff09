// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Step configuration: the tagged-variant payload types from spec §3, and
//! the table-driven decoder from spec §6/§9 ("Class inheritance + JSON
//! polymorphism of step types → represent as a tagged variant... Reflection-
//! based property mapping in the source must be replaced by a table-driven
//! decoder").
//!
//! A step is written either with an explicit `"type"` discriminator or with
//! the type inferred from which of the known sub-object keys (`copy`,
//! `move`, `archive`, `delete`, `print`, `http`, `decision`) is present.
//! [`Step`] implements `Deserialize` by hand over an intermediate
//! [`RawStep`] so both forms are accepted and conflicting/absent payloads
//! are rejected with one clear error rather than silently picking a
//! variant.

use crate::error::ConfigError;
use crate::retry::RetryPolicy;
use cronplus_conditions::{BranchAction, Condition, DecisionAction, Logic};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// A gate attached to any step (spec §3 common field `condition`, §4.5.3.b).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionGate {
    pub conditions: Vec<Condition>,
    #[serde(default = "default_logic")]
    pub logic: Logic,
    pub on_true: BranchAction,
    pub on_false: BranchAction,
}

fn default_logic() -> Logic {
    Logic::And
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveFormat {
    Zip,
    Gzip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConflictStrategy {
    Rename,
    Overwrite,
    Skip,
    IncrementNumber,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SendFileMode {
    None,
    Raw,
    Multipart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HttpAuth {
    None,
    Bearer,
    Basic,
    ApiKey,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyStep {
    pub destination: String,
    #[serde(default)]
    pub overwrite: bool,
    #[serde(default)]
    pub create_directories: bool,
    #[serde(default)]
    pub preserve_timestamps: bool,
    #[serde(default)]
    pub verify_checksum: bool,
    #[serde(default)]
    pub atomic_move: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rename_pattern: Option<String>,
}

/// `move` reuses every `copy` field — spec §3: "`move`: `copy` with source
/// deletion after verified write".
pub type MoveStep = CopyStep;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveStep {
    pub destination: String,
    pub format: ArchiveFormat,
    #[serde(default = "default_compression_level")]
    pub compression_level: i32,
    #[serde(default = "default_conflict_strategy")]
    pub conflict_strategy: ConflictStrategy,
    #[serde(default)]
    pub delete_original: bool,
    #[serde(default)]
    pub append_to_existing: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_archive_bytes: Option<u64>,
    #[serde(default)]
    pub verify_archive: bool,
}

fn default_compression_level() -> i32 {
    6
}

fn default_conflict_strategy() -> ConflictStrategy {
    ConflictStrategy::Rename
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteStep {
    #[serde(default)]
    pub secure: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_age_minutes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintStep {
    pub printer_name: String,
    #[serde(default = "default_copies")]
    pub copies: u32,
    #[serde(default = "default_print_timeout")]
    pub timeout_seconds: u32,
    #[serde(default)]
    pub options: HashMap<String, String>,
}

fn default_copies() -> u32 {
    1
}

fn default_print_timeout() -> u32 {
    60
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpStep {
    pub method: HttpMethod,
    pub url: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default = "default_send_file_mode")]
    pub send_file_mode: SendFileMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_field_name: Option<String>,
    #[serde(default = "default_http_auth")]
    pub auth: HttpAuth,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    #[serde(default = "default_http_timeout")]
    pub timeout_seconds: u32,
    #[serde(default = "default_max_redirects")]
    pub max_redirects: u32,
    #[serde(default = "default_true")]
    pub validate_tls: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_variable: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_variable: Option<String>,
    #[serde(default = "default_true")]
    pub fail_on_non_success: bool,
}

fn default_send_file_mode() -> SendFileMode {
    SendFileMode::None
}

fn default_http_auth() -> HttpAuth {
    HttpAuth::None
}

fn default_http_timeout() -> u32 {
    30
}

fn default_max_redirects() -> u32 {
    5
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRule {
    pub conditions: Vec<Condition>,
    #[serde(default = "default_logic")]
    pub logic: Logic,
    #[serde(flatten)]
    pub action: DecisionAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_variable: Option<SetVariable>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetVariable {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionStep {
    pub rules: Vec<DecisionRule>,
    pub default_action: DecisionAction,
}

/// The step payload, after the table-driven decoder has picked exactly one
/// variant out of the raw JSON object.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StepKind {
    Copy(CopyStep),
    Move(MoveStep),
    Archive(ArchiveStep),
    Delete(DeleteStep),
    Print(PrintStep),
    Http(HttpStep),
    Decision(DecisionStep),
}

impl StepKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            StepKind::Copy(_) => "copy",
            StepKind::Move(_) => "move",
            StepKind::Archive(_) => "archive",
            StepKind::Delete(_) => "delete",
            StepKind::Print(_) => "print",
            StepKind::Http(_) => "http",
            StepKind::Decision(_) => "decision",
        }
    }
}

/// A fully decoded step: common fields plus the variant-specific payload.
#[derive(Debug, Clone, Serialize)]
pub struct Step {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry: Option<RetryPolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<ConditionGate>,
    #[serde(flatten)]
    pub kind: StepKind,
}

/// Intermediate shape mirroring the raw JSON object before a variant is
/// selected. Every step-type key is optional; the decoder below enforces
/// "exactly one present" instead of relying on serde's own tagged-enum
/// matching, which cannot express "infer from whichever key exists."
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStep {
    #[serde(default, rename = "type")]
    type_hint: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default = "default_true")]
    enabled: bool,
    #[serde(default)]
    timeout_seconds: Option<u32>,
    #[serde(default)]
    retry: Option<RetryPolicy>,
    #[serde(default)]
    condition: Option<ConditionGate>,
    #[serde(default)]
    copy: Option<CopyStep>,
    #[serde(default, rename = "move")]
    move_: Option<MoveStep>,
    #[serde(default)]
    archive: Option<ArchiveStep>,
    #[serde(default)]
    delete: Option<DeleteStep>,
    #[serde(default)]
    print: Option<PrintStep>,
    #[serde(default)]
    http: Option<HttpStep>,
    #[serde(default)]
    decision: Option<DecisionStep>,
}

impl<'de> Deserialize<'de> for Step {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawStep::deserialize(deserializer)?;
        let mut present: Vec<(&'static str, StepKind)> = Vec::new();
        if let Some(copy) = raw.copy {
            present.push(("copy", StepKind::Copy(copy)));
        }
        if let Some(mv) = raw.move_ {
            present.push(("move", StepKind::Move(mv)));
        }
        if let Some(archive) = raw.archive {
            present.push(("archive", StepKind::Archive(archive)));
        }
        if let Some(delete) = raw.delete {
            present.push(("delete", StepKind::Delete(delete)));
        }
        if let Some(print) = raw.print {
            present.push(("print", StepKind::Print(print)));
        }
        if let Some(http) = raw.http {
            present.push(("http", StepKind::Http(http)));
        }
        if let Some(decision) = raw.decision {
            present.push(("decision", StepKind::Decision(decision)));
        }

        let kind = match (raw.type_hint.as_deref(), present.len()) {
            (Some(hint), _) => present
                .into_iter()
                .find(|(name, _)| *name == hint)
                .map(|(_, kind)| kind)
                .ok_or_else(|| {
                    D::Error::custom(format!(
                        "step declares type {hint:?} but has no matching {hint:?} sub-object"
                    ))
                })?,
            (None, 1) => present.into_iter().next().expect("len checked above").1,
            (None, 0) => {
                return Err(D::Error::custom(
                    "step has no recognizable payload: expected one of copy, move, archive, delete, print, http, decision",
                ))
            }
            (None, n) => {
                let names: Vec<&str> = present.iter().map(|(n, _)| *n).collect();
                return Err(D::Error::custom(format!(
                    "step is ambiguous: {n} payload keys present ({names:?}); add an explicit \"type\""
                )));
            }
        };

        Ok(Step {
            name: raw.name,
            enabled: raw.enabled,
            timeout_seconds: raw.timeout_seconds,
            retry: raw.retry,
            condition: raw.condition,
            kind,
        })
    }
}

impl Step {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(timeout) = self.timeout_seconds {
            if !(1..=3600).contains(&timeout) {
                return Err(ConfigError::InvalidField {
                    field: "timeoutSeconds".into(),
                    reason: format!("must be in 1..=3600, got {timeout}"),
                });
            }
        }
        if let Some(retry) = &self.retry {
            retry
                .validate()
                .map_err(|reason| ConfigError::InvalidField { field: "retry".into(), reason })?;
        }
        match &self.kind {
            StepKind::Copy(s) | StepKind::Move(s) => validate_absolute(&s.destination, "destination"),
            StepKind::Archive(s) => validate_absolute(&s.destination, "destination"),
            StepKind::Delete(_) => Ok(()),
            StepKind::Print(s) => {
                if s.copies == 0 {
                    return Err(ConfigError::InvalidField {
                        field: "print.copies".into(),
                        reason: "must be >= 1".into(),
                    });
                }
                Ok(())
            }
            StepKind::Http(s) => {
                if s.url.is_empty() {
                    return Err(ConfigError::InvalidField {
                        field: "http.url".into(),
                        reason: "must not be empty".into(),
                    });
                }
                Ok(())
            }
            StepKind::Decision(s) => {
                if s.rules.is_empty() {
                    return Err(ConfigError::InvalidField {
                        field: "decision.rules".into(),
                        reason: "must be non-empty".into(),
                    });
                }
                Ok(())
            }
        }
    }
}

fn validate_absolute(path: &str, field: &str) -> Result<(), ConfigError> {
    // Interpolation may still turn a valid-looking absolute path into
    // something else at runtime (handled as a step failure per spec §4.9),
    // but pre-interpolation the destination must already look absolute.
    if path.starts_with('/') || path.contains(":\\") || path.starts_with("${") {
        Ok(())
    } else {
        Err(ConfigError::InvalidField {
            field: field.into(),
            reason: format!("must be an absolute path, got {path:?}"),
        })
    }
}

#[cfg(test)]
#[path = "step_tests.rs"]
mod tests;
