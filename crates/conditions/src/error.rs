// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors raised while validating or evaluating a condition.
#[derive(Debug, Error, PartialEq)]
pub enum ConditionError {
    #[error("condition has no operands: {0}")]
    EmptyConjunction(String),
    #[error("invalid regex for field {field:?}: {source}")]
    InvalidRegex { field: String, source: String },
    #[error("operator {operator:?} requires a value, field {field:?} has none")]
    MissingValue { field: String, operator: String },
    #[error("operator {operator:?} on field {field:?} requires a list value")]
    ExpectedList { field: String, operator: String },
    #[error("operator {operator:?} on field {field:?} requires a two-element range")]
    ExpectedRange { field: String, operator: String },
    #[error("jump target {0:?} does not resolve to a step in the pipeline")]
    UnresolvedJumpTarget(String),
    #[error("decision graph contains a cycle starting at step {0:?}")]
    CyclicJump(String),
}
