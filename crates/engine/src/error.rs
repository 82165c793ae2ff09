// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("variable {name:?} is invalid: {reason}")]
    InvalidVariable { name: String, reason: String },
    #[error("pipeline validation failed: {0}")]
    Validation(#[from] cronplus_conditions::ConditionError),
    #[error("step {step:?} failed: {message}")]
    StepFailed { step: String, message: String, retryable: bool },
    #[error("execution cancelled at step {step:?}")]
    Cancelled { step: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    pub fn retryable(&self) -> bool {
        matches!(self, EngineError::StepFailed { retryable: true, .. })
    }
}
