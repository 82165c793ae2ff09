// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `StepResult` (spec §4.3): `{ok, message, outputs?, executionTime, error?}`.

use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub ok: bool,
    pub message: String,
    pub outputs: HashMap<String, Value>,
    pub elapsed: Duration,
    pub retryable: bool,
}

impl StepOutcome {
    pub fn success(message: impl Into<String>, elapsed: Duration) -> Self {
        Self { ok: true, message: message.into(), outputs: HashMap::new(), elapsed, retryable: false }
    }

    pub fn success_with_outputs(message: impl Into<String>, elapsed: Duration, outputs: HashMap<String, Value>) -> Self {
        Self { ok: true, message: message.into(), outputs, elapsed, retryable: false }
    }

    pub fn failure(message: impl Into<String>, elapsed: Duration, retryable: bool) -> Self {
        Self { ok: false, message: message.into(), outputs: HashMap::new(), elapsed, retryable }
    }

    pub fn cancelled(elapsed: Duration) -> Self {
        Self { ok: false, message: "cancelled".to_string(), outputs: HashMap::new(), elapsed, retryable: false }
    }
}
