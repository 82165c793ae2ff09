// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-step retry policy (spec §3 `retry`, §4.5.3.d, open question #3).

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BackoffType {
    Constant,
    Linear,
    Exponential,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryPolicy {
    pub max_attempts: u32,
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
    #[serde(default = "default_backoff_type")]
    pub backoff_type: BackoffType,
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_backoff_ms: Option<u64>,
}

fn default_backoff_ms() -> u64 {
    500
}

fn default_backoff_type() -> BackoffType {
    BackoffType::Exponential
}

fn default_multiplier() -> f64 {
    2.0
}

impl Default for RetryPolicy {
    /// Open question #3: the specification's own worked example (§8
    /// scenario 3) uses exactly these values, so they are adopted as the
    /// system-wide default when a step omits `retry` entirely.
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_ms: default_backoff_ms(),
            backoff_type: default_backoff_type(),
            multiplier: default_multiplier(),
            max_backoff_ms: None,
        }
    }
}

impl RetryPolicy {
    /// Delay before the `attempt`-th retry (1-indexed: the delay before the
    /// first retry is `delay_for(1)`).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let base = self.backoff_ms as f64;
        let ms = match self.backoff_type {
            BackoffType::Constant => base,
            BackoffType::Linear => base * attempt as f64,
            BackoffType::Exponential => base * self.multiplier.powi(attempt as i32 - 1),
        };
        let capped = match self.max_backoff_ms {
            Some(max) => ms.min(max as f64),
            None => ms,
        };
        Duration::from_millis(capped.max(0.0) as u64)
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(1..=10).contains(&self.max_attempts) {
            return Err(format!("retry.maxAttempts must be in 1..=10, got {}", self.max_attempts));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
