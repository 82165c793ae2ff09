// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Generic retry+timeout wrapper (spec §4.5.3.d): "Run the step with its
//! `timeoutSeconds` and per-step `retry` policy. Retry on a failure whose
//! `ok=false`; compute delay by `backoffType` with `multiplier`, capped by
//! `maxBackoffMs`. Timeout is treated as a retryable failure."

use crate::step_result::StepOutcome;
use cronplus_config::RetryPolicy;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Runs `attempt` up to `policy.max_attempts` times, sleeping between
/// attempts per `policy.delay_for`. Each attempt is independently bounded by
/// `timeout` (when set) and the whole thing aborts early on cancellation.
pub async fn run_with_retry<F, Fut>(
    policy: &RetryPolicy,
    timeout: Option<Duration>,
    cancel: &CancellationToken,
    mut attempt: F,
) -> StepOutcome
where
    F: FnMut() -> Fut,
    Fut: Future<Output = StepOutcome>,
{
    let mut last = StepOutcome::failure("step never ran", Duration::ZERO, false);
    for attempt_number in 1..=policy.max_attempts {
        if cancel.is_cancelled() {
            return StepOutcome::cancelled(Duration::ZERO);
        }
        let started = Instant::now();
        let outcome = match timeout {
            Some(timeout) => match tokio::time::timeout(timeout, attempt()).await {
                Ok(outcome) => outcome,
                Err(_) => StepOutcome::failure(format!("timed out after {timeout:?}"), started.elapsed(), true),
            },
            None => attempt().await,
        };
        if outcome.ok || !outcome.retryable {
            return outcome;
        }
        last = outcome;
        if attempt_number < policy.max_attempts {
            let delay = policy.delay_for(attempt_number);
            tokio::select! {
                _ = cancel.cancelled() => return StepOutcome::cancelled(Duration::ZERO),
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
    last
}

#[cfg(test)]
#[path = "retry_exec_tests.rs"]
mod tests;
