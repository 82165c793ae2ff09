// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

fn fast_policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy { max_attempts, backoff_ms: 1, backoff_type: cronplus_config::BackoffType::Constant, multiplier: 1.0, max_backoff_ms: None }
}

#[tokio::test]
async fn succeeds_without_retrying_on_first_success() {
    let calls = Arc::new(AtomicU32::new(0));
    let cancel = CancellationToken::new();
    let calls_clone = calls.clone();

    let outcome = run_with_retry(&fast_policy(3), None, &cancel, || {
        let calls = calls_clone.clone();
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            StepOutcome::success("ok", Duration::ZERO)
        }
    })
    .await;

    assert!(outcome.ok);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn retries_a_retryable_failure_until_max_attempts() {
    let calls = Arc::new(AtomicU32::new(0));
    let cancel = CancellationToken::new();
    let calls_clone = calls.clone();

    let outcome = run_with_retry(&fast_policy(3), None, &cancel, || {
        let calls = calls_clone.clone();
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            StepOutcome::failure("nope", Duration::ZERO, true)
        }
    })
    .await;

    assert!(!outcome.ok);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn non_retryable_failure_stops_immediately() {
    let calls = Arc::new(AtomicU32::new(0));
    let cancel = CancellationToken::new();
    let calls_clone = calls.clone();

    let outcome = run_with_retry(&fast_policy(5), None, &cancel, || {
        let calls = calls_clone.clone();
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            StepOutcome::failure("fatal", Duration::ZERO, false)
        }
    })
    .await;

    assert!(!outcome.ok);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn slow_attempt_is_treated_as_a_retryable_timeout() {
    let cancel = CancellationToken::new();

    let outcome = run_with_retry(&fast_policy(1), Some(Duration::from_millis(5)), &cancel, || async {
        tokio::time::sleep(Duration::from_secs(10)).await;
        StepOutcome::success("too slow", Duration::ZERO)
    })
    .await;

    assert!(!outcome.ok);
    assert!(outcome.retryable);
}

#[tokio::test]
async fn cancellation_short_circuits_further_attempts() {
    let calls = Arc::new(AtomicU32::new(0));
    let cancel = CancellationToken::new();
    cancel.cancel();
    let calls_clone = calls.clone();

    let outcome = run_with_retry(&fast_policy(3), None, &cancel, || {
        let calls = calls_clone.clone();
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            StepOutcome::failure("nope", Duration::ZERO, true)
        }
    })
    .await;

    assert!(!outcome.ok);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}
