// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use cronplus_adapters::{FakeHttpAdapter, FakePrinterAdapter};
use cronplus_conditions::{Condition, DecisionAction, FieldValue, Logic, Operator};
use cronplus_config::{
    BranchAction, ConditionGate, CopyStep, DecisionRule, DecisionStep, DeleteStep, HttpAuth, HttpMethod, HttpStep,
    RetryPolicy, SendFileMode, Step, StepKind,
};
use cronplus_core::TaskId;
use std::collections::HashMap;
use tempfile::tempdir;

fn plain_step(name: &str, kind: StepKind) -> Step {
    Step { name: Some(name.to_string()), enabled: true, timeout_seconds: None, retry: None, condition: None, kind }
}

fn copy_kind(destination: String) -> StepKind {
    StepKind::Copy(CopyStep {
        destination,
        overwrite: false,
        create_directories: false,
        preserve_timestamps: false,
        verify_checksum: false,
        atomic_move: false,
        rename_pattern: None,
    })
}

fn adapters() -> (FakePrinterAdapter, FakeHttpAdapter) {
    (FakePrinterAdapter::new(), FakeHttpAdapter::new())
}

#[tokio::test]
async fn a_successful_two_step_pipeline_completes_and_records_a_log_entry_per_step() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("in.txt");
    std::fs::write(&source, b"hello").unwrap();
    let destination = dir.path().join("out.txt");

    let pipeline = vec![plain_step("copy-it", copy_kind(destination.display().to_string()))];
    let mut ctx = ExecutionContext::new(TaskId::new("t1"), source, &[], 0).unwrap();
    let cancel = CancellationToken::new();
    let (printer, http) = adapters();
    let step_adapters = StepAdapters { printer: &printer, http: &http };

    let result = run(&pipeline, &mut ctx, &cancel, &step_adapters).await;

    assert!(result.ok, "{:?}", result.error);
    assert_eq!(result.log.len(), 1);
    assert!(destination.exists());
}

#[tokio::test]
async fn a_failing_step_without_retry_stops_the_pipeline_and_names_the_failing_step() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("in.txt");
    std::fs::write(&source, b"hello").unwrap();
    let destination = dir.path().join("out.txt");
    std::fs::write(&destination, b"already there").unwrap();

    let mut first = plain_step("copy-it", copy_kind(destination.display().to_string()));
    if let StepKind::Copy(s) = &mut first.kind {
        s.overwrite = false;
    }
    let second = plain_step("unreached", copy_kind(dir.path().join("never.txt").display().to_string()));
    let pipeline = vec![first, second];
    let mut ctx = ExecutionContext::new(TaskId::new("t1"), source, &[], 0).unwrap();
    let cancel = CancellationToken::new();
    let (printer, http) = adapters();
    let step_adapters = StepAdapters { printer: &printer, http: &http };

    let result = run(&pipeline, &mut ctx, &cancel, &step_adapters).await;

    assert!(!result.ok);
    assert_eq!(result.failing_step.as_deref(), Some("copy-it"));
}

#[tokio::test]
async fn disabled_step_is_skipped_entirely() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("in.txt");
    std::fs::write(&source, b"hello").unwrap();
    let destination = dir.path().join("out.txt");

    let mut disabled = plain_step("skip-me", copy_kind(destination.display().to_string()));
    disabled.enabled = false;
    let pipeline = vec![disabled];
    let mut ctx = ExecutionContext::new(TaskId::new("t1"), source, &[], 0).unwrap();
    let cancel = CancellationToken::new();
    let (printer, http) = adapters();
    let step_adapters = StepAdapters { printer: &printer, http: &http };

    let result = run(&pipeline, &mut ctx, &cancel, &step_adapters).await;

    assert!(result.ok);
    assert!(result.log.is_empty());
    assert!(!destination.exists());
}

#[tokio::test]
async fn condition_gate_fail_action_ends_the_pipeline_in_failure() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("in.pdf");
    std::fs::write(&source, b"hello").unwrap();
    let destination = dir.path().join("out.pdf");

    let mut gated = plain_step("gated-copy", copy_kind(destination.display().to_string()));
    gated.condition = Some(ConditionGate {
        conditions: vec![Condition {
            field: "fileExt".to_string(),
            operator: Operator::Equals,
            value: Some(FieldValue::String("txt".to_string())),
            value_high: None,
        }],
        logic: Logic::And,
        on_true: BranchAction::Continue,
        on_false: BranchAction::Fail,
    });
    let pipeline = vec![gated];
    let mut ctx = ExecutionContext::new(TaskId::new("t1"), source, &[], 0).unwrap();
    let cancel = CancellationToken::new();
    let (printer, http) = adapters();
    let step_adapters = StepAdapters { printer: &printer, http: &http };

    let result = run(&pipeline, &mut ctx, &cancel, &step_adapters).await;

    assert!(!result.ok);
    assert!(!destination.exists());
}

#[tokio::test]
async fn decision_jump_skips_the_intervening_step() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("in.txt");
    std::fs::write(&source, b"hello").unwrap();
    let skip_destination = dir.path().join("skipped.txt");
    let final_destination = dir.path().join("final.txt");

    let decision = plain_step(
        "router",
        StepKind::Decision(DecisionStep {
            rules: vec![DecisionRule {
                conditions: Vec::new(),
                logic: Logic::And,
                action: DecisionAction::Jump { jump_target: "final".to_string() },
                set_variable: None,
            }],
            default_action: DecisionAction::Continue,
        }),
    );
    let skipped = plain_step("should-skip", copy_kind(skip_destination.display().to_string()));
    let finale = plain_step("final", copy_kind(final_destination.display().to_string()));
    let pipeline = vec![decision, skipped, finale];
    let mut ctx = ExecutionContext::new(TaskId::new("t1"), source, &[], 0).unwrap();
    let cancel = CancellationToken::new();
    let (printer, http) = adapters();
    let step_adapters = StepAdapters { printer: &printer, http: &http };

    let result = run(&pipeline, &mut ctx, &cancel, &step_adapters).await;

    assert!(result.ok, "{:?}", result.error);
    assert!(!skip_destination.exists());
    assert!(final_destination.exists());
}

#[tokio::test]
async fn retry_policy_lets_a_transient_failure_eventually_succeed() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("in.txt");
    std::fs::write(&source, b"hello").unwrap();

    // delete's minAgeMinutes fails retryably every attempt since the file's
    // age never changes inside the test; max_attempts bounds the retries.
    let mut step = plain_step(
        "too-young",
        StepKind::Delete(DeleteStep { secure: false, min_age_minutes: Some(60), pattern: None }),
    );
    step.retry = Some(RetryPolicy { max_attempts: 2, backoff_ms: 1, backoff_type: cronplus_config::BackoffType::Constant, multiplier: 1.0, max_backoff_ms: None });
    let pipeline = vec![step];
    let mut ctx = ExecutionContext::new(TaskId::new("t1"), source, &[], 0).unwrap();
    let cancel = CancellationToken::new();
    let (printer, http) = adapters();
    let step_adapters = StepAdapters { printer: &printer, http: &http };

    let result = run(&pipeline, &mut ctx, &cancel, &step_adapters).await;

    assert!(!result.ok);
    assert_eq!(result.failing_step.as_deref(), Some("too-young"));
}

#[tokio::test]
async fn output_variables_from_one_step_are_visible_to_a_later_http_step() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("in.txt");
    std::fs::write(&source, b"hello").unwrap();
    let destination = dir.path().join("out.txt");

    let copy = plain_step("copy-it", copy_kind(destination.display().to_string()));
    let http_step = plain_step(
        "report",
        StepKind::Http(HttpStep {
            method: HttpMethod::Post,
            url: "https://example.invalid/notify?path=${destinationPath}".to_string(),
            headers: HashMap::new(),
            body: None,
            send_file_mode: SendFileMode::None,
            form_field_name: None,
            auth: HttpAuth::None,
            auth_token: None,
            timeout_seconds: 5,
            max_redirects: 0,
            validate_tls: true,
            response_variable: None,
            status_variable: None,
            fail_on_non_success: true,
        }),
    );
    let pipeline = vec![copy, http_step];
    let mut ctx = ExecutionContext::new(TaskId::new("t1"), source, &[], 0).unwrap();
    let cancel = CancellationToken::new();
    let (printer, http) = adapters();
    http.push_response(cronplus_adapters::HttpResponse { status: 200, headers: Vec::new(), body: Vec::new(), location: None });
    let step_adapters = StepAdapters { printer: &printer, http: &http };

    let result = run(&pipeline, &mut ctx, &cancel, &step_adapters).await;

    assert!(result.ok, "{:?}", result.error);
    let requests = http.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].url.contains(&destination.display().to_string()));
}
