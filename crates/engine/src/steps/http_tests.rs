// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use cronplus_adapters::{FakeHttpAdapter, HttpResponse};
use cronplus_config::{HttpAuth, SendFileMode};
use cronplus_core::TaskId;
use std::collections::HashMap;
use std::path::PathBuf;

fn ctx() -> ExecutionContext {
    ExecutionContext::new(TaskId::new("t1"), PathBuf::from("/in/report.pdf"), &[], 0).unwrap()
}

fn base_step() -> HttpStep {
    HttpStep {
        method: HttpMethod::Post,
        url: "https://example.invalid/upload".to_string(),
        headers: HashMap::new(),
        body: Some("hello".to_string()),
        send_file_mode: SendFileMode::None,
        form_field_name: None,
        auth: HttpAuth::None,
        auth_token: None,
        timeout_seconds: 30,
        max_redirects: 5,
        validate_tls: true,
        response_variable: None,
        status_variable: None,
        fail_on_non_success: true,
    }
}

fn ok_response() -> HttpResponse {
    HttpResponse { status: 200, headers: Vec::new(), body: b"done".to_vec(), location: None }
}

#[tokio::test]
async fn successful_response_captures_status_and_body_variables() {
    let adapter = FakeHttpAdapter::new();
    adapter.push_response(ok_response());
    let mut step = base_step();
    step.response_variable = Some("resp".to_string());
    step.status_variable = Some("code".to_string());

    let outcome = execute(&step, &ctx(), &adapter).await;

    assert!(outcome.ok, "{}", outcome.message);
    assert_eq!(outcome.outputs.get("resp").unwrap(), "done");
    assert_eq!(outcome.outputs.get("code").unwrap(), &serde_json::Value::from(200));
}

#[tokio::test]
async fn non_success_status_fails_when_fail_on_non_success_is_set() {
    let adapter = FakeHttpAdapter::new();
    adapter.push_response(HttpResponse { status: 404, headers: Vec::new(), body: Vec::new(), location: None });

    let outcome = execute(&base_step(), &ctx(), &adapter).await;

    assert!(!outcome.ok);
}

#[tokio::test]
async fn transient_status_on_idempotent_method_is_retryable() {
    let adapter = FakeHttpAdapter::new();
    adapter.push_response(HttpResponse { status: 503, headers: Vec::new(), body: Vec::new(), location: None });
    let mut step = base_step();
    step.method = HttpMethod::Get;

    let outcome = execute(&step, &ctx(), &adapter).await;

    assert!(!outcome.ok);
    assert!(outcome.retryable);
}

#[tokio::test]
async fn transient_status_on_post_is_retryable() {
    // spec §4.3: the transient status set is retryable regardless of method.
    let adapter = FakeHttpAdapter::new();
    adapter.push_response(HttpResponse { status: 503, headers: Vec::new(), body: Vec::new(), location: None });
    let step = base_step();
    assert_eq!(step.method, HttpMethod::Post);

    let outcome = execute(&step, &ctx(), &adapter).await;

    assert!(!outcome.ok);
    assert!(outcome.retryable);
}

#[tokio::test]
async fn non_transient_status_on_post_is_not_retryable() {
    let adapter = FakeHttpAdapter::new();
    adapter.push_response(HttpResponse { status: 404, headers: Vec::new(), body: Vec::new(), location: None });
    let step = base_step();

    let outcome = execute(&step, &ctx(), &adapter).await;

    assert!(!outcome.ok);
    assert!(!outcome.retryable);
}

#[tokio::test]
async fn redirect_is_followed_up_to_max_redirects() {
    let adapter = FakeHttpAdapter::new();
    adapter.push_response(HttpResponse {
        status: 302,
        headers: Vec::new(),
        body: Vec::new(),
        location: Some("https://example.invalid/final".to_string()),
    });
    adapter.push_response(ok_response());

    let outcome = execute(&base_step(), &ctx(), &adapter).await;

    assert!(outcome.ok, "{}", outcome.message);
    let requests = adapter.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].url, "https://example.invalid/final");
}

#[tokio::test]
async fn bearer_auth_sets_authorization_header() {
    let adapter = FakeHttpAdapter::new();
    adapter.push_response(ok_response());
    let mut step = base_step();
    step.auth = HttpAuth::Bearer;
    step.auth_token = Some("secret-token".to_string());

    execute(&step, &ctx(), &adapter).await;

    let requests = adapter.requests();
    let auth_header = requests[0].headers.iter().find(|(k, _)| k == "Authorization").unwrap();
    assert_eq!(auth_header.1, "Bearer secret-token");
}
