// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `http` step (spec §4.3): build a request, substitute variables, stream
//! or attach the trigger file per `sendFileMode`, follow redirects manually
//! up to `maxRedirects`, and retry the transient status set and network
//! errors unconditionally, plus any other non-success status on an
//! idempotent method.

use crate::context::ExecutionContext;
use crate::step_result::StepOutcome;
use base64::Engine;
use cronplus_adapters::{HttpAdapter, HttpAdapterError, HttpRequest};
use cronplus_config::{HttpAuth, HttpMethod, HttpStep, SendFileMode};
use serde_json::Value;
use std::time::{Duration, Instant};

/// Statuses that are retryable regardless of method (spec §4.3: retry
/// applies "to idempotent methods and to the transient set ... and network
/// errors" — the transient set and network errors retry unconditionally;
/// any other non-success status retries only on an idempotent method).
const TRANSIENT_STATUSES: [u16; 6] = [408, 429, 500, 502, 503, 504];

pub async fn execute(step: &HttpStep, ctx: &ExecutionContext, adapter: &dyn HttpAdapter) -> StepOutcome {
    let started = Instant::now();
    let method = to_reqwest_method(step.method);
    let mut url = step.url.clone();
    let mut redirects = 0u32;

    loop {
        let request = match build_request(step, ctx, &method, &url) {
            Ok(request) => request,
            Err(message) => return StepOutcome::failure(message, started.elapsed(), false),
        };

        let response = match adapter.send(request).await {
            Ok(response) => response,
            Err(HttpAdapterError::Timeout { .. }) => {
                return StepOutcome::failure("request timed out".to_string(), started.elapsed(), true)
            }
            // spec §4.3: retry applies to the transient set "and network
            // errors" — unconditionally, same as a transient status.
            Err(error) => return StepOutcome::failure(error.to_string(), started.elapsed(), true),
        };

        if (300..400).contains(&response.status) {
            if redirects >= step.max_redirects {
                return StepOutcome::failure(format!("exceeded maxRedirects ({})", step.max_redirects), started.elapsed(), false);
            }
            if let Some(location) = &response.location {
                url = location.clone();
                redirects += 1;
                continue;
            }
            return StepOutcome::failure("redirect response missing Location header".to_string(), started.elapsed(), false);
        }

        let retryable = TRANSIENT_STATUSES.contains(&response.status) || is_retryable_transport(&method);
        if step.fail_on_non_success && !(200..300).contains(&response.status) {
            return StepOutcome::failure(format!("received status {}", response.status), started.elapsed(), retryable);
        }

        let mut outputs = std::collections::HashMap::new();
        if let Some(name) = &step.response_variable {
            outputs.insert(name.clone(), Value::String(String::from_utf8_lossy(&response.body).to_string()));
        }
        if let Some(name) = &step.status_variable {
            outputs.insert(name.clone(), Value::from(response.status));
        }
        return StepOutcome::success_with_outputs(format!("received status {}", response.status), started.elapsed(), outputs);
    }
}

fn is_retryable_transport(method: &reqwest::Method) -> bool {
    matches!(*method, reqwest::Method::GET | reqwest::Method::HEAD | reqwest::Method::PUT | reqwest::Method::DELETE)
}

fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Delete => reqwest::Method::DELETE,
        HttpMethod::Head => reqwest::Method::HEAD,
    }
}

fn build_request(step: &HttpStep, ctx: &ExecutionContext, method: &reqwest::Method, url: &str) -> Result<HttpRequest, String> {
    let mut headers: Vec<(String, String)> = step.headers.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
    apply_auth(step, &mut headers)?;

    let body = match step.send_file_mode {
        SendFileMode::None => step.body.clone().map(|b| b.into_bytes()),
        SendFileMode::Raw => Some(read_file(&ctx.file_path)?),
        SendFileMode::Multipart => {
            let field_name = step.form_field_name.clone().unwrap_or_else(|| "file".to_string());
            let boundary = "cronplus-boundary";
            headers.push(("Content-Type".to_string(), format!("multipart/form-data; boundary={boundary}")));
            Some(build_multipart_body(boundary, &field_name, &ctx.file_path)?)
        }
    };

    Ok(HttpRequest {
        method: method.clone(),
        url: url.to_string(),
        headers,
        body,
        timeout: Duration::from_secs(step.timeout_seconds as u64),
        validate_tls: step.validate_tls,
    })
}

fn read_file(path: &std::path::Path) -> Result<Vec<u8>, String> {
    std::fs::read(path).map_err(|e| format!("failed to read attachment {path:?}: {e}"))
}

fn build_multipart_body(boundary: &str, field_name: &str, path: &std::path::Path) -> Result<Vec<u8>, String> {
    let content = read_file(path)?;
    let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("file");
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{field_name}\"; filename=\"{file_name}\"\r\n\r\n").as_bytes(),
    );
    body.extend_from_slice(&content);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    Ok(body)
}

fn apply_auth(step: &HttpStep, headers: &mut Vec<(String, String)>) -> Result<(), String> {
    match step.auth {
        HttpAuth::None => {}
        HttpAuth::Bearer => {
            let token = step.auth_token.clone().ok_or_else(|| "bearer auth requires authToken".to_string())?;
            headers.push(("Authorization".to_string(), format!("Bearer {token}")));
        }
        HttpAuth::Basic => {
            let token = step.auth_token.clone().ok_or_else(|| "basic auth requires authToken".to_string())?;
            let encoded = base64::engine::general_purpose::STANDARD.encode(token.as_bytes());
            headers.push(("Authorization".to_string(), format!("Basic {encoded}")));
        }
        HttpAuth::ApiKey => {
            let token = step.auth_token.clone().ok_or_else(|| "apiKey auth requires authToken".to_string())?;
            headers.push(("X-Api-Key".to_string(), token));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
