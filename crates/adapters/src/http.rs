// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP transport (spec §4.3 `http` step). Performs exactly one request per
//! call and never follows redirects itself — the engine's http step
//! executor owns the manual redirect loop so it can decide, per hop,
//! whether to re-send auth headers.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: reqwest::Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
    pub timeout: Duration,
    pub validate_tls: bool,
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    /// Present only on 3xx responses, resolved against the request URL.
    pub location: Option<String>,
}

#[derive(Debug, Error)]
pub enum HttpAdapterError {
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout { url: String, timeout_secs: u64 },
    #[error("request to {url} failed: {source}")]
    Transport { url: String, #[source] source: reqwest::Error },
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(reqwest::Error),
}

#[async_trait]
pub trait HttpAdapter: Send + Sync + 'static {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpAdapterError>;
}

/// Real transport backed by `reqwest`, with automatic redirect-following
/// disabled unconditionally.
#[derive(Clone, Default)]
pub struct ReqwestHttpAdapter;

#[async_trait]
impl HttpAdapter for ReqwestHttpAdapter {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpAdapterError> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .danger_accept_invalid_certs(!request.validate_tls)
            .timeout(request.timeout)
            .build()
            .map_err(HttpAdapterError::ClientBuild)?;

        let mut builder = client.request(request.method.clone(), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body.clone() {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|source| {
            if source.is_timeout() {
                HttpAdapterError::Timeout { url: request.url.clone(), timeout_secs: request.timeout.as_secs() }
            } else {
                HttpAdapterError::Transport { url: request.url.clone(), source }
            }
        })?;

        let status = response.status().as_u16();
        let location = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.to_string(), v.to_string())))
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|source| HttpAdapterError::Transport { url: request.url.clone(), source })?
            .to_vec();

        Ok(HttpResponse { status, headers, body, location })
    }
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    pub struct FakeHttpAdapter {
        responses: Arc<Mutex<VecDeque<Result<HttpResponse, HttpAdapterError>>>>,
        requests: Arc<Mutex<Vec<HttpRequest>>>,
    }

    impl FakeHttpAdapter {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn push_response(&self, response: HttpResponse) {
            self.responses.lock().push_back(Ok(response));
        }

        pub fn requests(&self) -> Vec<HttpRequest> {
            self.requests.lock().clone()
        }
    }

    #[async_trait]
    impl HttpAdapter for FakeHttpAdapter {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpAdapterError> {
            self.requests.lock().push(request.clone());
            self.responses.lock().pop_front().unwrap_or(Ok(HttpResponse {
                status: 200,
                headers: Vec::new(),
                body: Vec::new(),
                location: None,
            }))
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeHttpAdapter;

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
