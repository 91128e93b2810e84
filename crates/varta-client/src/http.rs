use std::sync::Arc;
use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::{Method, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use varta_core::{best_message, ApiEnvelope, REQUEST_TIMEOUT_SECONDS};
use varta_store::KvStore;

use crate::tokens::TokenResolver;

/// HTTP client for the platform API. Every call resolves to exactly one
/// [`ApiEnvelope`]; timeouts, connection failures, and malformed bodies are
/// normalized, never surfaced as errors. Retries are the caller's concern.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    resolver: TokenResolver,
    timeout: Duration,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, store: Arc<dyn KvStore>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            resolver: TokenResolver::new(store),
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECONDS),
        })
    }

    /// Overrides the request timeout. Production callers keep the default.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get(&self, path: &str, needs_auth: bool) -> ApiEnvelope {
        self.send(Method::GET, path, None, needs_auth).await
    }

    pub async fn post(&self, path: &str, body: Option<Value>, needs_auth: bool) -> ApiEnvelope {
        self.send(Method::POST, path, body, needs_auth).await
    }

    pub async fn put(&self, path: &str, body: Option<Value>, needs_auth: bool) -> ApiEnvelope {
        self.send(Method::PUT, path, body, needs_auth).await
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        payload: Option<Value>,
        needs_auth: bool,
    ) -> ApiEnvelope {
        let bearer = if needs_auth {
            match self.resolver.resolve_access_token().await {
                Some(token) => Some(token),
                None => {
                    debug!(path = %path, "no access credential; skipping request");
                    return ApiEnvelope::login_required();
                }
            }
        } else {
            None
        };

        let url = join_url(&self.base_url, path);
        let mut builder = self
            .http
            .request(method.clone(), &url)
            .header(ACCEPT, "application/json")
            .timeout(self.timeout);
        if let Some(token) = bearer.as_deref() {
            builder = builder.bearer_auth(token);
        }
        if let Some(payload) = payload {
            builder = builder.json(&payload);
        }

        debug!(method = %method, url = %url, "http request");
        let start = std::time::Instant::now();
        let response = match builder.send().await {
            Ok(response) => response,
            Err(err) if err.is_timeout() => {
                warn!(method = %method, url = %url, "http request timed out");
                return ApiEnvelope::timed_out();
            }
            Err(err) => {
                warn!(method = %method, url = %url, "http request failed: {err}");
                return ApiEnvelope::network_failure(err);
            }
        };
        debug!(
            method = %method,
            url = %url,
            status = %response.status(),
            elapsed_ms = start.elapsed().as_millis(),
            "http response"
        );
        normalize(response).await
    }
}

/// Collapses a server response into the envelope contract. The body is read
/// once as text so a non-JSON payload is never lost.
async fn normalize(response: reqwest::Response) -> ApiEnvelope {
    let status = response.status();
    let status_code = status.as_u16();
    let text = match response.text().await {
        Ok(text) => text,
        Err(err) if err.is_timeout() => return ApiEnvelope::timed_out(),
        Err(err) => return ApiEnvelope::network_failure(err),
    };

    let body: Value = match serde_json::from_str(&text) {
        Ok(body) => body,
        Err(_) => {
            let message = if text.trim().is_empty() {
                status_line(status)
            } else {
                text
            };
            if !status.is_success() {
                warn!(status = status_code, "non-JSON error body");
            }
            return ApiEnvelope::from_text(status_code, status.is_success(), message);
        }
    };

    match status_code {
        401 => ApiEnvelope::unauthorized(best_message(&body)),
        502 => {
            warn!("upstream gateway unavailable");
            ApiEnvelope::upstream_unavailable()
        }
        _ if !status.is_success() => {
            let message = best_message(&body).unwrap_or_else(|| status_line(status));
            ApiEnvelope::failure_with_data(status_code, message, body)
        }
        _ => ApiEnvelope::ok(status_code, body),
    }
}

fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
