//! The I/O boundary: something that can execute an `HttpRequest`.
//!
//! # Design
//! `PushClient` never touches the network itself. It hands a fully built
//! `HttpRequest` to a `Transport` and gets back either an `HttpResponse`
//! (any status, including 4xx/5xx) or a `TransportError` when no response
//! arrived. Bring your own HTTP stack by implementing the trait; `UreqTransport`
//! is the stock implementation.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Response bodies beyond this size are dropped; the status is still kept.
pub const MAX_BODY_BYTES: u64 = 16 * 1024 * 1024;

#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute `request`. Non-2xx statuses must be returned as `Ok`.
    async fn perform(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Blocking `ureq` agent driven from Tokio's blocking pool.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl UreqTransport {
    pub fn new() -> Self {
        Self::with_timeout(None)
    }

    /// `timeout` bounds the whole call, connect through body read.
    /// Redirects are never followed: a 3xx is the service's answer.
    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .max_redirects(0)
            .timeout_global(timeout)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for UreqTransport {
    async fn perform(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let agent = self.agent.clone();
        tokio::task::spawn_blocking(move || execute(&agent, request))
            .await
            .map_err(|e| TransportError::new(format!("request task failed: {e}")))?
    }
}

fn with_headers<B>(mut builder: ureq::RequestBuilder<B>, headers: &[(String, String)]) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

/// Run `request` on `agent`, turning every status into data.
fn execute(agent: &ureq::Agent, request: HttpRequest) -> Result<HttpResponse, TransportError> {
    let HttpRequest {
        method,
        url,
        headers,
        body,
    } = request;

    let result = match (method, body) {
        (HttpMethod::Get, None) => with_headers(agent.get(&url), &headers).call(),
        (HttpMethod::Get, Some(body)) => {
            with_headers(agent.get(&url).force_send_body(), &headers).send(body.as_bytes())
        }
        (HttpMethod::Delete, None) => with_headers(agent.delete(&url), &headers).call(),
        (HttpMethod::Delete, Some(body)) => {
            with_headers(agent.delete(&url).force_send_body(), &headers).send(body.as_bytes())
        }
        (HttpMethod::Post, Some(body)) => with_headers(agent.post(&url), &headers).send(body.as_bytes()),
        (HttpMethod::Post, None) => with_headers(agent.post(&url), &headers).send_empty(),
        (HttpMethod::Put, Some(body)) => with_headers(agent.put(&url), &headers).send(body.as_bytes()),
        (HttpMethod::Put, None) => with_headers(agent.put(&url), &headers).send_empty(),
    };
    let mut response = result.map_err(|e| TransportError::new(e.to_string()))?;

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| Some((name.as_str().to_string(), value.to_str().ok()?.to_string())))
        .collect();
    let body = match response.body_mut().with_config().limit(MAX_BODY_BYTES).read_to_vec() {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(error) => {
            debug!(status, %url, %error, "dropping unreadable response body");
            String::new()
        }
    };

    Ok(HttpResponse { status, headers, body })
}
