//! HTTP transport seam.
//!
//! The pipeline only needs "send this, tell me status + body or why nothing
//! came back". `Transport` is that contract; `ReqwestTransport` is the real
//! implementation and tests substitute scripted mocks.

use std::time::Duration;

use reqwest::Method;
use reqwest::header::HeaderValue;
use serde_json::Value;

/// Fully resolved request, after credential attachment.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl OutgoingRequest {
    /// First header value matching `name`, case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Status plus decoded body. A body that is not JSON is kept as a string,
/// an empty body is `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Option<Value>,
}

impl RawResponse {
    #[must_use]
    pub fn new(status: u16, body: Option<Value>) -> Self {
        Self { status, body }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Why no status came back.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The request went out but nothing usable came back.
    #[error("no response: {0}")]
    NoResponse(String),
    /// The request could not be built, so it was never sent.
    #[error("{0}")]
    Config(String),
}

/// Async send contract. Object safe so the pipeline can hold `Arc<dyn Transport>`.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Send one request.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when no HTTP status was obtained. Non-2xx
    /// statuses are not errors at this layer.
    async fn send(&self, request: OutgoingRequest) -> Result<RawResponse, TransportError>;
}

// =============================================================================
// REQWEST
// =============================================================================

pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a client whose every request is capped at `timeout`.
    ///
    /// # Errors
    ///
    /// Returns the reqwest error when the TLS backend cannot be initialized.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: OutgoingRequest) -> Result<RawResponse, TransportError> {
        let url = reqwest::Url::parse(&request.url)
            .map_err(|e| TransportError::Config(format!("invalid URL {:?}: {e}", request.url)))?;

        let mut builder = self.http.request(request.method, url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            let value = HeaderValue::from_str(value)
                .map_err(|e| TransportError::Config(format!("invalid {name} header: {e}")))?;
            builder = builder.header(name.as_str(), value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(classify_send_error)?;
        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| TransportError::NoResponse(e.to_string()))?;

        Ok(RawResponse { status, body: decode_body(&bytes) })
    }
}

fn classify_send_error(err: reqwest::Error) -> TransportError {
    if err.is_builder() {
        TransportError::Config(err.to_string())
    } else {
        TransportError::NoResponse(err.to_string())
    }
}

pub(crate) fn decode_body(bytes: &[u8]) -> Option<Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    Some(
        serde_json::from_slice(bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned())),
    )
}

#[cfg(test)]
#[path = "transport_test.rs"]
mod tests;
