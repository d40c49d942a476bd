//! Credential attachment and response normalization for every API call.
//!
//! ARCHITECTURE
//! ============
//! `send` runs three stages: outgoing interception (attach the stored token),
//! transport, and incoming interception. Incoming interception is split into
//! pure classifiers (`normalize_success`, `classify_status`,
//! `classify_transport`) and one side-effect step (`reject`) that notifies the
//! user and, for 401, clears the session and routes to login.
//!
//! TRADE-OFFS
//! ==========
//! The backend may report business failures inside a 200 envelope, so 2xx
//! bodies are inspected too. A `success: false` body is a rejection even though
//! the transport succeeded.

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;

use std::sync::Arc;

use serde_json::{Map, Value};
use uuid::Uuid;

use super::error::{
    MSG_NETWORK_ERROR, MSG_REQUEST_CONFIG, MSG_REQUEST_FAILED, MSG_SESSION_EXPIRED, RequestError, status_message,
};
use super::request::ApiRequest;
use super::transport::{OutgoingRequest, RawResponse, ReqwestTransport, Transport, TransportError};
use crate::config::ClientConfig;
use crate::notify::Notifier;
use crate::router::Navigator;
use crate::routes::LOGIN_PATH;
use crate::session::SessionStore;

pub const AUTHORIZATION_HEADER: &str = "Authorization";

/// HTTP client wrapper shared by all endpoint wrappers. Cheap to clone.
#[derive(Clone)]
pub struct Pipeline {
    base_url: String,
    login_path: String,
    transport: Arc<dyn Transport>,
    session: SessionStore,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("base_url", &self.base_url)
            .field("login_path", &self.login_path)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        transport: Arc<dyn Transport>,
        session: SessionStore,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self { base_url, login_path: LOGIN_PATH.to_owned(), transport, session, notifier, navigator }
    }

    /// Pipeline over a `ReqwestTransport` honoring the configured base URL and timeout.
    ///
    /// # Errors
    ///
    /// Returns the reqwest error when the HTTP client cannot be constructed.
    pub fn from_config(
        config: &ClientConfig,
        session: SessionStore,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, reqwest::Error> {
        let transport = ReqwestTransport::new(config.request_timeout)?;
        Ok(Self::new(config.base_url.clone(), Arc::new(transport), session, notifier, navigator))
    }

    /// Route pushed on authentication expiry. Defaults to `/login`.
    #[must_use]
    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    #[must_use]
    pub fn navigator(&self) -> &dyn Navigator {
        self.navigator.as_ref()
    }

    #[must_use]
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        if self.base_url.is_empty() {
            return path.to_owned();
        }
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    /// Outgoing interception: resolve the URL and attach the stored token, if any.
    #[must_use]
    pub fn prepare(&self, request: ApiRequest) -> OutgoingRequest {
        let mut headers = Vec::new();
        if let Some(token) = self.session.token() {
            headers.push((AUTHORIZATION_HEADER.to_owned(), token));
        }
        OutgoingRequest {
            url: self.url_for(&request.path),
            method: request.method,
            query: request.query,
            headers,
            body: request.body,
        }
    }

    /// Send one call and normalize the outcome.
    ///
    /// # Errors
    ///
    /// Returns a classified [`RequestError`]; the user has already been
    /// notified with its message.
    pub async fn send(&self, request: ApiRequest) -> Result<Value, RequestError> {
        let request_id = Uuid::new_v4();
        let outgoing = self.prepare(request);
        tracing::debug!(
            %request_id,
            method = %outgoing.method,
            url = %outgoing.url,
            authenticated = outgoing.header(AUTHORIZATION_HEADER).is_some(),
            "request start"
        );

        let outcome = match self.transport.send(outgoing).await {
            Ok(RawResponse { status, body }) if (200..300).contains(&status) => {
                tracing::debug!(%request_id, status, "request complete");
                normalize_success(body)
            }
            Ok(RawResponse { status, body }) => Err(classify_status(status, body.as_ref())),
            Err(e) => Err(classify_transport(e)),
        };

        outcome.map_err(|err| self.reject(request_id, err))
    }

    /// Side effects shared by every failure: one notification, plus session
    /// teardown and a login redirect for `AuthExpired`.
    fn reject(&self, request_id: Uuid, err: RequestError) -> RequestError {
        tracing::warn!(%request_id, kind = %err.kind(), status = ?err.status(), message = %err, "request failed");
        if let RequestError::AuthExpired { .. } = err {
            self.session.clear_session();
            tracing::info!(%request_id, login_path = %self.login_path, "session expired; redirecting to login");
            self.notifier.notify_error(err.message());
            self.navigator.push(&self.login_path);
        } else {
            self.notifier.notify_error(err.message());
        }
        err
    }
}

// =============================================================================
// CLASSIFIERS
// =============================================================================

/// Success interception for 2xx bodies.
///
/// # Errors
///
/// Returns [`RequestError::ValidationEnvelope`] for an object carrying
/// `success: false`.
pub fn normalize_success(body: Option<Value>) -> Result<Value, RequestError> {
    match body {
        None => Ok(Value::Null),
        Some(Value::Object(map)) if map.get("success") == Some(&Value::Bool(false)) => {
            let message = envelope_message(&map).unwrap_or_else(|| MSG_REQUEST_FAILED.to_owned());
            Err(RequestError::ValidationEnvelope { message })
        }
        Some(value) => Ok(value),
    }
}

/// Failure interception for non-2xx statuses. 401 wins over any body.
#[must_use]
pub fn classify_status(status: u16, body: Option<&Value>) -> RequestError {
    if status == 401 {
        return RequestError::AuthExpired { message: MSG_SESSION_EXPIRED.to_owned() };
    }
    let message = match body {
        Some(Value::Object(map)) => envelope_message(map).unwrap_or_else(|| status_message(status)),
        Some(Value::String(text)) if !text.is_empty() => text.clone(),
        _ => status_message(status),
    };
    RequestError::HttpStatus { status, message }
}

/// Failure interception when no status was obtained.
#[must_use]
pub fn classify_transport(err: TransportError) -> RequestError {
    match err {
        TransportError::NoResponse(_) => RequestError::Network { message: MSG_NETWORK_ERROR.to_owned() },
        TransportError::Config(detail) if detail.trim().is_empty() => {
            RequestError::RequestConfig { message: MSG_REQUEST_CONFIG.to_owned() }
        }
        TransportError::Config(detail) => RequestError::RequestConfig { message: detail },
    }
}

/// `msg`, falling back to `message`; empty strings count as missing.
fn envelope_message(map: &Map<String, Value>) -> Option<String> {
    ["msg", "message"]
        .iter()
        .filter_map(|key| map.get(*key).and_then(Value::as_str))
        .find(|text| !text.is_empty())
        .map(ToOwned::to_owned)
}
