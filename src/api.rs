//! Auth endpoint wrappers: the calls that create and end a session.
//!
//! ERROR HANDLING
//! ==============
//! Transport and envelope failures arrive already classified (and already
//! shown to the user) as `RequestError`. A 2xx envelope that lacks the token
//! is reported separately as `MalformedResponse`.

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::http::{ApiRequest, Pipeline, RequestError};
use crate::session::UserProfile;

pub const LOGIN_ENDPOINT: &str = "/api/auth/login";
pub const REGISTER_ENDPOINT: &str = "/api/auth/register";
/// Role assigned when the server omits one.
pub const DEFAULT_ROLE: &str = "user";

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("malformed auth response: {0}")]
    MalformedResponse(String),

    #[error("request body encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self { username: username.into(), password: password.into() }
    }
}

/// Self-registration payload. The server may ignore `role` for self sign-up.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skills: Vec<String>,
}

/// `data` of a successful login/register envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionGrant {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    login_id: Option<Value>,
    #[serde(default)]
    role: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// Sign in and store the resulting session.
///
/// # Errors
///
/// [`AuthError::Request`] for any pipeline rejection,
/// [`AuthError::MalformedResponse`] when no token comes back.
pub async fn login(pipeline: &Pipeline, credentials: &Credentials) -> Result<UserProfile, AuthError> {
    let request = ApiRequest::post(LOGIN_ENDPOINT).with_json(credentials)?;
    let body = pipeline.send(request).await?;
    establish_session(pipeline, &body, &credentials.username)
}

/// Create an account and store the session the server opens for it.
///
/// # Errors
///
/// Same as [`login`].
pub async fn register(pipeline: &Pipeline, request: &RegisterRequest) -> Result<UserProfile, AuthError> {
    let call = ApiRequest::post(REGISTER_ENDPOINT).with_json(request)?;
    let body = pipeline.send(call).await?;
    establish_session(pipeline, &body, &request.username)
}

/// Drop the local session and return to the login route.
pub fn logout(pipeline: &Pipeline) {
    pipeline.session().clear_session();
    pipeline.navigator().push(pipeline.login_path());
    tracing::info!("logged out");
}

fn establish_session(pipeline: &Pipeline, body: &Value, username: &str) -> Result<UserProfile, AuthError> {
    let (token, user) = parse_grant(body, username)?;
    pipeline.session().set_session(&token, &user);
    tracing::info!(user_id = %user.id, role = ?user.role, "session established");
    Ok(user)
}

fn parse_grant(body: &Value, username: &str) -> Result<(String, UserProfile), AuthError> {
    let data = body
        .get("data")
        .ok_or_else(|| AuthError::MalformedResponse("missing data".to_owned()))?;
    let grant: SessionGrant =
        serde_json::from_value(data.clone()).map_err(|e| AuthError::MalformedResponse(e.to_string()))?;

    let token = grant
        .token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AuthError::MalformedResponse("missing token".to_owned()))?;

    let id = match grant.login_id {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => username.to_owned(),
    };
    let role = grant.role.filter(|r| !r.is_empty()).unwrap_or_else(|| DEFAULT_ROLE.to_owned());

    let mut extra = grant.extra;
    extra.entry("username").or_insert_with(|| Value::String(username.to_owned()));
    Ok((token, UserProfile { id, role: Some(role), extra }))
}
