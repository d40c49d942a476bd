//! Failure taxonomy for pipeline calls.
//!
//! Every rejected call carries one of five classifications and the message
//! that was shown to the user, so call sites can branch without re-deriving it.

use std::fmt;

pub const MSG_REQUEST_FAILED: &str = "request failed";
pub const MSG_SESSION_EXPIRED: &str = "session expired, please log in again";
pub const MSG_NETWORK_ERROR: &str = "network error, check your connection";
pub const MSG_REQUEST_CONFIG: &str = "request configuration error";

/// Classification tag attached to every rejected outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// `success: false` inside a 2xx envelope.
    ValidationEnvelopeError,
    /// HTTP 401.
    AuthExpired,
    /// Any other non-2xx status.
    HttpStatusError,
    /// Sent but no response (connect failure, timeout).
    NetworkError,
    /// Never sent (bad URL, invalid header).
    RequestConfigError,
}

impl ErrorKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ValidationEnvelopeError => "ValidationEnvelopeError",
            Self::AuthExpired => "AuthExpired",
            Self::HttpStatusError => "HttpStatusError",
            Self::NetworkError => "NetworkError",
            Self::RequestConfigError => "RequestConfigError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected pipeline outcome. `Display` is the user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("{message}")]
    ValidationEnvelope { message: String },

    #[error("{message}")]
    AuthExpired { message: String },

    #[error("{message}")]
    HttpStatus { status: u16, message: String },

    #[error("{message}")]
    Network { message: String },

    #[error("{message}")]
    RequestConfig { message: String },
}

impl RequestError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ValidationEnvelope { .. } => ErrorKind::ValidationEnvelopeError,
            Self::AuthExpired { .. } => ErrorKind::AuthExpired,
            Self::HttpStatus { .. } => ErrorKind::HttpStatusError,
            Self::Network { .. } => ErrorKind::NetworkError,
            Self::RequestConfig { .. } => ErrorKind::RequestConfigError,
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::ValidationEnvelope { message }
            | Self::AuthExpired { message }
            | Self::HttpStatus { message, .. }
            | Self::Network { message }
            | Self::RequestConfig { message } => message,
        }
    }

    /// HTTP status behind the failure, when one was received.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::AuthExpired { .. } => Some(401),
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ValidationEnvelope { .. } => "E_VALIDATION_ENVELOPE",
            Self::AuthExpired { .. } => "E_AUTH_EXPIRED",
            Self::HttpStatus { .. } => "E_HTTP_STATUS",
            Self::Network { .. } => "E_NETWORK",
            Self::RequestConfig { .. } => "E_REQUEST_CONFIG",
        }
    }
}

/// Fallback message for a status whose body carried none.
#[must_use]
pub fn status_message(status: u16) -> String {
    let known = match status {
        400 => "bad request parameters",
        403 => "access denied",
        404 => "requested resource not found",
        500 => "internal server error",
        502 => "bad gateway",
        503 => "service unavailable",
        504 => "gateway timeout",
        _ => return format!("{MSG_REQUEST_FAILED} ({status})"),
    };
    known.to_owned()
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
