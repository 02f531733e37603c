//! Error types for workmate-session.
//!
//! Failures are split by who is expected to act on them: credential and
//! authorization failures are recovered by the session itself (logout or a
//! redirect), everything else is surfaced to the calling view.

use std::fmt;

/// Rejection payload for a request that reached the server but did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiFailure {
    /// HTTP status code returned by the server
    pub status: u16,
    /// Human-readable message extracted from the response
    pub message: String,
    /// Raw response body, if any was sent
    pub body: Option<String>,
}

impl ApiFailure {
    /// Failure with an explicit message.
    pub fn new(status: u16, message: impl Into<String>, body: Option<String>) -> Self {
        Self {
            status,
            message: message.into(),
            body,
        }
    }

    /// Build a failure from a raw error response.
    ///
    /// The message is read from a JSON `detail` or `message` field when the
    /// body carries one, otherwise the canonical reason phrase is used.
    pub fn from_response(status: u16, body: String) -> Self {
        let message = extract_error_message(&body).unwrap_or_else(|| reason_phrase(status));
        let body = if body.is_empty() { None } else { Some(body) };
        Self::new(status, message, body)
    }
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status, self.message)
    }
}

fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let field = value.get("detail").or_else(|| value.get("message"))?;
    match field {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Null => None,
        // FastAPI validation errors carry a list of objects under `detail`
        other => Some(other.to_string()),
    }
}

fn reason_phrase(status: u16) -> String {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown error")
        .to_string()
}

/// Errors that can occur in session and gateway operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Pre-flight token refresh failed; the session has been logged out.
    #[error("Credential refresh failed: {0}")]
    CredentialRefreshFailure(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(ApiFailure),

    #[error("Forbidden: {0}")]
    Forbidden(ApiFailure),

    #[error("Server error: {0}")]
    ServerError(ApiFailure),

    #[error("Request failed: {0}")]
    ClientError(ApiFailure),

    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("Token provider error: {0}")]
    ProviderError(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl SessionError {
    /// HTTP status of the failed response, if the request reached the server.
    pub fn status(&self) -> Option<u16> {
        self.failure().map(|f| f.status)
    }

    /// Response details for status-bearing errors.
    pub fn failure(&self) -> Option<&ApiFailure> {
        match self {
            Self::Unauthorized(f) | Self::Forbidden(f) | Self::ServerError(f) | Self::ClientError(f) => {
                Some(f)
            },
            _ => None,
        }
    }

    /// Whether a caller-level retry can reasonably succeed.
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::ServerError(_) | Self::TransportError(_))
    }
}

impl From<reqwest::Error> for SessionError {
    fn from(e: reqwest::Error) -> Self {
        SessionError::TransportError(e.to_string())
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(e: serde_json::Error) -> Self {
        SessionError::SerializationError(e.to_string())
    }
}

/// Result type for session operations
pub type Result<T> = std::result::Result<T, SessionError>;
