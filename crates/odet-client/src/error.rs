//! Client error types.

use std::time::Duration;

use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

/// Transport failures, normalized from HTTP status codes and client errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("File too large. Please choose a smaller file.")]
    PayloadTooLarge,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server error ({0}). Please try again later.")]
    ServerError(u16),

    /// Carries the configured request budget.
    #[error("Request timeout after {0:?}")]
    Timeout(Duration),

    #[error("Network error: {0}")]
    Network(String),

    /// Only raised while building a client or resolving a media path.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Map a non-success HTTP status and its body to an error.
    pub fn from_http_status(status: u16, body: &str) -> Self {
        match status {
            413 => ClientError::PayloadTooLarge,
            400 | 422 => ClientError::BadRequest(
                extract_detail(body).unwrap_or_else(|| "Bad request".to_string()),
            ),
            500..=599 => ClientError::ServerError(status),
            _ => ClientError::Network(format!("Request failed with status code {}", status)),
        }
    }

    /// Map a reqwest error. `timeout` is the configured request budget.
    pub fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            return ClientError::Timeout(timeout);
        }
        if let Some(status) = err.status() {
            return Self::from_http_status(status.as_u16(), "");
        }
        if err.is_decode() {
            return ClientError::Network(format!("Invalid response: {}", err));
        }
        ClientError::Network(err.to_string())
    }

    /// HTTP status this error was derived from, if any.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            ClientError::PayloadTooLarge => Some(413),
            ClientError::BadRequest(_) => Some(400),
            ClientError::ServerError(status) => Some(*status),
            _ => None,
        }
    }

    /// Short label used for metrics and structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ClientError::PayloadTooLarge => "payload_too_large",
            ClientError::BadRequest(_) => "bad_request",
            ClientError::ServerError(_) => "server_error",
            ClientError::Timeout(_) => "timeout",
            ClientError::Network(_) => "network",
            ClientError::InvalidUrl(_) => "invalid_url",
        }
    }
}

/// Pull `detail` out of a FastAPI-style error body.
fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(s) => (!s.is_empty()).then(|| s.clone()),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}
