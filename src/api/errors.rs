//! API client errors.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors returned by the HTTP API clients.
///
/// Every backend operation fails the same way: either the transport broke,
/// or the backend answered with a non-2xx status and, usually, a
/// human-readable detail message. No operation retries on its own.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure: connectivity, TLS, or body decoding.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response. `detail` carries the server's message verbatim
    /// when one could be decoded from the body.
    #[error("request failed with status {status}: {}", detail.as_deref().unwrap_or("no detail"))]
    Status {
        status: StatusCode,
        detail: Option<String>,
    },

    /// Registration rejected locally before any request was made.
    #[error("password confirmation does not match")]
    PasswordMismatch,

    /// Book payload rejected locally before any request was made.
    #[error(transparent)]
    InvalidBook(#[from] InvalidBookData),
}

impl ApiError {
    /// The server-provided failure message, when one was decoded.
    #[must_use]
    pub fn server_detail(&self) -> Option<&str> {
        match self {
            Self::Status { detail, .. } => detail.as_deref(),
            Self::Http(_) | Self::PasswordMismatch | Self::InvalidBook(_) => None,
        }
    }

    /// The HTTP status this failure carries, if the request got that far.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Http(error) => error.status(),
            Self::Status { status, .. } => Some(*status),
            Self::PasswordMismatch | Self::InvalidBook(_) => None,
        }
    }
}

/// Why a book payload failed local validation.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InvalidBookData {
    #[error("price must be a finite, non-negative amount")]
    Price,

    #[error("stock quantity must not be negative")]
    NegativeStock,
}

/// Map a non-2xx response to [`ApiError::Status`], keeping the server's
/// message when the body carries one.
pub(crate) async fn error_for_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, ApiError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();

    Err(ApiError::Status {
        status,
        detail: extract_detail(&body),
    })
}

/// Pull the human-readable failure message out of an error body.
///
/// The storefront backend answers with `{"detail": "..."}`; the portal
/// gateway uses `{"message": "..."}`. Non-string payloads, such as field
/// validation lists, are rendered as JSON so nothing is lost.
pub(crate) fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;

    let text = match value.get("detail").or_else(|| value.get("message"))? {
        serde_json::Value::Null => return None,
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    };

    if text.is_empty() { None } else { Some(text) }
}
