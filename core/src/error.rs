//! Error type shared by every remote client in `taskpad-core`.
//!
//! The user-facing taxonomy is flat: whatever goes wrong, the
//! view only ever shows `err.to_string()` in its banner. The variants exist
//! so that callers (and tests) can still tell a missing session apart from a
//! rejected request.

use thiserror::Error;

/// Errors from backend operations.
#[derive(Debug, Error)]
pub enum TaskpadError {
    /// No session is available; the request was not sent.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Transport-level failure.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("{message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the response body.
        message: String,
    },

    /// A success response that did not have the expected shape.
    #[error("Unexpected response: {0}")]
    Parse(String),

    /// Input rejected before any request was made.
    #[error("{0}")]
    Invalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TaskpadError {
    /// HTTP status of an [`TaskpadError::Api`] error.
    pub fn status(&self) -> Option<u16> {
        match self {
            TaskpadError::Api { status, .. } => Some(*status),
            TaskpadError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Result type for backend operations.
pub type Result<T> = std::result::Result<T, TaskpadError>;

const ERROR_FIELDS: [&str; 4] = ["error", "message", "msg", "error_description"];

fn first_message(body: &str, fields: &[&str], fallback: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return fallback.to_string();
    };
    fields
        .iter()
        .filter_map(|key| value.get(key).and_then(serde_json::Value::as_str))
        .find(|s| !s.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| fallback.to_string())
}

/// Pulls a human-readable message out of an error body.
///
/// Tries the `error`, `message`, `msg` and `error_description` fields in that
/// order; falls back to `fallback` when none is a non-empty string.
pub fn message_from_body(body: &str, fallback: &str) -> String {
    first_message(body, &ERROR_FIELDS, fallback)
}

/// Edge functions report failures in `error` only; anything else in the body
/// is upstream detail and yields `fallback`.
pub fn function_error_from_body(body: &str, fallback: &str) -> String {
    first_message(body, &["error"], fallback)
}

/// Passes a success response through; turns anything else into
/// [`TaskpadError::Api`] with the message taken from the body.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
    fallback: &str,
) -> Result<reqwest::Response> {
    check_status(response, fallback, message_from_body).await
}

/// Like [`ensure_success`], but only trusts the `error` field.
pub(crate) async fn ensure_function_success(
    response: reqwest::Response,
    fallback: &str,
) -> Result<reqwest::Response> {
    check_status(response, fallback, function_error_from_body).await
}

async fn check_status(
    response: reqwest::Response,
    fallback: &str,
    extract: fn(&str, &str) -> String,
) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    tracing::debug!("request failed with {status}: {body}");
    Err(TaskpadError::Api {
        status: status.as_u16(),
        message: extract(&body, fallback),
    })
}
