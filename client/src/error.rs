//! Error types for backend calls

use thiserror::Error;

/// Errors returned by [`ApiClient`](crate::ApiClient) calls
///
/// The `Display` output is what views show to the user, so the `Status`
/// variant carries the backend's own message when one was sent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Transport failure (DNS, connection refused, TLS, ...)
    #[error("Request failed: {0}")]
    Request(String),

    /// The backend answered with a non-success status
    #[error("{message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Message extracted from the response body
        message: String,
    },

    /// Response body did not match the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// The base URL or a resource path could not be parsed
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A local file (payment screenshot) could not be read
    #[error("Failed to read {path}: {reason}")]
    Io {
        /// Path that was being read
        path: String,
        /// Underlying error
        reason: String,
    },
}

impl ApiError {
    /// HTTP status code, if the backend answered at all
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` for 401/403 answers
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status: 401 | 403, .. })
    }

    /// Build a `Status` error from a response body
    ///
    /// The backend reports failures as JSON: `{"detail": ".."}`,
    /// `{"error": ".."}`, `{"message": ".."}` or field errors like
    /// `{"otp": ["Invalid OTP"]}`. Anything else falls back to the raw body,
    /// or to a generic message when the body is empty.
    #[must_use]
    pub fn from_response_body(status: u16, body: &str) -> Self {
        let message = extract_message(body)
            .unwrap_or_else(|| format!("Request failed with status {status}"));
        Self::Status { status, message }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::Decode(error.to_string())
        } else {
            Self::Request(error.to_string())
        }
    }
}

fn extract_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) else {
        // Plain-text bodies are shown as-is unless they look like an HTML error page
        return (!trimmed.starts_with('<')).then(|| trimmed.to_string());
    };

    match value {
        serde_json::Value::String(message) => Some(message),
        serde_json::Value::Object(map) => {
            for key in ["detail", "error", "message"] {
                if let Some(serde_json::Value::String(message)) = map.get(key) {
                    return Some(message.clone());
                }
            }
            map.iter().find_map(|(field, value)| {
                first_string(value).map(|message| {
                    if field == "non_field_errors" {
                        message
                    } else {
                        format!("{field}: {message}")
                    }
                })
            })
        },
        serde_json::Value::Array(items) => items.iter().find_map(first_string),
        _ => None,
    }
}

fn first_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(message) => Some(message.clone()),
        serde_json::Value::Array(items) => items.iter().find_map(first_string),
        _ => None,
    }
}
