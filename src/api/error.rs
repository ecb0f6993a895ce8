use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized: {}", .message.as_deref().unwrap_or("token may be expired"))]
    Unauthorized { message: Option<String> },

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Request failed with status {status}: {message}")]
    Request {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Session expired: {0}")]
    SessionExpired(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Uniform error envelope returned by the API on failure.
/// Login and validation errors may instead carry a FastAPI-style `detail`.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorBody>,
    detail: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: Option<String>,
    message: Option<String>,
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            format!(
                "{}... (truncated, {} total bytes)",
                &body[..MAX_ERROR_BODY_LENGTH],
                body.len()
            )
        }
    }

    /// Extract the server-provided message from an error body, trying the
    /// `{error: {code, message}}` envelope first, then `{detail}`.
    fn parse_body(body: &str) -> (Option<String>, Option<String>) {
        match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(envelope) => {
                let (code, message) = match envelope.error {
                    Some(inner) => (inner.code, inner.message),
                    None => (None, None),
                };
                (code, message.or(envelope.detail))
            }
            Err(_) => (None, None),
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let (code, message) = Self::parse_body(body);
        let text = message
            .clone()
            .unwrap_or_else(|| Self::truncate_body(body));
        match status.as_u16() {
            401 => ApiError::Unauthorized { message },
            403 => ApiError::AccessDenied(text),
            404 => ApiError::NotFound(text),
            500..=599 => ApiError::ServerError(text),
            _ => ApiError::Request {
                status: status.as_u16(),
                code,
                message: text,
            },
        }
    }

    /// The message the server attached to this error, if it responded at all.
    /// Suitable for user display; `None` for transport-level failures.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized { message } => message.as_deref(),
            ApiError::AccessDenied(m)
            | ApiError::NotFound(m)
            | ApiError::ServerError(m)
            | ApiError::Request { message: m, .. } => Some(m),
            _ => None,
        }
    }

    /// True when the server answered the request, whatever the status.
    pub fn is_server_response(&self) -> bool {
        matches!(
            self,
            ApiError::Unauthorized { .. }
                | ApiError::AccessDenied(_)
                | ApiError::NotFound(_)
                | ApiError::ServerError(_)
                | ApiError::Request { .. }
        )
    }
}
