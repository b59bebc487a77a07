use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Unauthorized - credential rejected by the server")]
    Unauthorized,

    #[error("Email not verified: {message}")]
    EmailNotVerified {
        message: String,
        user_id: Option<String>,
    },

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Error code the backend attaches to 403 responses for unverified accounts
const EMAIL_NOT_VERIFIED_CODE: &str = "EMAIL_NOT_VERIFIED";

/// Structured error body the auth backend returns alongside 4xx statuses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(rename = "userId", default)]
    user_id: Option<String>,
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

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let parsed: Option<ErrorBody> = serde_json::from_str(body).ok();
        let message = parsed
            .as_ref()
            .and_then(|b| b.message.clone())
            .unwrap_or_else(|| Self::truncate_body(body));

        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 if parsed
                .as_ref()
                .and_then(|b| b.error.as_deref())
                .is_some_and(|code| code == EMAIL_NOT_VERIFIED_CODE) =>
            {
                ApiError::EmailNotVerified {
                    message,
                    user_id: parsed.and_then(|b| b.user_id),
                }
            }
            400..=499 => ApiError::Rejected(message),
            500..=599 => ApiError::ServerError(message),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, message)),
        }
    }

    /// True for responses where the server explicitly and definitively
    /// rejected the credential or request. Never retried.
    pub fn is_authoritative(&self) -> bool {
        matches!(
            self,
            ApiError::Unauthorized | ApiError::EmailNotVerified { .. } | ApiError::Rejected(_)
        )
    }

    /// True for transport-level failures where the server never answered.
    /// Eligible for retry; never grounds for terminating a session.
    pub fn is_transient(&self) -> bool {
        matches!(self, ApiError::Network(_))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Network(err.to_string())
    }
}
