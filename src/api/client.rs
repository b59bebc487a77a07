//! HTTP implementation of the auth backend.
//!
//! `AuthApiClient` wraps a shared `reqwest::Client` and speaks to the
//! MedZy auth endpoints. All non-2xx responses are mapped through
//! `ApiError::from_status` so callers only ever see the taxonomy in
//! `api::error`.

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde_json::json;
use tracing::debug;

use crate::models::{LoginRequest, SignupRequest, UserProfile};

use super::{ApiError, AuthBackend, SignInResponse, SignupResponse};

/// HTTP request timeout in seconds.
/// 30s allows for slow responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// HTTP client for the MedZy auth API.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct AuthApiClient {
    client: Client,
    base_url: String,
}

impl AuthApiClient {
    /// Create a new client for the given API base URL (no trailing slash).
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Check if a response is successful, mapping the status and body
    /// into an `ApiError` if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }
}

#[async_trait]
impl AuthBackend for AuthApiClient {
    async fn sign_in(&self, credentials: &LoginRequest) -> Result<SignInResponse, ApiError> {
        let response = self
            .client
            .post(self.url("/auth/signin"))
            .json(credentials)
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("signin response: {e}")))
    }

    async fn sign_up(&self, profile: &SignupRequest) -> Result<SignupResponse, ApiError> {
        let response = self
            .client
            .post(self.url("/auth/signup"))
            .json(profile)
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("signup response: {e}")))
    }

    async fn current_user(&self, token: &str) -> Result<UserProfile, ApiError> {
        let response = self
            .client
            .get(self.url("/auth/me"))
            .bearer_auth(token)
            .header(header::CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("profile response: {e}")))
    }

    async fn session_check(&self, token: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .get(self.url("/auth/session-check"))
            .bearer_auth(token)
            .header(header::CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }
        let body = response.text().await.unwrap_or_default();
        debug!(status = %status, "Unexpected session-check response");
        Err(ApiError::from_status(status, &body))
    }

    async fn logout(&self, token: &str, session_id: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.url("/auth/logout"))
            .bearer_auth(token)
            .json(&json!({ "sessionId": session_id }))
            .send()
            .await?;

        Self::check_response(response).await?;
        Ok(())
    }
}
