//! Auth backend collaborator.
//!
//! This module defines:
//! - `AuthBackend`: the trait through which the session manager talks to
//!   the authentication server (signin, signup, profile, session check,
//!   logout) - implementations can be swapped for tests
//! - `AuthApiClient`: the production HTTP implementation
//! - `ApiError`: the error taxonomy separating authoritative rejection
//!   from transient transport failure

pub mod client;
pub mod error;

pub use client::AuthApiClient;
pub use error::ApiError;

use async_trait::async_trait;
use serde::Deserialize;

use crate::models::{LoginRequest, SignupRequest, UserProfile};

/// Successful `POST /auth/signin` response.
#[derive(Debug, Clone, Deserialize)]
pub struct SignInResponse {
    pub token: String,
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub user: UserProfile,
    #[serde(rename = "wasLoggedInElsewhere", default)]
    pub was_logged_in_elsewhere: bool,
}

/// Successful `POST /auth/signup` response.
#[derive(Debug, Clone, Deserialize)]
pub struct SignupResponse {
    #[serde(rename = "requiresVerification", default)]
    pub requires_verification: bool,
}

/// The authentication server as seen from this subsystem.
///
/// The manager only ever asks questions and issues commands through this
/// trait; it never fabricates an authenticated state locally.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// `POST /auth/signin` with user credentials.
    async fn sign_in(&self, credentials: &LoginRequest) -> Result<SignInResponse, ApiError>;

    /// `POST /auth/signup` with a new user profile.
    async fn sign_up(&self, profile: &SignupRequest) -> Result<SignupResponse, ApiError>;

    /// `GET /auth/me` - resolve the profile behind a bearer token.
    async fn current_user(&self, token: &str) -> Result<UserProfile, ApiError>;

    /// `GET /auth/session-check` - ask whether the session behind the
    /// token is still valid server-side. `Err(Unauthorized)` is the only
    /// authoritative "no".
    async fn session_check(&self, token: &str) -> Result<(), ApiError>;

    /// `POST /auth/logout` - tell the server the session is over.
    /// Best-effort; callers treat failures as non-critical.
    async fn logout(&self, token: &str, session_id: &str) -> Result<(), ApiError>;
}
