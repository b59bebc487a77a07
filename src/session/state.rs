//! Session lifecycle states and outcome types.

use crate::models::UserProfile;

/// Why a session was terminated. Attached to every transition into
/// `LoggedOut` from an authenticated state and consumed exactly once by
/// the logout reason dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutReason {
    Inactivity,
    ScreenOff,
    SessionInvalidatedRemotely,
    SecurityPolicy,
    Manual,
}

/// The single source of truth for whether this process may use its
/// credential. Exactly one value exists per manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    LoggedOut,
    Initializing,
    Authenticated,
    TerminatingWithReason(LogoutReason),
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated)
    }
}

/// Observable snapshot published on every transition, for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub user: Option<UserProfile>,
}

impl SessionSnapshot {
    pub(crate) fn logged_out() -> Self {
        Self {
            state: SessionState::LoggedOut,
            user: None,
        }
    }
}

/// Result of `SessionManager::bootstrap`.
#[derive(Debug, Clone, PartialEq)]
pub enum BootstrapOutcome {
    /// Stored credential resolved to a profile; session is live.
    Authenticated(UserProfile),
    /// No stored credential; nothing to do.
    NoStoredCredential,
    /// The server authoritatively rejected the stored credential.
    Rejected,
    /// Could not verify the session: retries exhausted on transient
    /// failures, or the server misbehaved. Distinct from `Rejected` -
    /// a flaky network is not a revoked credential.
    Unverifiable,
}

/// Result of `SessionManager::login`.
#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    Success { user: UserProfile },
    Failed { message: String, kind: LoginFailureKind },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginFailureKind {
    /// Account exists but the email is unverified; `user_id` feeds the
    /// verification flow.
    EmailNotVerified { user_id: Option<String> },
    /// The server rejected the credentials or the request.
    Rejected,
    /// Transport failure; the server never answered.
    Network,
}

/// Result of `SessionManager::signup`.
#[derive(Debug, Clone, PartialEq)]
pub enum SignupOutcome {
    Success { requires_verification: bool },
    Failed { message: String },
}
