//! Client-side session lifecycle manager for the MedZy marketplace portal.
//!
//! This crate decides, at every moment, whether the current client
//! process may keep using a previously-issued credential, and terminates
//! that credential safely when it should not. It owns:
//!
//! - the session state machine (`LoggedOut` / `Initializing` /
//!   `Authenticated` / terminating), serialized behind a single lock
//! - three timers: 15-minute inactivity, 3-minute screen-off, and the
//!   30-second server-side session check, all generation-tagged so a
//!   cancelled timer can never fire into a newer session
//! - cold-start bootstrap with bounded retry that distinguishes a flaky
//!   network from a rejected credential
//! - the logout reason dispatcher, the one place that decides what the
//!   user is told for each of the five termination paths
//!
//! The authentication server is reached through the `api::AuthBackend`
//! trait (production implementation: `api::AuthApiClient`); the host
//! shell injects a `notify::Notifier` and forwards raw input and
//! visibility events to the manager. The core renders nothing itself.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod notify;
pub mod session;

pub use api::{ApiError, AuthApiClient, AuthBackend};
pub use auth::{Credential, CredentialStore, StoredCredential};
pub use config::SessionConfig;
pub use models::{LoginRequest, SignupRequest, UserProfile};
pub use notify::{ChannelNotifier, LogNotifier, Notice, Notifier, Severity};
pub use session::{
    BootstrapOutcome, LoginFailureKind, LoginOutcome, LogoutReason, SessionManager,
    SessionSnapshot, SessionState, SignupOutcome,
};
