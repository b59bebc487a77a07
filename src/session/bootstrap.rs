//! Cold-start credential resolution.
//!
//! On process start with a stored credential, the profile behind it is
//! resolved against the auth backend. The central correctness property:
//! a flaky network is never treated as a rejected credential, and a
//! rejected credential is never retried.

use std::time::Duration;

use tracing::{debug, warn};

use crate::api::AuthBackend;
use crate::models::UserProfile;

/// Terminal bootstrap failure classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BootstrapFailure {
    /// The server authoritatively declared the credential invalid.
    Rejected,
    /// The session could not be verified: transient failures exhausted
    /// the retry budget, or the server answered outside the protocol.
    Unverifiable,
}

/// Resolve the user behind a stored token, retrying transient failures
/// up to `max_retries` additional times with a fixed delay.
pub(crate) async fn resolve_user(
    backend: &dyn AuthBackend,
    token: &str,
    retry_delay: Duration,
    max_retries: u32,
) -> Result<UserProfile, BootstrapFailure> {
    let mut attempt: u32 = 0;

    loop {
        match backend.current_user(token).await {
            Ok(user) => {
                debug!(attempt, "Resolved user from stored credential");
                return Ok(user);
            }
            Err(err) if err.is_authoritative() => {
                debug!(attempt, error = %err, "Stored credential rejected");
                return Err(BootstrapFailure::Rejected);
            }
            Err(err) if err.is_transient() && attempt < max_retries => {
                attempt += 1;
                warn!(
                    attempt,
                    max_retries,
                    error = %err,
                    "Transient failure resolving user, retrying"
                );
                tokio::time::sleep(retry_delay).await;
            }
            Err(err) => {
                warn!(attempt, error = %err, "Could not verify stored session");
                return Err(BootstrapFailure::Unverifiable);
            }
        }
    }
}
