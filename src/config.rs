//! Session manager configuration.
//!
//! All timeouts and the retry policy live here so tests can drive the
//! manager with millisecond-scale durations instead of real 15-minute
//! waits. `SessionConfig::new` fills in the production defaults.

use std::path::PathBuf;
use std::time::Duration;

use crate::auth::CredentialStore;

/// Inactivity timeout: 15 minutes with no qualifying user input.
const INACTIVITY_TIMEOUT_SECS: u64 = 15 * 60;

/// Screen-off timeout: 3 minutes of continuous page-hidden.
/// Shorter than the inactivity window - a hidden tab is a higher-risk state.
const SCREEN_OFF_TIMEOUT_SECS: u64 = 3 * 60;

/// Server-side session validity is checked every 30 seconds.
const SESSION_CHECK_INTERVAL_SECS: u64 = 30;

/// Activity events are coalesced to at most one per second.
const ACTIVITY_THROTTLE_SECS: u64 = 1;

/// Fixed delay between bootstrap retry attempts.
const AUTH_RETRY_DELAY_SECS: u64 = 1;

/// Additional attempts after the first failed bootstrap fetch.
/// Applies to transient failures only; authoritative rejection never retries.
const MAX_AUTH_RETRIES: u32 = 2;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Base URL of the auth API, no trailing slash.
    pub base_url: String,
    /// Location of the persisted credential slot.
    pub credential_path: PathBuf,
    pub inactivity_timeout: Duration,
    pub screen_off_timeout: Duration,
    pub session_check_interval: Duration,
    pub activity_throttle: Duration,
    pub auth_retry_delay: Duration,
    pub max_auth_retries: u32,
}

impl SessionConfig {
    /// Production defaults for the given API base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            credential_path: CredentialStore::default_path()
                .unwrap_or_else(|_| PathBuf::from("session.json")),
            inactivity_timeout: Duration::from_secs(INACTIVITY_TIMEOUT_SECS),
            screen_off_timeout: Duration::from_secs(SCREEN_OFF_TIMEOUT_SECS),
            session_check_interval: Duration::from_secs(SESSION_CHECK_INTERVAL_SECS),
            activity_throttle: Duration::from_secs(ACTIVITY_THROTTLE_SECS),
            auth_retry_delay: Duration::from_secs(AUTH_RETRY_DELAY_SECS),
            max_auth_retries: MAX_AUTH_RETRIES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_session_policy() {
        let config = SessionConfig::new("https://api.medzy.example");
        assert_eq!(config.inactivity_timeout, Duration::from_secs(900));
        assert_eq!(config.screen_off_timeout, Duration::from_secs(180));
        assert_eq!(config.session_check_interval, Duration::from_secs(30));
        assert_eq!(config.activity_throttle, Duration::from_secs(1));
        assert_eq!(config.auth_retry_delay, Duration::from_secs(1));
        assert_eq!(config.max_auth_retries, 2);
    }
}
