//! The session state machine.
//!
//! `SessionManager` is the single owner of the lifecycle state, the
//! credential, and the in-memory user. Every transition - login, logout,
//! timer fire, remote invalidation, bootstrap - is serialized behind one
//! mutex, which is what makes the termination contract atomic: cancel
//! timers, clear credential and user, dispatch the reason, land in
//! `LoggedOut`, with no other event processed in between.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use reqwest::header::{self, HeaderMap, HeaderValue};
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use crate::api::{ApiError, AuthBackend};
use crate::auth::{Credential, CredentialStore, StoredCredential};
use crate::config::SessionConfig;
use crate::models::{LoginRequest, SignupRequest, UserProfile};
use crate::notify::{Notice, Notifier, Severity};
use crate::session::bootstrap::{self, BootstrapFailure};
use crate::session::monitor::ActivityThrottle;
use crate::session::state::{
    BootstrapOutcome, LoginFailureKind, LoginOutcome, LogoutReason, SessionSnapshot, SessionState,
    SignupOutcome,
};
use crate::session::timers::{TimerKind, TimerSet};
use crate::session::validator;

/// Mutable session state, guarded by the manager's single mutex.
pub(crate) struct SessionCore {
    pub(crate) state: SessionState,
    pub(crate) credential: Option<Credential>,
    pub(crate) user: Option<UserProfile>,
    pub(crate) timers: TimerSet,
    pub(crate) throttle: ActivityThrottle,
    /// Last reported host visibility; timers consult it when a
    /// screen-off fire races a visibility change.
    pub(crate) page_hidden: bool,
}

pub(crate) struct ManagerInner {
    pub(crate) config: SessionConfig,
    pub(crate) backend: Arc<dyn AuthBackend>,
    pub(crate) notifier: Arc<dyn Notifier>,
    pub(crate) store: CredentialStore,
    pub(crate) core: Mutex<SessionCore>,
    state_tx: watch::Sender<SessionSnapshot>,
}

/// Client-side session lifecycle manager.
///
/// Cheap to clone; all clones share the same state machine.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<ManagerInner>,
}

impl SessionManager {
    pub fn new(
        config: SessionConfig,
        backend: Arc<dyn AuthBackend>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let store = CredentialStore::new(config.credential_path.clone());
        let throttle = ActivityThrottle::new(config.activity_throttle);
        let (state_tx, _) = watch::channel(SessionSnapshot::logged_out());

        Self {
            inner: Arc::new(ManagerInner {
                config,
                backend,
                notifier,
                store,
                core: Mutex::new(SessionCore {
                    state: SessionState::LoggedOut,
                    credential: None,
                    user: None,
                    timers: TimerSet::default(),
                    throttle,
                    page_hidden: false,
                }),
                state_tx,
            }),
        }
    }

    /// Observable session state for rendering. The receiver sees a
    /// snapshot for every published transition.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.inner.state_tx.subscribe()
    }

    pub async fn state(&self) -> SessionState {
        self.inner.core.lock().await.state.clone()
    }

    pub async fn current_user(&self) -> Option<UserProfile> {
        self.inner.core.lock().await.user.clone()
    }

    /// Number of live timer handles. Diagnostic; an unauthenticated
    /// session always reports zero.
    pub async fn armed_timer_count(&self) -> usize {
        self.inner.core.lock().await.timers.armed_count()
    }

    /// Headers other portal components attach to their own requests.
    pub async fn auth_headers(&self) -> Result<HeaderMap> {
        let core = self.inner.core.lock().await;
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        if let Some(credential) = &core.credential {
            headers.insert(
                header::AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", credential.token))?,
            );
        }
        Ok(headers)
    }

    /// Cold-start entry point: if a credential survived the last run,
    /// resolve the profile behind it and resume the session.
    pub async fn bootstrap(&self) -> BootstrapOutcome {
        {
            let core = self.inner.core.lock().await;
            if core.state != SessionState::LoggedOut {
                warn!(state = ?core.state, "Bootstrap called on a live session, ignoring");
                return match &core.user {
                    Some(user) => BootstrapOutcome::Authenticated(user.clone()),
                    None => BootstrapOutcome::NoStoredCredential,
                };
            }
        }

        let stored = match self.inner.store.load() {
            Ok(stored) => stored,
            Err(err) => {
                warn!(error = %err, "Could not read stored credential");
                None
            }
        };
        let Some(stored) = stored else {
            return BootstrapOutcome::NoStoredCredential;
        };

        {
            let mut core = self.inner.core.lock().await;
            core.state = SessionState::Initializing;
            self.inner.publish(&core);
        }
        info!("Stored credential found, resolving user");

        let resolved = bootstrap::resolve_user(
            self.inner.backend.as_ref(),
            &stored.token,
            self.inner.config.auth_retry_delay,
            self.inner.config.max_auth_retries,
        )
        .await;

        match resolved {
            Ok(user) => {
                let mut core = self.inner.core.lock().await;
                // A login that completed while we were resolving wins;
                // its session must not be replaced by the stale fetch
                if core.state != SessionState::Initializing {
                    debug!(state = ?core.state, "Bootstrap superseded before completion");
                    return match &core.user {
                        Some(current) => BootstrapOutcome::Authenticated(current.clone()),
                        None => BootstrapOutcome::Unverifiable,
                    };
                }
                self.inner
                    .establish_session(&mut core, stored.into(), user.clone());
                info!(user = %user.email, "Session restored from stored credential");
                BootstrapOutcome::Authenticated(user)
            }
            Err(failure) => {
                let mut core = self.inner.core.lock().await;
                if core.state == SessionState::Initializing {
                    if let Err(err) = self.inner.store.clear() {
                        warn!(error = %err, "Could not clear stored credential");
                    }
                    core.state = SessionState::LoggedOut;
                    core.credential = None;
                    core.user = None;
                    self.inner.publish(&core);
                }
                match failure {
                    BootstrapFailure::Rejected => BootstrapOutcome::Rejected,
                    BootstrapFailure::Unverifiable => BootstrapOutcome::Unverifiable,
                }
            }
        }
    }

    /// Authenticate with the server. A success while already
    /// authenticated is the device-switch case: the previous session is
    /// replaced in place, with no logout notification - the user never
    /// left this tab.
    pub async fn login(&self, credentials: LoginRequest) -> LoginOutcome {
        match self.inner.backend.sign_in(&credentials).await {
            Ok(response) => {
                let stored =
                    StoredCredential::new(response.token.clone(), response.session_id.clone());
                if let Err(err) = self.inner.store.save(&stored) {
                    warn!(error = %err, "Could not persist credential");
                }

                {
                    let mut core = self.inner.core.lock().await;
                    if core.state.is_authenticated() {
                        debug!("Re-login on a live session, replacing credential");
                        core.timers.disarm_all();
                    }
                    self.inner.establish_session(
                        &mut core,
                        Credential {
                            token: response.token,
                            session_id: response.session_id,
                        },
                        response.user.clone(),
                    );
                }

                info!(user = %response.user.email, "Login successful");
                let notice = if response.was_logged_in_elsewhere {
                    Notice::new(
                        Severity::Info,
                        "You have been logged out from your previous device and logged in here.",
                    )
                } else {
                    Notice::new(Severity::Success, "Welcome back! Login successful.")
                };
                self.inner.notifier.notify(notice);

                LoginOutcome::Success {
                    user: response.user,
                }
            }
            Err(ApiError::EmailNotVerified { message, user_id }) => {
                // The verification flow owns the messaging for this case
                LoginOutcome::Failed {
                    message,
                    kind: LoginFailureKind::EmailNotVerified { user_id },
                }
            }
            Err(err) if err.is_transient() => {
                let message = "Network error. Please check your connection and try again.";
                self.inner
                    .notifier
                    .notify(Notice::new(Severity::Error, message));
                LoginOutcome::Failed {
                    message: message.to_string(),
                    kind: LoginFailureKind::Network,
                }
            }
            Err(err) => {
                let message = match err {
                    ApiError::Rejected(message) => message,
                    _ => "Login failed. Please check your credentials.".to_string(),
                };
                self.inner
                    .notifier
                    .notify(Notice::new(Severity::Error, message.clone()));
                LoginOutcome::Failed {
                    message,
                    kind: LoginFailureKind::Rejected,
                }
            }
        }
    }

    /// Register a new account. Never touches the session state.
    pub async fn signup(&self, profile: SignupRequest) -> SignupOutcome {
        match self.inner.backend.sign_up(&profile).await {
            Ok(response) => SignupOutcome::Success {
                requires_verification: response.requires_verification,
            },
            Err(err) if err.is_transient() => {
                let message = "Network error. Please try again.";
                self.inner
                    .notifier
                    .notify(Notice::new(Severity::Error, message));
                SignupOutcome::Failed {
                    message: message.to_string(),
                }
            }
            Err(err) => {
                let message = match err {
                    ApiError::Rejected(message) => message,
                    other => other.to_string(),
                };
                self.inner
                    .notifier
                    .notify(Notice::new(Severity::Error, message.clone()));
                SignupOutcome::Failed { message }
            }
        }
    }

    /// Explicit user-initiated logout.
    pub async fn logout(&self) {
        self.inner.terminate(LogoutReason::Manual).await;
    }

    /// Terminate the session with a caller-supplied reason. A no-op
    /// unless currently authenticated; racing terminations resolve to
    /// first-reason-wins.
    pub async fn terminate(&self, reason: LogoutReason) {
        self.inner.terminate(reason).await;
    }

    /// A qualifying user-input event was observed. Throttled to once
    /// per second; each admitted event resets the inactivity deadline.
    pub async fn touch_activity(&self) {
        let mut core = self.inner.core.lock().await;
        if !core.state.is_authenticated() {
            return;
        }
        if !core.throttle.admit(Instant::now()) {
            return;
        }
        // The user is demonstrably present, so a pending screen-off
        // countdown no longer applies
        core.timers.disarm(TimerKind::ScreenOff);
        self.inner.arm_inactivity(&mut core);
    }

    /// The host page was hidden or shown. Hiding starts the screen-off
    /// countdown; showing cancels it and counts as fresh activity.
    pub async fn visibility_changed(&self, hidden: bool) {
        let mut core = self.inner.core.lock().await;
        core.page_hidden = hidden;
        if !core.state.is_authenticated() {
            return;
        }
        if hidden {
            debug!("Page hidden, arming screen-off timer");
            self.inner.arm_screen_off(&mut core);
        } else {
            debug!("Page visible, cancelling screen-off timer");
            core.timers.disarm(TimerKind::ScreenOff);
            core.throttle.touch(Instant::now());
            self.inner.arm_inactivity(&mut core);
        }
    }
}

impl ManagerInner {
    fn publish(&self, core: &SessionCore) {
        self.state_tx.send_replace(SessionSnapshot {
            state: core.state.clone(),
            user: core.user.clone(),
        });
    }

    /// Enter the authenticated state with a fresh credential: set the
    /// activity clock, arm the inactivity timer, start the validator.
    fn establish_session(
        self: &Arc<Self>,
        core: &mut SessionCore,
        credential: Credential,
        user: UserProfile,
    ) {
        core.credential = Some(credential);
        core.user = Some(user);
        core.state = SessionState::Authenticated;
        core.throttle.touch(Instant::now());
        self.arm_inactivity(core);
        self.arm_session_check(core);
        self.publish(core);
    }

    fn arm_inactivity(self: &Arc<Self>, core: &mut SessionCore) {
        self.arm_oneshot(core, TimerKind::Inactivity, self.config.inactivity_timeout);
    }

    fn arm_screen_off(self: &Arc<Self>, core: &mut SessionCore) {
        self.arm_oneshot(core, TimerKind::ScreenOff, self.config.screen_off_timeout);
    }

    /// Arm a one-shot timer, replacing any previous timer of the same
    /// kind. The spawned task carries the generation it was armed with;
    /// a fire that arrives after a disarm or re-arm no longer matches
    /// and is dropped under the lock.
    fn arm_oneshot(
        self: &Arc<Self>,
        core: &mut SessionCore,
        kind: TimerKind,
        duration: std::time::Duration,
    ) {
        let generation = core.timers.next_generation();
        let inner = Arc::clone(self);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            inner.timer_fired(kind, generation).await;
        });
        core.timers.replace(kind, generation, handle);
    }

    fn arm_session_check(self: &Arc<Self>, core: &mut SessionCore) {
        let generation = core.timers.next_generation();
        let inner = Arc::clone(self);
        let handle = tokio::spawn(validator::run(inner, generation));
        core.timers.replace(TimerKind::SessionCheck, generation, handle);
    }

    async fn timer_fired(self: Arc<Self>, kind: TimerKind, generation: u64) {
        let mut core = self.core.lock().await;
        if !core.timers.is_current(kind, generation) {
            debug!(?kind, generation, "Stale timer fire dropped");
            return;
        }
        core.timers.disarm(kind);

        match kind {
            TimerKind::Inactivity => {
                self.terminate_core(&mut core, LogoutReason::Inactivity);
            }
            TimerKind::ScreenOff => {
                // Only terminate if the page is still hidden; a show
                // event that lost the race to this fire wins
                if core.page_hidden {
                    self.terminate_core(&mut core, LogoutReason::ScreenOff);
                } else {
                    debug!("Screen-off fire with page visible, dropped");
                }
            }
            TimerKind::SessionCheck => {
                // The validator ticker never routes through here
                debug!("Unexpected session-check timer fire");
            }
        }
    }

    pub(crate) async fn terminate(self: &Arc<Self>, reason: LogoutReason) {
        let mut core = self.core.lock().await;
        self.terminate_core(&mut core, reason);
    }

    /// The termination contract, executed atomically under the state
    /// lock: (1) cancel every live timer, (2) clear the credential and
    /// user, (3) dispatch the reason, (4) land in `LoggedOut`.
    /// Termination of an already-terminated session is a no-op, so
    /// racing triggers resolve to first-reason-wins.
    fn terminate_core(self: &Arc<Self>, core: &mut SessionCore, reason: LogoutReason) {
        if !core.state.is_authenticated() {
            debug!(?reason, state = ?core.state, "Termination ignored");
            return;
        }
        info!(?reason, "Terminating session");
        core.state = SessionState::TerminatingWithReason(reason);
        self.publish(core);

        core.timers.disarm_all();
        core.throttle.reset();
        let credential = core.credential.take();
        core.user = None;
        if let Err(err) = self.store.clear() {
            warn!(error = %err, "Could not clear stored credential");
        }

        // Only an explicit logout tells the server; automatic
        // terminations are purely local
        if reason == LogoutReason::Manual {
            if let Some(credential) = credential {
                let backend = Arc::clone(&self.backend);
                tokio::spawn(async move {
                    if let Err(err) = backend
                        .logout(&credential.token, &credential.session_id)
                        .await
                    {
                        debug!(error = %err, "Server logout failed (non-critical)");
                    }
                });
            }
        }

        self.notifier.notify(Notice::for_logout(reason));
        core.state = SessionState::LoggedOut;
        self.publish(core);
    }
}
