//! Logout reason dispatch and the notifier collaborator.
//!
//! Every one of the five termination paths routes through
//! `logout_notice`, so the message for "inactivity" and the message for
//! "logged in elsewhere" can never drift apart as the portal grows. The
//! core never constructs UI - it hands `Notice` values to whatever
//! `Notifier` the host application injected.

use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::session::LogoutReason;

/// Notification severity, mirrored by the portal's toast styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

/// A user-facing notification.
///
/// `reason` is set only for session terminations, keying the
/// notification stream by `LogoutReason` for consumers that care.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
    pub reason: Option<LogoutReason>,
}

impl Notice {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            reason: None,
        }
    }

    pub fn for_logout(reason: LogoutReason) -> Self {
        let (severity, message) = logout_notice(reason);
        Self {
            severity,
            message: message.to_string(),
            reason: Some(reason),
        }
    }
}

/// Sink for user-facing notifications.
///
/// Implementations must not block: `notify` is called from inside the
/// session state machine's termination sequence.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Pure mapping from a termination reason to what the user is told.
pub fn logout_notice(reason: LogoutReason) -> (Severity, &'static str) {
    match reason {
        LogoutReason::Inactivity => (
            Severity::Warning,
            "Session expired due to inactivity. Please login again.",
        ),
        LogoutReason::ScreenOff => (
            Severity::Info,
            "Session ended for security (screen off or tab inactive).",
        ),
        LogoutReason::SessionInvalidatedRemotely => (
            Severity::Warning,
            "Your session was terminated (logged in from another device).",
        ),
        LogoutReason::SecurityPolicy => (
            Severity::Error,
            "Session terminated for security reasons.",
        ),
        LogoutReason::Manual => (
            Severity::Success,
            "You have been successfully logged out.",
        ),
    }
}

/// Notifier that forwards notices into an unbounded channel, giving the
/// host application a notification stream to render however it likes.
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notice>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notice: Notice) {
        // Receiver dropped means nobody is rendering notices anymore
        let _ = self.tx.send(notice);
    }
}

/// Notifier that writes notices to the tracing log. Useful as a default
/// while the portal shell is not wired up.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        match notice.severity {
            Severity::Success | Severity::Info => info!(message = %notice.message, "notice"),
            Severity::Warning => warn!(message = %notice.message, "notice"),
            Severity::Error => error!(message = %notice.message, "notice"),
        }
    }
}
