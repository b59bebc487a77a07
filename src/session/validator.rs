//! Periodic server-side session validation.
//!
//! While a session is authenticated, one "is my session still valid"
//! request is issued per tick. Only an explicit 401 terminates the
//! session; a timeout or transport error is ambiguous evidence and is
//! deliberately ignored - the inactivity timers and the next successful
//! check cover that ground.

use std::sync::Arc;

use tracing::debug;

use crate::api::ApiError;
use crate::session::manager::ManagerInner;
use crate::session::state::LogoutReason;
use crate::session::timers::TimerKind;

/// Ticker body spawned when a session is established. Each tick issues
/// an independent check; a slow check may still be in flight when the
/// next tick fires, and both may race to terminate - idempotent
/// termination absorbs the duplication.
pub(crate) async fn run(inner: Arc<ManagerInner>, generation: u64) {
    let interval = inner.config.session_check_interval;
    loop {
        tokio::time::sleep(interval).await;
        tokio::spawn(check_once(Arc::clone(&inner), generation));
    }
}

async fn check_once(inner: Arc<ManagerInner>, generation: u64) {
    let token = {
        let core = inner.core.lock().await;
        if !core.state.is_authenticated()
            || !core.timers.is_current(TimerKind::SessionCheck, generation)
        {
            return;
        }
        match &core.credential {
            Some(credential) => credential.token.clone(),
            None => return,
        }
    };

    match inner.backend.session_check(&token).await {
        Ok(()) => {}
        Err(ApiError::Unauthorized) => {
            debug!("Server reports session invalid");
            inner.terminate(LogoutReason::SessionInvalidatedRemotely).await;
        }
        Err(err) => {
            // Ambiguous evidence never terminates a session
            debug!(error = %err, "Session check inconclusive, ignoring");
        }
    }
}
