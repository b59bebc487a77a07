//! Timer orchestration.
//!
//! `TimerSet` owns the up-to-three live timer tasks of an authenticated
//! session. Arming a kind that is already armed first aborts the
//! previous task; every armed timer carries a generation from a shared
//! monotonic counter, and a fire whose generation is no longer current
//! is stale and must be dropped. Aborting a tokio task whose sleep has
//! already completed does not unqueue an in-flight wakeup, so the
//! generation check is what actually closes the cancellation race.

use tokio::task::JoinHandle;

/// The three timer kinds of an authenticated session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// One-shot: fires after the inactivity window with no activity.
    Inactivity,
    /// One-shot: fires after the screen-off window of continuous hidden.
    ScreenOff,
    /// The periodic server-side session validity ticker.
    SessionCheck,
}

#[derive(Debug)]
struct ArmedTimer {
    generation: u64,
    handle: JoinHandle<()>,
}

/// Owns the live timer handles. Invariant: a slot is `Some` iff its
/// owning condition currently holds; `replace` and `disarm` always abort
/// the outgoing task rather than letting it expire on its own.
#[derive(Debug, Default)]
pub struct TimerSet {
    inactivity: Option<ArmedTimer>,
    screen_off: Option<ArmedTimer>,
    session_check: Option<ArmedTimer>,
    next_generation: u64,
}

impl TimerSet {
    /// Allocate the generation for a timer about to be armed. The
    /// counter is shared across kinds so no fire can ever match a slot
    /// it was not armed into.
    pub fn next_generation(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }

    /// Install a newly spawned timer task, aborting any previous timer
    /// of the same kind.
    pub fn replace(&mut self, kind: TimerKind, generation: u64, handle: JoinHandle<()>) {
        let slot = self.slot_mut(kind);
        if let Some(old) = slot.take() {
            old.handle.abort();
        }
        *slot = Some(ArmedTimer { generation, handle });
    }

    /// Cancel one timer kind. Idempotent.
    pub fn disarm(&mut self, kind: TimerKind) {
        if let Some(old) = self.slot_mut(kind).take() {
            old.handle.abort();
        }
    }

    /// Cancel everything. Called on every exit from the authenticated
    /// state.
    pub fn disarm_all(&mut self) {
        self.disarm(TimerKind::Inactivity);
        self.disarm(TimerKind::ScreenOff);
        self.disarm(TimerKind::SessionCheck);
    }

    /// Whether a fire with this generation is still the armed one.
    pub fn is_current(&self, kind: TimerKind, generation: u64) -> bool {
        self.slot(kind)
            .as_ref()
            .is_some_and(|armed| armed.generation == generation)
    }

    pub fn is_armed(&self, kind: TimerKind) -> bool {
        self.slot(kind).is_some()
    }

    pub fn armed_count(&self) -> usize {
        [&self.inactivity, &self.screen_off, &self.session_check]
            .iter()
            .filter(|slot| slot.is_some())
            .count()
    }

    fn slot(&self, kind: TimerKind) -> &Option<ArmedTimer> {
        match kind {
            TimerKind::Inactivity => &self.inactivity,
            TimerKind::ScreenOff => &self.screen_off,
            TimerKind::SessionCheck => &self.session_check,
        }
    }

    fn slot_mut(&mut self, kind: TimerKind) -> &mut Option<ArmedTimer> {
        match kind {
            TimerKind::Inactivity => &mut self.inactivity,
            TimerKind::ScreenOff => &mut self.screen_off,
            TimerKind::SessionCheck => &mut self.session_check,
        }
    }
}
