//! Activity monitoring.
//!
//! The host shell forwards raw input signals (pointer, key, touch,
//! scroll) to `SessionManager::touch_activity`; this throttle is what
//! keeps a burst of mousemove events from re-arming the inactivity timer
//! hundreds of times per second.

use std::time::{Duration, Instant};

/// Coalesces activity events: two events within `min_interval` collapse
/// to one. The admitted timestamp is the activity clock.
#[derive(Debug)]
pub struct ActivityThrottle {
    min_interval: Duration,
    last: Option<Instant>,
}

impl ActivityThrottle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last: None,
        }
    }

    /// Admit an activity event at `now`. Returns true if the event
    /// passes the throttle (and becomes the new activity timestamp).
    pub fn admit(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.duration_since(last) < self.min_interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    /// Record activity unconditionally, bypassing the throttle. Used
    /// when the page becomes visible again - "came back" always counts
    /// as fresh activity.
    pub fn touch(&mut self, now: Instant) {
        self.last = Some(now);
    }

    /// Forget the activity clock. Called on every exit from the
    /// authenticated state; the clock is meaningless while logged out.
    pub fn reset(&mut self) {
        self.last = None;
    }

    pub fn last_activity(&self) -> Option<Instant> {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_event_is_admitted() {
        let mut throttle = ActivityThrottle::new(Duration::from_secs(1));
        assert!(throttle.admit(Instant::now()));
    }

    #[test]
    fn events_within_window_are_coalesced() {
        let mut throttle = ActivityThrottle::new(Duration::from_secs(1));
        let t0 = Instant::now();
        assert!(throttle.admit(t0));
        assert!(!throttle.admit(t0 + Duration::from_millis(200)));
        assert!(!throttle.admit(t0 + Duration::from_millis(999)));
        // The rejected events must not advance the clock
        assert_eq!(throttle.last_activity(), Some(t0));
    }

    #[test]
    fn events_past_window_are_admitted() {
        let mut throttle = ActivityThrottle::new(Duration::from_secs(1));
        let t0 = Instant::now();
        assert!(throttle.admit(t0));
        let t1 = t0 + Duration::from_secs(1);
        assert!(throttle.admit(t1));
        assert_eq!(throttle.last_activity(), Some(t1));
    }

    #[test]
    fn touch_bypasses_the_throttle() {
        let mut throttle = ActivityThrottle::new(Duration::from_secs(1));
        let t0 = Instant::now();
        assert!(throttle.admit(t0));
        let t1 = t0 + Duration::from_millis(100);
        throttle.touch(t1);
        assert_eq!(throttle.last_activity(), Some(t1));
    }

    #[test]
    fn reset_clears_the_clock() {
        let mut throttle = ActivityThrottle::new(Duration::from_secs(1));
        throttle.admit(Instant::now());
        throttle.reset();
        assert_eq!(throttle.last_activity(), None);
        // And the next event is admitted as if fresh
        assert!(throttle.admit(Instant::now()));
    }
}
