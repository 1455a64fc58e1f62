//! Deadline-based debouncing for coalesced saves.

use crate::{Duration, Instant};

/// Default delay for coalescing zoom-triggered saves.
pub const ZOOM_SAVE_DELAY: Duration = Duration::from_millis(1000);

/// Coalesces bursts of triggers into a single action.
///
/// Each trigger replaces any pending deadline, so only the last trigger of a
/// burst fires once the delay has elapsed without another trigger.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(ZOOM_SAVE_DELAY)
    }
}

impl Debouncer {
    /// Create a debouncer with the given delay.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// The configured delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// (Re)start the timer from `now`.
    pub fn trigger(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Drop any pending deadline.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Whether a deadline is pending.
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns true exactly once when the pending deadline has passed.
    pub fn fire_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_after_delay() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(100));

        debouncer.trigger(start);
        assert!(debouncer.is_pending());
        assert!(!debouncer.fire_due(start + Duration::from_millis(99)));
        assert!(debouncer.fire_due(start + Duration::from_millis(100)));
        assert!(!debouncer.is_pending());
        assert!(!debouncer.fire_due(start + Duration::from_millis(500)));
    }

    #[test]
    fn test_burst_coalesces() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(100));

        let mut fired = 0;
        for step in 0..10 {
            let now = start + Duration::from_millis(step * 50);
            if debouncer.fire_due(now) {
                fired += 1;
            }
            debouncer.trigger(now);
        }
        assert_eq!(fired, 0);

        let last = start + Duration::from_millis(9 * 50);
        assert!(!debouncer.fire_due(last + Duration::from_millis(50)));
        assert!(debouncer.fire_due(last + Duration::from_millis(100)));
    }

    #[test]
    fn test_cancel() {
        let start = Instant::now();
        let mut debouncer = Debouncer::default();
        debouncer.trigger(start);
        debouncer.cancel();
        assert!(!debouncer.fire_due(start + ZOOM_SAVE_DELAY * 2));
    }
}
