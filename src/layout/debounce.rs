//! Resize debouncer.
//!
//! Coalesces a burst of resize events into a single relayout once the
//! burst has been quiet for the configured interval. Pure timing, no event
//! loop: callers pass `now` and decide how to wait.

use std::time::Duration;

use web_time::Instant;

#[derive(Debug, Clone)]
pub struct Debouncer {
    quiet: Duration,
    last_event: Option<Instant>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            last_event: None,
        }
    }

    /// Record an event. Returns true when it opened a new burst.
    pub fn notify(&mut self, now: Instant) -> bool {
        self.last_event.replace(now).is_none()
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.last_event.is_some()
    }

    pub fn is_ready(&self, now: Instant) -> bool {
        self.last_event
            .is_some_and(|last| now.saturating_duration_since(last) >= self.quiet)
    }

    /// Close the burst if it has been quiet long enough.
    pub fn take_if_ready(&mut self, now: Instant) -> bool {
        if self.is_ready(now) {
            self.last_event = None;
            true
        } else {
            false
        }
    }

    /// Time left until the current burst can fire.
    pub fn sleep_duration(&self, now: Instant) -> Option<Duration> {
        let last = self.last_event?;
        Some(
            self.quiet
                .saturating_sub(now.saturating_duration_since(last))
                .max(Duration::from_millis(1)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUIET: Duration = Duration::from_millis(150);

    #[test]
    fn test_burst_fires_once_after_quiet() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(QUIET);

        assert!(debouncer.notify(start));
        assert!(!debouncer.notify(start + Duration::from_millis(50)));
        assert!(!debouncer.notify(start + Duration::from_millis(100)));

        assert!(!debouncer.take_if_ready(start + Duration::from_millis(200)));
        assert!(debouncer.take_if_ready(start + Duration::from_millis(250)));
        assert!(!debouncer.is_pending());
        assert!(!debouncer.take_if_ready(start + Duration::from_millis(900)));
    }

    #[test]
    fn test_sleep_duration() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(QUIET);
        assert_eq!(debouncer.sleep_duration(start), None);

        debouncer.notify(start);
        assert_eq!(
            debouncer.sleep_duration(start + Duration::from_millis(100)),
            Some(Duration::from_millis(50))
        );
        assert_eq!(
            debouncer.sleep_duration(start + Duration::from_millis(400)),
            Some(Duration::from_millis(1))
        );
    }
}
