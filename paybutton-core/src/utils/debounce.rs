//! Leading plus trailing debounce.
//!
//! The first request runs immediately. Requests arriving inside the window
//! push the window out and collapse into one trailing run when it closes.
//! The debouncer only decides; the caller owns the trailing timer and calls
//! [`Debouncer::expire`] when it fires.

use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceAction {
    /// Run now (leading edge).
    Fire,
    /// Run once at the given deadline unless pushed out again.
    Defer(Instant),
}

#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    deadline: Option<Instant>,
    trailing: bool,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
            trailing: false,
        }
    }

    pub fn request(&mut self, now: Instant) -> DebounceAction {
        let deadline = now + self.window;
        match self.deadline {
            Some(open) if now < open => {
                self.deadline = Some(deadline);
                self.trailing = true;
                DebounceAction::Defer(deadline)
            }
            _ => {
                self.deadline = Some(deadline);
                self.trailing = false;
                DebounceAction::Fire
            }
        }
    }

    /// The trailing timer fired. Returns whether the trailing run is due.
    ///
    /// A timer firing before the current deadline belongs to a window that
    /// was pushed out and is ignored.
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                std::mem::take(&mut self.trailing)
            }
            _ => false,
        }
    }

    /// Forget any open window and pending trailing run.
    pub fn reset(&mut self) {
        self.deadline = None;
        self.trailing = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(250);

    #[test]
    fn test_first_request_fires_immediately() {
        let mut debouncer = Debouncer::new(WINDOW);
        let now = Instant::now();
        assert_eq!(debouncer.request(now), DebounceAction::Fire);
        // nothing was coalesced, so the window closes without a trailing run
        assert!(!debouncer.expire(now + WINDOW));
    }

    #[test]
    fn test_burst_coalesces_into_one_trailing_run() {
        let mut debouncer = Debouncer::new(WINDOW);
        let start = Instant::now();

        assert_eq!(debouncer.request(start), DebounceAction::Fire);
        let second = start + Duration::from_millis(100);
        assert_eq!(debouncer.request(second), DebounceAction::Defer(second + WINDOW));
        let third = start + Duration::from_millis(200);
        assert_eq!(debouncer.request(third), DebounceAction::Defer(third + WINDOW));

        // a timer armed for the second request is stale
        assert!(!debouncer.expire(second + WINDOW));
        assert!(debouncer.expire(third + WINDOW));
        assert!(!debouncer.expire(third + WINDOW));
    }

    #[test]
    fn test_request_after_window_is_leading_again() {
        let mut debouncer = Debouncer::new(WINDOW);
        let start = Instant::now();
        debouncer.request(start);
        debouncer.request(start + Duration::from_millis(50));
        assert!(debouncer.expire(start + Duration::from_millis(300)));

        let later = start + Duration::from_secs(1);
        assert_eq!(debouncer.request(later), DebounceAction::Fire);
    }

    #[test]
    fn test_reset_drops_pending_trailing_run() {
        let mut debouncer = Debouncer::new(WINDOW);
        let start = Instant::now();
        debouncer.request(start);
        debouncer.request(start + Duration::from_millis(10));
        debouncer.reset();
        assert!(!debouncer.expire(start + Duration::from_secs(1)));
        assert_eq!(debouncer.request(start + Duration::from_millis(20)), DebounceAction::Fire);
    }
}
