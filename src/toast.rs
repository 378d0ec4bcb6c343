use std::time::{Duration, Instant};

pub const TOAST_DURATION: Duration = Duration::from_millis(2000);
pub const QUIET_THRESHOLD: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastMessage {
    pub text: String,
    pub timestamp: i64,
}

/// Single-slot notification that hides itself after a fixed duration.
///
/// Every trigger is counted. Once the count passes the threshold the toaster
/// goes quiet for the rest of the session and drops all further messages.
#[derive(Debug)]
pub struct Toaster {
    current: Option<(ToastMessage, Instant)>,
    triggered: u32,
    threshold: u32,
    duration: Duration,
}

impl Default for Toaster {
    fn default() -> Self {
        Self::new(TOAST_DURATION)
    }
}

impl Toaster {
    pub fn new(duration: Duration) -> Self {
        Self {
            current: None,
            triggered: 0,
            threshold: QUIET_THRESHOLD,
            duration,
        }
    }

    pub fn suppress_after_threshold(&mut self, count: u32) {
        self.threshold = count;
    }

    /// Replace the live message and restart its timer.
    ///
    /// Returns whether the message is displayed.
    pub fn show(&mut self, text: impl Into<String>, timestamp: i64, now: Instant) -> bool {
        self.triggered = self.triggered.saturating_add(1);
        if self.is_quiet() {
            self.current = None;
            tracing::debug!("Quiet mode, dropping notification #{}", self.triggered);
            return false;
        }

        self.current = Some((
            ToastMessage {
                text: text.into(),
                timestamp,
            },
            now,
        ));
        true
    }

    pub fn visible(&self, now: Instant) -> Option<&ToastMessage> {
        self.current
            .as_ref()
            .filter(|(_, shown_at)| now.saturating_duration_since(*shown_at) < self.duration)
            .map(|(message, _)| message)
    }

    /// Time until the live message hides, for scheduling a repaint.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.current
            .as_ref()
            .map(|(_, shown_at)| self.duration.saturating_sub(now.saturating_duration_since(*shown_at)))
            .filter(|left| !left.is_zero())
    }

    pub fn is_quiet(&self) -> bool {
        self.triggered > self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_expires_after_duration() {
        let mut toaster = Toaster::default();
        let start = Instant::now();
        assert!(toaster.show("hi", 1, start));

        assert_eq!(toaster.visible(start + Duration::from_millis(1999)).map(|m| m.text.as_str()), Some("hi"));
        assert!(toaster.visible(start + TOAST_DURATION).is_none());
        assert!(toaster.remaining(start + TOAST_DURATION).is_none());
    }

    #[test]
    fn new_message_restarts_timer() {
        let mut toaster = Toaster::default();
        let start = Instant::now();
        toaster.show("first", 1, start);
        toaster.show("second", 2, start + Duration::from_millis(1500));

        let later = start + Duration::from_millis(2500);
        assert_eq!(toaster.visible(later).map(|m| m.text.as_str()), Some("second"));
    }

    #[test]
    fn sixth_trigger_enters_quiet_mode() {
        let mut toaster = Toaster::default();
        let now = Instant::now();

        for i in 0..5 {
            assert!(toaster.show("bad", i, now), "toast {} should show", i + 1);
        }
        assert!(!toaster.show("bad", 5, now));
        assert!(toaster.is_quiet());
        assert!(toaster.visible(now).is_none());
        assert!(!toaster.show("bad", 6, now));
    }

    #[test]
    fn custom_threshold() {
        let mut toaster = Toaster::default();
        toaster.suppress_after_threshold(1);
        let now = Instant::now();

        assert!(toaster.show("a", 0, now));
        assert!(!toaster.show("b", 1, now));
    }
}
