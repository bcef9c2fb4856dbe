//! Self-expiring error message.

use core_async::time::{Duration, Instant};

/// Default time an error stays visible.
pub const DEFAULT_ERROR_DISPLAY: Duration = Duration::from_secs(8);

/// The single error message currently shown to the user.
///
/// A non-empty message expires `display_for` after the [`set`](Self::set)
/// that produced it. Each `set` moves the deadline, so an expiry check
/// against an older deadline can never wipe a newer message. Reads are
/// evaluated lazily against the monotonic clock; the owner also calls
/// [`expire_if_due`](Self::expire_if_due) when its timer for
/// [`deadline`](Self::deadline) fires.
#[derive(Debug, Clone)]
pub struct ErrorSignal {
    message: String,
    expires_at: Option<Instant>,
    display_for: Duration,
}

impl Default for ErrorSignal {
    fn default() -> Self {
        Self::new(DEFAULT_ERROR_DISPLAY)
    }
}

impl ErrorSignal {
    pub fn new(display_for: Duration) -> Self {
        Self {
            message: String::new(),
            expires_at: None,
            display_for,
        }
    }

    /// Replace the message and re-arm expiry. An empty message clears.
    pub fn set(&mut self, message: impl Into<String>) {
        let message = message.into();
        if message.is_empty() {
            self.clear();
            return;
        }
        self.message = message;
        self.expires_at = Some(Instant::now() + self.display_for);
    }

    /// Drop the message and disarm expiry.
    pub fn clear(&mut self) {
        self.message.clear();
        self.expires_at = None;
    }

    /// The visible message, or `""` if none or expired.
    pub fn message(&self) -> &str {
        self.message_at(Instant::now())
    }

    pub fn message_at(&self, now: Instant) -> &str {
        match self.expires_at {
            Some(deadline) if now >= deadline => "",
            _ => &self.message,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.message().is_empty()
    }

    /// When the current message expires, if one is armed.
    pub fn deadline(&self) -> Option<Instant> {
        self.expires_at
    }

    /// Clear the message if its deadline has passed. Returns `true` if a
    /// message was cleared.
    pub fn expire_if_due(&mut self, now: Instant) -> bool {
        match self.expires_at {
            Some(deadline) if now >= deadline => {
                self.clear();
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    #[tokio::test(start_paused = true)]
    async fn message_expires_exactly_after_display_duration() {
        let mut signal = ErrorSignal::default();
        signal.set("boom");

        advance(Duration::from_millis(7_999)).await;
        assert_eq!(signal.message(), "boom");

        advance(Duration::from_millis(1)).await;
        assert_eq!(signal.message(), "");
        assert!(signal.expire_if_due(Instant::now()));
        assert!(signal.deadline().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn newer_set_supersedes_older_deadline() {
        let mut signal = ErrorSignal::default();
        signal.set("first");
        let first_deadline = signal.deadline().unwrap();

        advance(Duration::from_secs(5)).await;
        signal.set("second");

        // Old deadline passes; the newer message must survive.
        advance(Duration::from_secs(3)).await;
        assert!(Instant::now() >= first_deadline);
        assert!(!signal.expire_if_due(Instant::now()));
        assert_eq!(signal.message(), "second");

        advance(Duration::from_secs(5)).await;
        assert!(signal.expire_if_due(Instant::now()));
        assert_eq!(signal.message(), "");
    }

    #[tokio::test(start_paused = true)]
    async fn clear_disarms_expiry() {
        let mut signal = ErrorSignal::default();
        signal.set("boom");
        signal.clear();

        assert!(signal.deadline().is_none());
        assert!(!signal.is_active());

        signal.set("");
        assert!(signal.deadline().is_none());
    }
}
