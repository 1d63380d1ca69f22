//! Single-slot ephemeral notification sink.
//!
//! Showing a new message while one is visible replaces it outright; there is
//! no backlog. Messages auto-dismiss after their TTL (checked lazily, the
//! same way the store checks expiry) or earlier by explicit dismissal. This
//! is a pure side-effect sink; nothing reads decisions back out of it.

use std::time::{Duration, Instant};

use crate::state::{NotificationEvent, Severity};

/// Default lifetime of a notification.
pub const DEFAULT_TTL: Duration = Duration::from_secs(6);

/// Holds at most one live notification.
#[derive(Debug)]
pub struct NotificationBus {
    current: Option<NotificationEvent>,
    default_ttl: Duration,
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationBus {
    /// Empty bus with the default TTL.
    pub fn new() -> Self {
        Self::with_default_ttl(DEFAULT_TTL)
    }

    /// Empty bus with a configured TTL for [`NotificationBus::notify`].
    pub fn with_default_ttl(default_ttl: Duration) -> Self {
        Self {
            current: None,
            default_ttl,
        }
    }

    /// Show `message` with the bus's default TTL, replacing any visible
    /// message.
    pub fn notify(&mut self, message: impl Into<String>, severity: Severity) {
        self.notify_with_ttl(message, severity, self.default_ttl);
    }

    /// Show `message` with an explicit TTL, replacing any visible message.
    pub fn notify_with_ttl(
        &mut self,
        message: impl Into<String>,
        severity: Severity,
        ttl: Duration,
    ) {
        let message = message.into();
        tracing::debug!(severity = severity.label(), %message, "notification");
        self.current = Some(NotificationEvent {
            message,
            severity,
            created_at: Instant::now(),
            ttl,
        });
    }

    /// Explicit user dismissal.
    pub fn dismiss(&mut self) {
        self.current = None;
    }

    /// The visible message, if any. Drops an expired message on the way out.
    pub fn current(&mut self) -> Option<&NotificationEvent> {
        self.current_at(Instant::now())
    }

    fn current_at(&mut self, now: Instant) -> Option<&NotificationEvent> {
        if self
            .current
            .as_ref()
            .is_some_and(|n| n.expired_at(now))
        {
            self.current = None;
        }
        self.current.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_write_wins_without_queueing() {
        let mut bus = NotificationBus::new();
        bus.notify("first", Severity::Info);
        bus.notify("second", Severity::Success);
        let n = bus.current().expect("visible");
        assert_eq!(n.message, "second");
        assert_eq!(n.severity, Severity::Success);
        bus.dismiss();
        assert!(bus.current().is_none());
    }

    #[test]
    fn message_auto_dismisses_after_ttl() {
        let mut bus = NotificationBus::new();
        bus.notify_with_ttl("soon gone", Severity::Warning, Duration::from_secs(6));
        let shown_at = bus.current.as_ref().expect("set").created_at;
        assert!(bus.current_at(shown_at + Duration::from_secs(5)).is_some());
        assert!(bus.current_at(shown_at + Duration::from_secs(7)).is_none());
        // Expiry cleared the slot, not just hid it.
        assert!(bus.current.is_none());
    }
}
