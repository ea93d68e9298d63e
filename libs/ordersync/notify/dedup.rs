//! Suppression of repeated notifications.
//!
//! A creation announcement for an order should fire once even if the
//! creation event is replayed after a reconnect, so creations get a long
//! window. Rapid-fire update chatter gets a short one.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::events::EventKind;

const EVICT_THRESHOLD: usize = 1024;

pub struct NotificationDeduplicator {
    creation_window: Duration,
    update_window: Duration,
    last_seen: HashMap<(String, EventKind), Instant>,
}

impl NotificationDeduplicator {
    pub fn new(creation_window: Duration, update_window: Duration) -> Self {
        Self {
            creation_window,
            update_window,
            last_seen: HashMap::new(),
        }
    }

    /// Windows matching the production defaults.
    pub fn with_defaults() -> Self {
        Self::new(Duration::from_secs(60), Duration::from_secs(6))
    }

    /// Decide whether a notification for `(order_id, kind)` may fire at
    /// `now`, recording it if so. Kinds with no window always fire.
    pub fn should_notify(&mut self, order_id: &str, kind: EventKind, now: Instant) -> bool {
        let Some(window) = self.window_for(kind) else {
            return true;
        };

        let key = (order_id.to_string(), kind);
        if let Some(last) = self.last_seen.get(&key) {
            if now.saturating_duration_since(*last) < window {
                return false;
            }
        }
        self.last_seen.insert(key, now);
        self.maybe_evict(now);
        true
    }

    fn window_for(&self, kind: EventKind) -> Option<Duration> {
        match kind {
            // Milestones announce once per window even when replayed
            EventKind::OrderCreated
            | EventKind::DriverAssigned
            | EventKind::PaymentCompleted
            | EventKind::DeliveryCompleted
            | EventKind::OrderDeleted => Some(self.creation_window),
            // Churn gets the short window
            EventKind::OrderUpdated | EventKind::DriverPending | EventKind::DriverFailed => {
                Some(self.update_window)
            }
            EventKind::Unknown => None,
        }
    }

    fn maybe_evict(&mut self, now: Instant) {
        if self.last_seen.len() < EVICT_THRESHOLD {
            return;
        }
        let horizon = self.creation_window.max(self.update_window);
        self.last_seen
            .retain(|_, last| now.saturating_duration_since(*last) < horizon);
    }
}
