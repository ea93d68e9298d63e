//! User-facing notifications.
//!
//! The engine reports every accepted change through a `Notifier`, which
//! suppresses repeats via the deduplicator and hands the surviving messages
//! to a pluggable sink.

pub mod dedup;
pub mod sink;

use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use tracing::debug;

use crate::domain::Order;
use crate::events::EventKind;

pub use dedup::NotificationDeduplicator;
pub use sink::{LogSink, NotificationSink, NotifyCategory};

pub struct Notifier {
    dedup: Mutex<NotificationDeduplicator>,
    sink: Arc<dyn NotificationSink>,
}

impl Notifier {
    pub fn new(dedup: NotificationDeduplicator, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            dedup: Mutex::new(dedup),
            sink,
        }
    }

    /// Notify about an accepted event, unless the deduplicator says this
    /// order/kind pair fired too recently.
    pub fn event(&self, kind: EventKind, order: &Order) {
        if !self.dedup.lock().should_notify(&order.id, kind, Instant::now()) {
            debug!("[Notifier] suppressed repeat {} for {}", kind, order.id);
            return;
        }
        let message = message_for(kind, order);
        self.sink.notify(category_for(kind), &message);
    }

    /// Notify that a user-initiated action could not be applied.
    pub fn action_failed(&self, action: &str, order_id: &str, reason: &str) {
        let message = format!("Could not {} order {}: {}", action, order_id, reason);
        self.sink.notify(NotifyCategory::ActionFailed, &message);
    }
}

fn category_for(kind: EventKind) -> NotifyCategory {
    match kind {
        EventKind::PaymentCompleted => NotifyCategory::Payment,
        EventKind::DriverAssigned | EventKind::DriverPending | EventKind::DriverFailed => {
            NotifyCategory::Driver
        }
        EventKind::DeliveryCompleted => NotifyCategory::Delivery,
        _ => NotifyCategory::Order,
    }
}

fn message_for(kind: EventKind, order: &Order) -> String {
    match kind {
        EventKind::OrderCreated => {
            format!("{} placed an order ({} items)", order.display_name, order.line_items.len())
        }
        EventKind::OrderUpdated => format!("Order {} was updated", order.id),
        EventKind::OrderDeleted => format!("Order {} was cancelled", order.id),
        EventKind::PaymentCompleted => format!("Payment received for order {}", order.id),
        EventKind::DriverAssigned => match &order.driver_id {
            Some(driver) => format!("Driver {} assigned to order {}", driver, order.id),
            None => format!("Driver assigned to order {}", order.id),
        },
        EventKind::DriverPending => format!("Looking for a driver for order {}", order.id),
        EventKind::DriverFailed => format!("No driver available for order {}", order.id),
        EventKind::DeliveryCompleted => format!("Order {} was delivered", order.id),
        EventKind::Unknown => format!("Order {} changed", order.id),
    }
}
