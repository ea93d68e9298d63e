//! Notification delivery.

use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyCategory {
    Order,
    Payment,
    Driver,
    Delivery,
    ActionFailed,
}

impl std::fmt::Display for NotifyCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            NotifyCategory::Order => "order",
            NotifyCategory::Payment => "payment",
            NotifyCategory::Driver => "driver",
            NotifyCategory::Delivery => "delivery",
            NotifyCategory::ActionFailed => "action-failed",
        };
        write!(f, "{}", s)
    }
}

/// Destination for user-facing notifications. The default sink logs; a UI
/// layer would swap in its own implementation.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, category: NotifyCategory, message: &str);
}

pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify(&self, category: NotifyCategory, message: &str) {
        info!("[Notify:{}] {}", category, message);
    }
}
