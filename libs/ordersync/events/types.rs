//! Canonical event types
//!
//! Inbound frames are reduced to exactly one of these shapes at the
//! normalization boundary; nothing downstream ever sniffs raw JSON.

use crate::domain::{LifecycleStatus, OrderPatch};
use chrono::{DateTime, Utc};
use thiserror::Error;

// =============================================================================
// Event Kind
// =============================================================================

/// Closed set of recognized event kinds
///
/// `Unknown` is kept (not discarded) when the frame still carries a
/// resolvable order id; it is logged and produces no store mutation or
/// notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    OrderCreated,
    OrderUpdated,
    DriverAssigned,
    DriverPending,
    DriverFailed,
    PaymentCompleted,
    DeliveryCompleted,
    OrderDeleted,
    Unknown,
}

impl EventKind {
    pub fn from_str(s: &str) -> Self {
        match s {
            "order.created" => EventKind::OrderCreated,
            "order.updated" => EventKind::OrderUpdated,
            "driver.assigned" => EventKind::DriverAssigned,
            "driver.pending" => EventKind::DriverPending,
            "driver.failed" => EventKind::DriverFailed,
            "payment.completed" => EventKind::PaymentCompleted,
            "delivery.completed" => EventKind::DeliveryCompleted,
            "order.deleted" => EventKind::OrderDeleted,
            _ => EventKind::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::OrderCreated => "order.created",
            EventKind::OrderUpdated => "order.updated",
            EventKind::DriverAssigned => "driver.assigned",
            EventKind::DriverPending => "driver.pending",
            EventKind::DriverFailed => "driver.failed",
            EventKind::PaymentCompleted => "payment.completed",
            EventKind::DeliveryCompleted => "delivery.completed",
            EventKind::OrderDeleted => "order.deleted",
            EventKind::Unknown => "unknown",
        }
    }

    /// Status transition implied by the kind itself, independent of
    /// whatever the payload claims
    ///
    /// `driver.pending` / `driver.failed` deliberately imply nothing:
    /// they only drive the awaiting-driver signal and their own
    /// notification category.
    pub fn implied_status(&self) -> Option<LifecycleStatus> {
        match self {
            EventKind::PaymentCompleted => Some(LifecycleStatus::Paid),
            EventKind::DriverAssigned => Some(LifecycleStatus::Assigned),
            EventKind::DeliveryCompleted => Some(LifecycleStatus::Delivered),
            _ => None,
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Envelope / Discard
// =============================================================================

/// Normalized wrapper around one inbound event
#[derive(Debug, Clone, PartialEq)]
pub struct EventEnvelope {
    pub kind: EventKind,
    pub order_id: String,
    pub patch: OrderPatch,
    pub received_at: DateTime<Utc>,
}

/// Why a raw frame was dropped at the normalization boundary
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    #[error("body is not a JSON object")]
    UnparsableBody,

    #[error("no event kind field")]
    UnknownKind,

    #[error("no resolvable order id")]
    MissingOrderId,
}
