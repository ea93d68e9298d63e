//! Core order domain types
//!
//! `Order` is the record held by the store; `OrderPatch` is the
//! partial view carried by events and write results. Patches never
//! touch the store directly, they go through the merge reducer.

use chrono::{DateTime, Utc};

/// Label shown for orders owned by the current viewer
const SELF_LABEL: &str = "You";

// =============================================================================
// Lifecycle Status
// =============================================================================

/// Lifecycle stage of an order
///
/// Totally ordered; merges only ever move forward along this order.
/// `Delivered` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LifecycleStatus {
    Pending,
    Paid,
    Assigned,
    Delivered,
}

impl LifecycleStatus {
    /// Integer rank used for regression checks
    pub fn rank(&self) -> u8 {
        match self {
            LifecycleStatus::Pending => 0,
            LifecycleStatus::Paid => 1,
            LifecycleStatus::Assigned => 2,
            LifecycleStatus::Delivered => 3,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, LifecycleStatus::Delivered)
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(LifecycleStatus::Pending),
            "paid" => Some(LifecycleStatus::Paid),
            "assigned" => Some(LifecycleStatus::Assigned),
            "delivered" => Some(LifecycleStatus::Delivered),
            _ => None,
        }
    }
}

impl std::fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecycleStatus::Pending => write!(f, "pending"),
            LifecycleStatus::Paid => write!(f, "paid"),
            LifecycleStatus::Assigned => write!(f, "assigned"),
            LifecycleStatus::Delivered => write!(f, "delivered"),
        }
    }
}

// =============================================================================
// Payment Status
// =============================================================================

/// Secondary payment signal
///
/// Correlated with, but not identical to, the lifecycle status: the
/// two arrive via different event types and may briefly disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Unpaid,
    Paid,
    Failed,
}

impl PaymentStatus {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "unpaid" => Some(PaymentStatus::Unpaid),
            "paid" => Some(PaymentStatus::Paid),
            "failed" => Some(PaymentStatus::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Unpaid => write!(f, "unpaid"),
            PaymentStatus::Paid => write!(f, "paid"),
            PaymentStatus::Failed => write!(f, "failed"),
        }
    }
}

// =============================================================================
// Order
// =============================================================================

/// A single order as held by the store
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    /// Stable identifier assigned by the order service; never reassigned
    pub id: String,
    /// User who placed the order; immutable after creation
    pub owner_id: String,
    /// Derived label: "You" for the viewer's own orders, else the owner id
    pub display_name: String,
    /// Item identifiers; an empty incoming list means "unknown", not "cleared"
    pub line_items: Vec<String>,
    /// Non-negative, finite; only replaced by a well-formed numeric update
    pub total_amount: f64,
    pub lifecycle_status: LifecycleStatus,
    /// Present once a driver is assigned; only removed with the order
    pub driver_id: Option<String>,
    pub payment_status: Option<PaymentStatus>,
    /// Derived: paid but no driver yet
    pub is_awaiting_driver: bool,
    /// Bookkeeping only; status rank, not wall clock, orders merges
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Recompute the fields derived from the rest of the record
    pub fn recompute_derived(&mut self, viewer_id: Option<&str>) {
        self.display_name = if viewer_id == Some(self.owner_id.as_str()) {
            SELF_LABEL.to_string()
        } else {
            self.owner_id.clone()
        };
        self.is_awaiting_driver =
            self.lifecycle_status == LifecycleStatus::Paid && self.driver_id.is_none();
    }
}

// =============================================================================
// Order Patch
// =============================================================================

/// Partial order data from an event or a write result
///
/// `None` means "not mentioned", never "cleared". Construction sites
/// (the normalizer, REST record conversion) are responsible for
/// rejecting malformed numerics, so a patch never carries NaN or a
/// negative total.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderPatch {
    pub owner_id: Option<String>,
    pub line_items: Option<Vec<String>>,
    pub total_amount: Option<f64>,
    pub lifecycle_status: Option<LifecycleStatus>,
    pub driver_id: Option<String>,
    pub payment_status: Option<PaymentStatus>,
}

impl OrderPatch {
    /// Authoritative enough to merge without a supplementary fetch
    ///
    /// Requires a non-empty owner id, a non-empty line-item list and a
    /// numeric total.
    pub fn is_self_sufficient(&self) -> bool {
        self.owner_id.as_deref().is_some_and(|o| !o.is_empty())
            && self.line_items.as_ref().is_some_and(|i| !i.is_empty())
            && self.total_amount.is_some()
    }

    /// Overlay `top` onto `self`: fields present in `top` win
    ///
    /// Used by the resolver to layer an event's own fields over a
    /// freshly fetched record, since the event may be newer than the
    /// read.
    pub fn overlay(mut self, top: &OrderPatch) -> OrderPatch {
        if top.owner_id.is_some() {
            self.owner_id = top.owner_id.clone();
        }
        if top.line_items.as_ref().is_some_and(|i| !i.is_empty()) {
            self.line_items = top.line_items.clone();
        }
        if top.total_amount.is_some() {
            self.total_amount = top.total_amount;
        }
        if let Some(status) = top.lifecycle_status {
            // Keep the higher-ranked claim; the merge re-checks anyway
            self.lifecycle_status = Some(match self.lifecycle_status {
                Some(base) if base > status => base,
                _ => status,
            });
        }
        if top.driver_id.is_some() {
            self.driver_id = top.driver_id.clone();
        }
        if top.payment_status.is_some() {
            self.payment_status = top.payment_status;
        }
        self
    }
}

/// Parse a loose JSON amount into a safe total
///
/// Accepts numbers and numeric strings; rejects NaN, infinities and
/// negatives so corrupted numerics never reach the store.
pub fn parse_amount(value: &serde_json::Value) -> Option<f64> {
    let parsed = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    if parsed.is_finite() && parsed >= 0.0 {
        Some(parsed)
    } else {
        None
    }
}
