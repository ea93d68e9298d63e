//! Wire types for the order API.
//!
//! `OrderRecord` is what the backend returns for a single order. Write
//! operations take `OrderDraft` (create) or `OrderUpdate` (edit), both
//! serialized as-is into the request body.

use serde::{Deserialize, Serialize};

use crate::domain::{LifecycleStatus, OrderPatch, PaymentStatus};

// ============================================================================
// Read side
// ============================================================================

/// A full order as reported by the backend.
///
/// Optional fields tolerate older backends that omit them; a missing
/// field is treated as unknown rather than as a reset.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OrderRecord {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub items: Vec<String>,
    #[serde(default)]
    pub total: Option<f64>,
    pub status: String,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub driver_id: Option<String>,
}

impl From<&OrderRecord> for OrderPatch {
    fn from(record: &OrderRecord) -> Self {
        OrderPatch {
            owner_id: Some(record.user_id.clone()),
            line_items: if record.items.is_empty() {
                None
            } else {
                Some(record.items.clone())
            },
            total_amount: record.total,
            lifecycle_status: LifecycleStatus::from_str(&record.status),
            driver_id: record.driver_id.clone(),
            payment_status: record
                .payment_status
                .as_deref()
                .and_then(PaymentStatus::from_str),
        }
    }
}

// ============================================================================
// Write side
// ============================================================================

/// Body for creating a new order.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDraft {
    pub user_id: String,
    pub items: Vec<String>,
    pub total: f64,
}

/// Body for editing an existing order. Only the fields present are sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OrderUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}
