//! Event normalization boundary
//!
//! Historically the backend services have emitted the same logical
//! events under several envelope layouts: the kind under `type`,
//! `event_type`, `event` or `kind`; the business data inline or nested
//! under `data`/`payload`; the order id as `order_id`, `orderId` or
//! plain `id`. All of that tolerance lives here and only here.
//!
//! `normalize` is a pure function: no I/O, and the same input always
//! yields the same envelope or discard reason.

use crate::domain::{order::parse_amount, LifecycleStatus, OrderPatch, PaymentStatus};
use crate::events::types::{DiscardReason, EventEnvelope, EventKind};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/// Field names that have carried the event kind across revisions
const KIND_FIELDS: &[&str] = &["type", "event_type", "event", "kind"];

/// Field names that have carried the order id across revisions
const ORDER_ID_FIELDS: &[&str] = &["order_id", "orderId", "id"];

/// Normalize one raw frame into a canonical envelope
pub fn normalize(raw: &str, received_at: DateTime<Utc>) -> Result<EventEnvelope, DiscardReason> {
    let value: Value = serde_json::from_str(raw).map_err(|_| DiscardReason::UnparsableBody)?;
    let root = value.as_object().ok_or(DiscardReason::UnparsableBody)?;

    let kind_str = first_string(root, KIND_FIELDS).ok_or(DiscardReason::UnknownKind)?;
    let kind = EventKind::from_str(&kind_str);

    let payload = root
        .get("data")
        .and_then(Value::as_object)
        .or_else(|| root.get("payload").and_then(Value::as_object))
        .unwrap_or(root);

    // Payload first; the envelope root's `id` is usually the event id,
    // so it is only a last resort
    let order_id = first_string(payload, ORDER_ID_FIELDS)
        .or_else(|| first_string(root, ORDER_ID_FIELDS))
        .filter(|id| !id.is_empty())
        .ok_or(DiscardReason::MissingOrderId)?;

    let mut patch = patch_from_payload(payload);
    apply_kind_implications(&mut patch, kind);

    Ok(EventEnvelope {
        kind,
        order_id,
        patch,
        received_at,
    })
}

/// First non-empty string under any of the candidate keys
fn first_string(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| obj.get(*k).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// Extract the partial order fields from a payload object
fn patch_from_payload(payload: &Map<String, Value>) -> OrderPatch {
    OrderPatch {
        owner_id: first_string(payload, &["user_id", "owner_id", "userId"]),
        line_items: payload
            .get("items")
            .or_else(|| payload.get("line_items"))
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            }),
        total_amount: payload
            .get("total_amount")
            .or_else(|| payload.get("total"))
            .and_then(parse_amount),
        lifecycle_status: first_string(payload, &["status", "lifecycle_status"])
            .and_then(|s| LifecycleStatus::from_str(&s)),
        driver_id: first_string(payload, &["driver_id", "driverId"]),
        payment_status: first_string(payload, &["payment_status"])
            .and_then(|s| PaymentStatus::from_str(&s)),
    }
}

/// Overlay the transition implied by the event kind onto the payload's
/// own claims, keeping whichever status ranks higher
fn apply_kind_implications(patch: &mut OrderPatch, kind: EventKind) {
    if let Some(implied) = kind.implied_status() {
        patch.lifecycle_status = Some(match patch.lifecycle_status {
            Some(claimed) if claimed > implied => claimed,
            _ => implied,
        });
    }
    if kind == EventKind::PaymentCompleted && patch.payment_status.is_none() {
        patch.payment_status = Some(PaymentStatus::Paid);
    }
}
