//! The merge reducer
//!
//! Single code path for every state mutation, regardless of whether
//! the patch came from a socket event, a REST read or a confirmed user
//! action. Pure given `(current, incoming)`; the store applies the
//! result atomically.
//!
//! Field reducers:
//! - `owner_id`, `driver_id`, `payment_status`: incoming wins when
//!   present and non-empty
//! - `line_items`: incoming wins only when non-empty (an empty list is
//!   the "unknown" sentinel)
//! - `total_amount`: incoming wins only when well-formed (patch
//!   construction already rejects NaN/negative)
//! - `lifecycle_status`: higher rank wins; `assigned` additionally
//!   requires a driver id in the merged record
//! - `display_name`, `is_awaiting_driver`: always recomputed

use crate::domain::{LifecycleStatus, Order, OrderPatch};
use chrono::{DateTime, Utc};

/// Outcome of one merge
#[derive(Debug, Clone)]
pub struct MergeResult {
    pub order: Order,
    /// `(old, new)` when the lifecycle status actually moved
    pub transition: Option<(LifecycleStatus, LifecycleStatus)>,
    /// The incoming status ranked below the held one and was dropped
    pub stale_status: bool,
}

/// Merge a partial payload into the current record, or synthesize a
/// new record with safe defaults when none exists
///
/// Callers gate synthesis: a partial payload for an unknown order must
/// be rejected upstream, never fabricated here from insufficient data.
pub fn merge(
    id: &str,
    current: Option<&Order>,
    incoming: &OrderPatch,
    viewer_id: Option<&str>,
    now: DateTime<Utc>,
) -> MergeResult {
    let mut order = match current {
        Some(existing) => existing.clone(),
        None => Order {
            id: id.to_string(),
            owner_id: incoming.owner_id.clone().unwrap_or_default(),
            display_name: String::new(),
            line_items: Vec::new(),
            total_amount: 0.0,
            lifecycle_status: LifecycleStatus::Pending,
            driver_id: None,
            payment_status: None,
            is_awaiting_driver: false,
            updated_at: now,
        },
    };

    if let Some(owner) = incoming.owner_id.as_deref() {
        if !owner.is_empty() {
            order.owner_id = owner.to_string();
        }
    }
    if let Some(driver) = incoming.driver_id.as_deref() {
        if !driver.is_empty() {
            order.driver_id = Some(driver.to_string());
        }
    }
    if let Some(payment) = incoming.payment_status {
        order.payment_status = Some(payment);
    }
    if let Some(items) = incoming.line_items.as_ref() {
        if !items.is_empty() {
            order.line_items = items.clone();
        }
    }
    if let Some(total) = incoming.total_amount {
        if total.is_finite() && total >= 0.0 {
            order.total_amount = total;
        }
    }

    let held = order.lifecycle_status;
    let mut transition = None;
    let mut stale_status = false;
    if let Some(claimed) = incoming.lifecycle_status {
        if claimed > held {
            // Driver assignment is atomic with its transition: no
            // driver id in the merged record, no assigned status
            if claimed == LifecycleStatus::Assigned && order.driver_id.is_none() {
                stale_status = true;
            } else {
                order.lifecycle_status = claimed;
                transition = Some((held, claimed));
            }
        } else if claimed < held {
            stale_status = true;
        }
    }

    order.updated_at = now;
    order.recompute_derived(viewer_id);

    MergeResult {
        order,
        transition,
        stale_status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PaymentStatus;

    fn base_order() -> Order {
        merge(
            "o1",
            None,
            &OrderPatch {
                owner_id: Some("u1".to_string()),
                line_items: Some(vec!["Burger".to_string(), "Coke".to_string()]),
                total_amount: Some(11.0),
                lifecycle_status: Some(LifecycleStatus::Pending),
                ..Default::default()
            },
            Some("u1"),
            Utc::now(),
        )
        .order
    }

    #[test]
    fn synthesizes_with_safe_defaults() {
        let result = merge("o9", None, &OrderPatch::default(), None, Utc::now());
        let order = result.order;
        assert_eq!(order.id, "o9");
        assert_eq!(order.lifecycle_status, LifecycleStatus::Pending);
        assert!(order.line_items.is_empty());
        assert_eq!(order.total_amount, 0.0);
        assert_eq!(order.driver_id, None);
    }

    #[test]
    fn status_never_regresses() {
        let mut order = base_order();
        order.lifecycle_status = LifecycleStatus::Assigned;
        order.driver_id = Some("d1".to_string());

        let result = merge(
            "o1",
            Some(&order),
            &OrderPatch {
                lifecycle_status: Some(LifecycleStatus::Pending),
                total_amount: Some(15.0),
                ..Default::default()
            },
            Some("u1"),
            Utc::now(),
        );

        // Stale status dropped, the rest of the patch still applied
        assert_eq!(result.order.lifecycle_status, LifecycleStatus::Assigned);
        assert!(result.stale_status);
        assert_eq!(result.transition, None);
        assert_eq!(result.order.total_amount, 15.0);
    }

    #[test]
    fn delivered_is_terminal() {
        let mut order = base_order();
        order.lifecycle_status = LifecycleStatus::Delivered;

        let result = merge(
            "o1",
            Some(&order),
            &OrderPatch {
                lifecycle_status: Some(LifecycleStatus::Assigned),
                ..Default::default()
            },
            Some("u1"),
            Utc::now(),
        );
        assert_eq!(result.order.lifecycle_status, LifecycleStatus::Delivered);
        assert!(result.stale_status);
    }

    #[test]
    fn empty_items_never_clobber_known_items() {
        let order = base_order();
        let result = merge(
            "o1",
            Some(&order),
            &OrderPatch {
                line_items: Some(vec![]),
                ..Default::default()
            },
            Some("u1"),
            Utc::now(),
        );
        assert_eq!(result.order.line_items, order.line_items);
    }

    #[test]
    fn absent_fields_keep_current_values() {
        let mut order = base_order();
        order.driver_id = Some("d1".to_string());
        order.payment_status = Some(PaymentStatus::Paid);

        let result = merge("o1", Some(&order), &OrderPatch::default(), Some("u1"), Utc::now());
        assert_eq!(result.order.driver_id.as_deref(), Some("d1"));
        assert_eq!(result.order.payment_status, Some(PaymentStatus::Paid));
        assert_eq!(result.order.owner_id, "u1");
    }

    #[test]
    fn assigned_requires_driver_id() {
        let mut order = base_order();
        order.lifecycle_status = LifecycleStatus::Paid;

        // No driver anywhere: transition refused
        let refused = merge(
            "o1",
            Some(&order),
            &OrderPatch {
                lifecycle_status: Some(LifecycleStatus::Assigned),
                ..Default::default()
            },
            Some("u1"),
            Utc::now(),
        );
        assert_eq!(refused.order.lifecycle_status, LifecycleStatus::Paid);
        assert!(refused.stale_status);

        // Driver arrives with the transition: accepted atomically
        let accepted = merge(
            "o1",
            Some(&order),
            &OrderPatch {
                lifecycle_status: Some(LifecycleStatus::Assigned),
                driver_id: Some("d1".to_string()),
                ..Default::default()
            },
            Some("u1"),
            Utc::now(),
        );
        assert_eq!(accepted.order.lifecycle_status, LifecycleStatus::Assigned);
        assert_eq!(
            accepted.transition,
            Some((LifecycleStatus::Paid, LifecycleStatus::Assigned))
        );
        assert!(!accepted.order.is_awaiting_driver);
    }

    #[test]
    fn awaiting_driver_derivation() {
        let order = base_order();
        let paid = merge(
            "o1",
            Some(&order),
            &OrderPatch {
                lifecycle_status: Some(LifecycleStatus::Paid),
                payment_status: Some(PaymentStatus::Paid),
                ..Default::default()
            },
            Some("u1"),
            Utc::now(),
        );
        assert!(paid.order.is_awaiting_driver);
        assert_eq!(
            paid.transition,
            Some((LifecycleStatus::Pending, LifecycleStatus::Paid))
        );
    }

    #[test]
    fn merge_is_idempotent() {
        let order = base_order();
        let patch = OrderPatch {
            lifecycle_status: Some(LifecycleStatus::Paid),
            payment_status: Some(PaymentStatus::Paid),
            total_amount: Some(11.0),
            ..Default::default()
        };
        let now = Utc::now();

        let once = merge("o1", Some(&order), &patch, Some("u1"), now);
        let twice = merge("o1", Some(&once.order), &patch, Some("u1"), now);

        assert_eq!(once.order.lifecycle_status, twice.order.lifecycle_status);
        assert_eq!(once.order.line_items, twice.order.line_items);
        assert_eq!(once.order.total_amount, twice.order.total_amount);
        assert_eq!(once.order.payment_status, twice.order.payment_status);
        // Second application is a no-op, not a second transition
        assert_eq!(twice.transition, None);
    }
}
