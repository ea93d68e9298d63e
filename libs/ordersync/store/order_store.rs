//! Order Store - the single mutable view of the order collection
//!
//! Holds one record per order id plus an explicit display sequence
//! (most-recent-first: creations surface at the front, merges never
//! reorder). Every mutation goes through the merge reducer; there is
//! no field-level write access from outside.
//!
//! Lock discipline follows the rest of the codebase: callers take the
//! write lock for exactly one read-modify-write, get a `MergeOutcome`
//! back, and fire notifications outside the lock.

use super::merge::merge;
use crate::client::OrderRecord;
use crate::domain::{LifecycleStatus, Order, OrderPatch};
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// Thread-safe shared store
pub type SharedOrderStore = Arc<RwLock<OrderStore>>;

/// What one atomic store update did
#[derive(Debug, Clone)]
pub enum MergeOutcome {
    /// A new record was created and surfaced at the front
    Created(Order),
    Updated {
        order: Order,
        /// `(old, new)` when the lifecycle status moved
        transition: Option<(LifecycleStatus, LifecycleStatus)>,
        /// A lower-ranked incoming status was dropped
        stale_status: bool,
    },
    /// Existing-only apply found no record; nothing happened
    Unknown,
}

impl MergeOutcome {
    pub fn order(&self) -> Option<&Order> {
        match self {
            MergeOutcome::Created(order) => Some(order),
            MergeOutcome::Updated { order, .. } => Some(order),
            MergeOutcome::Unknown => None,
        }
    }
}

/// In-memory order collection with deterministic merge semantics
pub struct OrderStore {
    orders: HashMap<String, Order>,
    /// Display sequence, front = most recently observed
    sequence: VecDeque<String>,
    viewer_id: Option<String>,
}

impl OrderStore {
    pub fn new(viewer_id: Option<String>) -> Self {
        Self {
            orders: HashMap::new(),
            sequence: VecDeque::new(),
            viewer_id,
        }
    }

    /// Apply an event payload; creates the record when absent
    ///
    /// Only call this for payloads the resolver judged authoritative;
    /// partial payloads go through [`Self::apply_event_existing_only`].
    pub fn apply_event(&mut self, id: &str, patch: &OrderPatch) -> MergeOutcome {
        let current = self.orders.get(id);
        let created = current.is_none();
        let result = merge(id, current, patch, self.viewer_id.as_deref(), Utc::now());

        if created {
            self.sequence.push_front(id.to_string());
        }
        self.orders.insert(id.to_string(), result.order.clone());

        if created {
            MergeOutcome::Created(result.order)
        } else {
            MergeOutcome::Updated {
                order: result.order,
                transition: result.transition,
                stale_status: result.stale_status,
            }
        }
    }

    /// Apply a partial payload against an existing record only
    ///
    /// Never fabricates a row: a partial event for an order we do not
    /// hold resolves to [`MergeOutcome::Unknown`].
    pub fn apply_event_existing_only(&mut self, id: &str, patch: &OrderPatch) -> MergeOutcome {
        if !self.orders.contains_key(id) {
            return MergeOutcome::Unknown;
        }
        self.apply_event(id, patch)
    }

    /// Feed a confirmed REST record through the same merge path
    pub fn apply_write_result(&mut self, record: &OrderRecord) -> MergeOutcome {
        let patch = OrderPatch::from(record);
        self.apply_event(&record.id, &patch)
    }

    /// Remove a record entirely (explicit deletion only)
    pub fn remove(&mut self, id: &str) -> Option<Order> {
        let removed = self.orders.remove(id);
        if removed.is_some() {
            self.sequence.retain(|entry| entry != id);
        }
        removed
    }

    pub fn get(&self, id: &str) -> Option<&Order> {
        self.orders.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.orders.contains_key(id)
    }

    /// Orders in display sequence, most recently observed first
    pub fn snapshot(&self) -> Vec<Order> {
        self.sequence
            .iter()
            .filter_map(|id| self.orders.get(id))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn created_patch(owner: &str, items: &[&str], total: f64) -> OrderPatch {
        OrderPatch {
            owner_id: Some(owner.to_string()),
            line_items: Some(items.iter().map(|s| s.to_string()).collect()),
            total_amount: Some(total),
            lifecycle_status: Some(LifecycleStatus::Pending),
            ..Default::default()
        }
    }

    #[test]
    fn one_entry_per_id() {
        let mut store = OrderStore::new(None);
        store.apply_event("o1", &created_patch("u1", &["Burger"], 8.0));
        store.apply_event("o1", &created_patch("u1", &["Burger"], 8.0));
        assert_eq!(store.len(), 1);
        assert_eq!(store.snapshot().len(), 1);
    }

    #[test]
    fn creations_surface_at_front_merges_keep_position() {
        let mut store = OrderStore::new(None);
        store.apply_event("o1", &created_patch("u1", &["Burger"], 8.0));
        store.apply_event("o2", &created_patch("u2", &["Pizza"], 12.0));
        store.apply_event("o3", &created_patch("u3", &["Coke"], 2.0));

        let ids: Vec<String> = store.snapshot().iter().map(|o| o.id.clone()).collect();
        assert_eq!(ids, vec!["o3", "o2", "o1"]);

        // Merging o1 must not move it to the front
        store.apply_event(
            "o1",
            &OrderPatch {
                total_amount: Some(9.0),
                ..Default::default()
            },
        );
        let ids: Vec<String> = store.snapshot().iter().map(|o| o.id.clone()).collect();
        assert_eq!(ids, vec!["o3", "o2", "o1"]);
    }

    #[test]
    fn existing_only_rejects_unknown_orders() {
        let mut store = OrderStore::new(None);
        let outcome = store.apply_event_existing_only(
            "ghost",
            &OrderPatch {
                driver_id: Some("d1".to_string()),
                ..Default::default()
            },
        );
        assert!(matches!(outcome, MergeOutcome::Unknown));
        assert!(store.is_empty());
    }

    #[test]
    fn remove_clears_record_and_sequence() {
        let mut store = OrderStore::new(None);
        store.apply_event("o1", &created_patch("u1", &["Burger"], 8.0));
        store.apply_event("o2", &created_patch("u2", &["Pizza"], 12.0));

        assert!(store.remove("o1").is_some());
        assert!(!store.contains("o1"));
        let ids: Vec<String> = store.snapshot().iter().map(|o| o.id.clone()).collect();
        assert_eq!(ids, vec!["o2"]);

        // Removing again is a no-op
        assert!(store.remove("o1").is_none());
    }

    #[test]
    fn write_results_funnel_through_merge() {
        let mut store = OrderStore::new(Some("u1".to_string()));
        store.apply_event("o1", &created_patch("u1", &["Burger"], 8.0));

        let record = OrderRecord {
            id: "o1".to_string(),
            user_id: "u1".to_string(),
            items: vec![],
            total: None,
            status: "pending".to_string(),
            payment_status: None,
            driver_id: None,
        };
        let outcome = store.apply_write_result(&record);

        // Empty items in the record must not clear the held ones
        let order = outcome.order().unwrap();
        assert_eq!(order.line_items, vec!["Burger".to_string()]);
        assert_eq!(order.display_name, "You");
    }

    #[test]
    fn outcome_reports_transition() {
        let mut store = OrderStore::new(None);
        store.apply_event("o1", &created_patch("u1", &["Burger"], 8.0));
        let outcome = store.apply_event(
            "o1",
            &OrderPatch {
                lifecycle_status: Some(LifecycleStatus::Paid),
                ..Default::default()
            },
        );
        match outcome {
            MergeOutcome::Updated { transition, .. } => {
                assert_eq!(
                    transition,
                    Some((LifecycleStatus::Pending, LifecycleStatus::Paid))
                );
            }
            other => panic!("expected update, got {:?}", other),
        }
    }
}
