//! Authoritative resolver.
//!
//! Normalized events often carry partial payloads. Before such an event is
//! allowed to create an order locally, the resolver tries to complete it with
//! a point-fetch against the backend. Fetches are throttled per order id so a
//! burst of partial events cannot hammer the API.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::{debug, warn};

use crate::client::OrderApi;
use crate::domain::OrderPatch;

/// Outcome of resolving an event patch.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The patch carries everything needed to materialize an order.
    Full(OrderPatch),
    /// The patch stays partial. It may still be merged into an order the
    /// store already knows, but must not create one.
    Partial(OrderPatch),
}

impl Resolution {
    pub fn into_patch(self) -> OrderPatch {
        match self {
            Resolution::Full(p) | Resolution::Partial(p) => p,
        }
    }

    pub fn is_full(&self) -> bool {
        matches!(self, Resolution::Full(_))
    }
}

pub struct AuthoritativeResolver {
    api: Arc<dyn OrderApi>,
    throttle: Duration,
    last_fetch: DashMap<String, Instant>,
}

impl AuthoritativeResolver {
    pub fn new(api: Arc<dyn OrderApi>, throttle: Duration) -> Self {
        Self {
            api,
            throttle,
            last_fetch: DashMap::new(),
        }
    }

    /// Resolve `patch` for `order_id`.
    ///
    /// Self-sufficient patches pass through untouched. Partial patches
    /// trigger at most one backend fetch per throttle window per order;
    /// when a fetch succeeds the event patch is overlaid on the fetched
    /// record so event fields win over the snapshot.
    pub async fn resolve(&self, order_id: &str, patch: OrderPatch) -> Resolution {
        if patch.is_self_sufficient() {
            return Resolution::Full(patch);
        }

        if !self.acquire_fetch_slot(order_id) {
            debug!("[Resolver] fetch throttled for order {}", order_id);
            return Resolution::Partial(patch);
        }

        match self.api.get_order(order_id).await {
            Ok(Some(record)) => {
                debug!("[Resolver] completed order {} from backend", order_id);
                let base = OrderPatch::from(&record);
                Resolution::Full(base.overlay(&patch))
            }
            Ok(None) => {
                debug!("[Resolver] backend does not know order {}", order_id);
                Resolution::Partial(patch)
            }
            Err(e) => {
                warn!("[Resolver] fetch failed for order {}: {}", order_id, e);
                Resolution::Partial(patch)
            }
        }
    }

    /// Returns true if this call wins the fetch slot for `order_id`.
    fn acquire_fetch_slot(&self, order_id: &str) -> bool {
        use dashmap::mapref::entry::Entry;

        let now = Instant::now();
        match self.last_fetch.entry(order_id.to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(now);
                true
            }
            Entry::Occupied(mut slot) => {
                if now.saturating_duration_since(*slot.get()) >= self.throttle {
                    slot.insert(now);
                    true
                } else {
                    false
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ApiError, OrderDraft, OrderRecord, OrderUpdate};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingApi {
        fetches: AtomicUsize,
        record: Option<OrderRecord>,
    }

    impl CountingApi {
        fn with_record(record: Option<OrderRecord>) -> Self {
            Self {
                fetches: AtomicUsize::new(0),
                record,
            }
        }
    }

    #[async_trait]
    impl OrderApi for CountingApi {
        async fn get_order(&self, _id: &str) -> crate::client::rest::Result<Option<OrderRecord>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(self.record.clone())
        }

        async fn list_orders(&self) -> crate::client::rest::Result<Vec<OrderRecord>> {
            Ok(vec![])
        }

        async fn create_order(
            &self,
            _draft: &OrderDraft,
        ) -> crate::client::rest::Result<OrderRecord> {
            Err(ApiError::Decode("unused".into()))
        }

        async fn update_order(
            &self,
            _id: &str,
            _update: &OrderUpdate,
        ) -> crate::client::rest::Result<OrderRecord> {
            Err(ApiError::Decode("unused".into()))
        }

        async fn delete_order(&self, _id: &str) -> crate::client::rest::Result<()> {
            Ok(())
        }

        async fn pay_order(&self, _id: &str) -> crate::client::rest::Result<OrderRecord> {
            Err(ApiError::Decode("unused".into()))
        }
    }

    fn full_patch() -> OrderPatch {
        OrderPatch {
            owner_id: Some("u1".into()),
            line_items: Some(vec!["burger".into()]),
            total_amount: Some(9.0),
            ..Default::default()
        }
    }

    fn sample_record() -> OrderRecord {
        OrderRecord {
            id: "o1".into(),
            user_id: "u1".into(),
            items: vec!["burger".into()],
            total: Some(9.0),
            status: "pending".into(),
            payment_status: None,
            driver_id: None,
        }
    }

    #[tokio::test]
    async fn self_sufficient_patch_skips_fetch() {
        let api = Arc::new(CountingApi::with_record(Some(sample_record())));
        let resolver = AuthoritativeResolver::new(api.clone(), Duration::from_secs(2));

        let resolution = resolver.resolve("o1", full_patch()).await;
        assert!(resolution.is_full());
        assert_eq!(api.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn partial_patch_is_completed_from_backend() {
        let api = Arc::new(CountingApi::with_record(Some(sample_record())));
        let resolver = AuthoritativeResolver::new(api.clone(), Duration::from_secs(2));

        let patch = OrderPatch {
            driver_id: Some("d1".into()),
            ..Default::default()
        };
        let resolution = resolver.resolve("o1", patch).await;
        assert!(resolution.is_full());

        let resolved = resolution.into_patch();
        assert_eq!(resolved.owner_id.as_deref(), Some("u1"));
        assert_eq!(resolved.driver_id.as_deref(), Some("d1"));
        assert_eq!(api.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn throttle_allows_one_fetch_per_window() {
        let api = Arc::new(CountingApi::with_record(None));
        let resolver = AuthoritativeResolver::new(api.clone(), Duration::from_secs(60));

        for _ in 0..5 {
            let resolution = resolver.resolve("o1", OrderPatch::default()).await;
            assert!(!resolution.is_full());
        }
        assert_eq!(api.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn throttle_is_per_order() {
        let api = Arc::new(CountingApi::with_record(None));
        let resolver = AuthoritativeResolver::new(api.clone(), Duration::from_secs(60));

        resolver.resolve("o1", OrderPatch::default()).await;
        resolver.resolve("o2", OrderPatch::default()).await;
        assert_eq!(api.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn event_fields_win_over_snapshot() {
        let mut record = sample_record();
        record.total = Some(5.0);
        let api = Arc::new(CountingApi::with_record(Some(record)));
        let resolver = AuthoritativeResolver::new(api, Duration::from_secs(2));

        let patch = OrderPatch {
            total_amount: Some(11.0),
            ..Default::default()
        };
        let resolved = resolver.resolve("o1", patch).await.into_patch();
        assert_eq!(resolved.total_amount, Some(11.0));
    }
}
