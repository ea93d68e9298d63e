//! Reconcile engine
//!
//! Central coordinator: raw frames come in, get normalized, resolved
//! against the backend when partial, merged into the store, and surfaced
//! as notifications. User-initiated writes go through the same store so
//! the local view never waits for the event feed to echo them back.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use eventfeed::{Frame, FrameHandler};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::client::{ApiError, OrderApi, OrderDraft, OrderUpdate};
use crate::domain::Order;
use crate::events::{normalize, DiscardReason, EventEnvelope, EventKind};
use crate::notify::Notifier;
use crate::resolver::{AuthoritativeResolver, Resolution};
use crate::store::{MergeOutcome, OrderStore, SharedOrderStore};

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("event discarded: {0}")]
    UnparsableEvent(DiscardReason),

    #[error("partial event for unknown order {0}")]
    UnresolvedReference(String),

    #[error("stale status transition ignored for order {0}")]
    StaleTransition(String),

    #[error("write conflict on order {0}")]
    WriteConflict(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}

pub type Result<T> = std::result::Result<T, EngineError>;

pub struct ReconcileEngine {
    store: SharedOrderStore,
    resolver: Arc<AuthoritativeResolver>,
    api: Arc<dyn OrderApi>,
    notifier: Arc<Notifier>,
}

impl Clone for ReconcileEngine {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            resolver: Arc::clone(&self.resolver),
            api: Arc::clone(&self.api),
            notifier: Arc::clone(&self.notifier),
        }
    }
}

impl ReconcileEngine {
    pub fn new(
        viewer_id: Option<String>,
        resolver: Arc<AuthoritativeResolver>,
        api: Arc<dyn OrderApi>,
        notifier: Arc<Notifier>,
    ) -> Self {
        Self {
            store: Arc::new(parking_lot::RwLock::new(OrderStore::new(viewer_id))),
            resolver,
            api,
            notifier,
        }
    }

    /// Shared handle to the order store for UI consumers.
    pub fn store(&self) -> SharedOrderStore {
        Arc::clone(&self.store)
    }

    // ========================================================================
    // Inbound events
    // ========================================================================

    /// Normalize one raw frame and process it on its own task.
    ///
    /// Resolution may block on a backend fetch; spawning keeps a slow
    /// fetch for one order from delaying events for the others.
    pub fn handle_frame(&self, raw: &str) -> Result<()> {
        let envelope = normalize(raw, Utc::now()).map_err(EngineError::UnparsableEvent)?;
        let engine = self.clone();
        tokio::spawn(async move {
            let order_id = envelope.order_id.clone();
            if let Err(e) = engine.process_envelope(envelope).await {
                warn!("[Engine] Event for order {} not applied: {}", order_id, e);
            }
        });
        Ok(())
    }

    /// Normalize and process one raw feed payload inline.
    pub async fn process_raw(&self, raw: &str) -> Result<()> {
        let envelope =
            normalize(raw, Utc::now()).map_err(EngineError::UnparsableEvent)?;
        self.process_envelope(envelope).await
    }

    /// Apply a normalized event to local state.
    pub async fn process_envelope(&self, envelope: EventEnvelope) -> Result<()> {
        let EventEnvelope {
            kind,
            order_id,
            patch,
            ..
        } = envelope;

        match kind {
            EventKind::Unknown => {
                debug!("[Engine] Ignoring unrecognized event for order {}", order_id);
                Ok(())
            }
            EventKind::OrderDeleted => {
                let removed = self.store.write().remove(&order_id);
                match removed {
                    Some(order) => {
                        info!("[Engine] Order {} removed", order_id);
                        self.notifier.event(kind, &order);
                    }
                    None => debug!("[Engine] Delete for unknown order {}", order_id),
                }
                Ok(())
            }
            _ => {
                let resolution = self.resolver.resolve(&order_id, patch).await;
                self.apply_resolution(kind, &order_id, resolution)
            }
        }
    }

    fn apply_resolution(
        &self,
        kind: EventKind,
        order_id: &str,
        resolution: Resolution,
    ) -> Result<()> {
        // Merge under the lock; notify after it is released.
        let outcome = {
            let mut store = self.store.write();
            match resolution {
                Resolution::Full(patch) => store.apply_event(order_id, &patch),
                Resolution::Partial(patch) => store.apply_event_existing_only(order_id, &patch),
            }
        };

        match outcome {
            MergeOutcome::Created(order) => {
                info!("[Engine] Order {} created locally", order_id);
                self.notifier.event(kind, &order);
                Ok(())
            }
            MergeOutcome::Updated {
                order,
                transition,
                stale_status,
            } => {
                if let Some((from, to)) = transition {
                    info!("[Engine] Order {} moved {} -> {}", order_id, from, to);
                }
                self.notifier.event(kind, &order);
                if stale_status {
                    warn!("[Engine] Stale status on {} ignored", order_id);
                    return Err(EngineError::StaleTransition(order_id.to_string()));
                }
                Ok(())
            }
            MergeOutcome::Unknown => {
                warn!(
                    "[Engine] Partial {} for unknown order {} dropped",
                    kind, order_id
                );
                Err(EngineError::UnresolvedReference(order_id.to_string()))
            }
        }
    }

    /// Replace local state with the backend's full order list.
    ///
    /// Called on every (re)connection; events that raced the snapshot
    /// reconcile through the normal merge path afterwards.
    pub async fn resync(&self) -> Result<()> {
        let records = self.api.list_orders().await?;
        info!("[Engine] Resync fetched {} orders", records.len());

        let mut store = self.store.write();
        for record in &records {
            store.apply_write_result(record);
        }
        Ok(())
    }

    // ========================================================================
    // User actions
    // ========================================================================

    pub async fn create_order(&self, draft: &OrderDraft) -> Result<Order> {
        let record = self.api.create_order(draft).await?;
        info!("[Engine] Created order {}", record.id);
        self.applied_write(&record)
    }

    pub async fn edit_order(&self, id: &str, update: &OrderUpdate) -> Result<Order> {
        match self.api.update_order(id, update).await {
            Ok(record) => {
                info!("[Engine] Updated order {}", id);
                self.applied_write(&record)
            }
            Err(ApiError::NotFound(_)) => Err(self.write_conflict("edit", id)),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn pay_order(&self, id: &str) -> Result<Order> {
        match self.api.pay_order(id).await {
            Ok(record) => {
                info!("[Engine] Paid order {}", id);
                self.applied_write(&record)
            }
            Err(ApiError::NotFound(_)) => Err(self.write_conflict("pay", id)),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn delete_order(&self, id: &str) -> Result<()> {
        match self.api.delete_order(id).await {
            Ok(()) => {
                self.store.write().remove(id);
                info!("[Engine] Deleted order {}", id);
                Ok(())
            }
            Err(ApiError::NotFound(_)) => Err(self.write_conflict("delete", id)),
            Err(e) => Err(e.into()),
        }
    }

    fn applied_write(&self, record: &crate::client::OrderRecord) -> Result<Order> {
        let outcome = self.store.write().apply_write_result(record);
        match outcome.order() {
            Some(order) => Ok(order.clone()),
            // apply_write_result always creates or updates
            None => Err(EngineError::UnresolvedReference(record.id.clone())),
        }
    }

    fn write_conflict(&self, action: &str, id: &str) -> EngineError {
        warn!("[Engine] {} conflict: order {} gone on backend", action, id);
        self.notifier
            .action_failed(action, id, "order no longer exists");
        EngineError::WriteConflict(id.to_string())
    }
}

// ============================================================================
// Feed integration
// ============================================================================

#[async_trait]
impl FrameHandler for ReconcileEngine {
    async fn on_connected(&self) {
        if let Err(e) = self.resync().await {
            warn!("[Engine] Resync failed: {}", e);
        }
    }

    async fn on_frame(&self, frame: Frame) {
        let Some(text) = frame.as_text() else {
            debug!("[Engine] Ignoring non-text frame");
            return;
        };

        if let Err(EngineError::UnparsableEvent(reason)) = self.handle_frame(text) {
            warn!("[Engine] Discarded frame: {}", reason);
        }
    }
}
