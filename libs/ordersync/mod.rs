//! # OrderSync
//!
//! Client-side reconciliation engine for a live order collection.
//!
//! Merges three inputs into one consistent in-memory view:
//! - REST fetch responses (authoritative)
//! - partial real-time event payloads arriving in arbitrary order
//! - confirmed results of user actions (create/edit/pay/delete)
//!
//! All three funnel through a single merge primitive that never
//! regresses an order's lifecycle status and never lets a partial
//! payload clobber known data.

pub mod client;
pub mod config;
pub mod domain;
pub mod engine;
pub mod events;
pub mod logging;
pub mod notify;
pub mod resolver;
pub mod store;
pub mod utils;

// Re-export commonly used items
pub use client::{ApiError, OrderApi, OrderDraft, OrderRecord, OrderUpdate, RestOrderApi};
pub use config::EngineConfig;
pub use domain::{LifecycleStatus, Order, OrderPatch, PaymentStatus};
pub use engine::{EngineError, ReconcileEngine};
pub use events::{normalize, DiscardReason, EventEnvelope, EventKind};
pub use logging::init_tracing;
pub use notify::{LogSink, NotificationDeduplicator, NotificationSink, Notifier, NotifyCategory};
pub use resolver::{AuthoritativeResolver, Resolution};
pub use store::{merge, MergeOutcome, OrderStore, SharedOrderStore};
pub use utils::ShutdownManager;
