//! # EventFeed
//!
//! Consumption side of a push event channel with explicit connection
//! lifecycle management.
//!
//! ## Features
//!
//! - **Transport-agnostic**: frames arrive through a pluggable [`FrameTransport`]
//! - **Explicit state machine**: `Disconnected -> Connecting -> Connected`
//! - **Pluggable reconnection**: bounded exponential backoff by default
//! - **Resync hook**: handlers are told about every (re)connection so they
//!   can refetch authoritative state after a replay gap

pub mod error;
pub mod feed;
pub mod frame;
pub mod reconnect;
pub mod state;
pub mod transport;

pub use error::FeedError;
pub use feed::{EventFeed, FrameHandler};
pub use frame::Frame;
pub use reconnect::{ExponentialBackoff, NeverReconnect, ReconnectPolicy};
pub use state::{AtomicConnectionState, ConnectionState};
pub use transport::{FrameStream, FrameTransport, WsTransport};

/// Type alias for Result with FeedError
pub type Result<T> = std::result::Result<T, error::FeedError>;
