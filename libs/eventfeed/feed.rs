//! Feed loop: connect, pump frames, back off, repeat
//!
//! One loop owns the connection lifecycle. Handlers get an
//! `on_connected` call for every successful (re)connection so they can
//! resynchronize authoritative state after a replay gap, then a call
//! per frame. Handlers must not block the pump; anything slow belongs
//! in a spawned task on their side.

use crate::error::FeedError;
use crate::frame::Frame;
use crate::reconnect::ReconnectPolicy;
use crate::state::{AtomicConnectionState, ConnectionState};
use crate::transport::FrameTransport;
use crate::Result;
use async_trait::async_trait;
use futures::StreamExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::time::{sleep, timeout, Duration};
use tracing::{info, warn};

/// Interval at which the pump re-checks the shutdown flag while idle
const SHUTDOWN_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Receiver side of the feed
#[async_trait]
pub trait FrameHandler: Send + Sync {
    /// Called after every successful (re)connection, before any frame
    async fn on_connected(&self);

    /// Called once per inbound frame
    async fn on_frame(&self, frame: Frame);
}

/// Drives a [`FrameTransport`] through its connection lifecycle
pub struct EventFeed<T: FrameTransport> {
    transport: T,
    policy: Box<dyn ReconnectPolicy>,
    state: Arc<AtomicConnectionState>,
}

impl<T: FrameTransport> EventFeed<T> {
    pub fn new(transport: T, policy: Box<dyn ReconnectPolicy>) -> Self {
        Self {
            transport,
            policy,
            state: Arc::new(AtomicConnectionState::new()),
        }
    }

    /// Current connection state, shareable with observers
    pub fn state(&self) -> Arc<AtomicConnectionState> {
        Arc::clone(&self.state)
    }

    /// Run the feed until shutdown or the reconnect policy gives up
    ///
    /// Returns `Ok(())` on graceful shutdown and
    /// `Err(FeedError::ReconnectExhausted)` when the policy declines
    /// a further attempt.
    pub async fn run(&self, handler: Arc<dyn FrameHandler>, shutdown: Arc<AtomicBool>) -> Result<()> {
        let mut attempt: usize = 0;

        loop {
            if !shutdown.load(Ordering::Acquire) {
                break;
            }

            self.state.store(ConnectionState::Connecting);
            match self.transport.connect().await {
                Ok(mut frames) => {
                    self.state.store(ConnectionState::Connected);
                    info!("[EventFeed] Connected");
                    attempt = 0;
                    handler.on_connected().await;

                    self.pump(&mut frames, handler.as_ref(), &shutdown).await;
                    self.state.store(ConnectionState::Disconnected);
                }
                Err(e) => {
                    self.state.store(ConnectionState::Disconnected);
                    warn!("[EventFeed] Connect failed: {}", e);
                }
            }

            if !shutdown.load(Ordering::Acquire) {
                break;
            }

            match self.policy.next_delay(attempt) {
                Some(delay) => {
                    warn!(
                        "[EventFeed] Reconnecting in {:?} (attempt {})",
                        delay,
                        attempt + 1
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                None => {
                    return Err(FeedError::ReconnectExhausted {
                        attempts: attempt,
                        reason: "reconnect policy declined further attempts".to_string(),
                    });
                }
            }
        }

        info!("[EventFeed] Shutdown");
        Ok(())
    }

    /// Pump frames from one connection until it drops or shutdown
    async fn pump(
        &self,
        frames: &mut crate::transport::FrameStream,
        handler: &dyn FrameHandler,
        shutdown: &AtomicBool,
    ) {
        loop {
            if !shutdown.load(Ordering::Acquire) {
                return;
            }

            match timeout(SHUTDOWN_POLL_INTERVAL, frames.next()).await {
                // Idle; loop back to re-check the shutdown flag
                Err(_) => continue,
                Ok(None) => {
                    warn!("[EventFeed] Stream ended");
                    return;
                }
                Ok(Some(Ok(frame))) => handler.on_frame(frame).await,
                Ok(Some(Err(e))) => {
                    warn!("[EventFeed] Connection lost: {}", e);
                    return;
                }
            }
        }
    }
}
