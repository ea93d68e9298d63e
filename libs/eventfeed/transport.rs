use crate::error::FeedError;
use crate::frame::Frame;
use crate::Result;
use async_trait::async_trait;
use futures::stream::{Stream, StreamExt};
use std::pin::Pin;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::Message;
use tracing::debug;

/// Stream of inbound frames produced by a transport connection
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<Frame>> + Send>>;

/// Trait for the underlying push channel
///
/// The feed calls `connect` once per connection attempt; the returned
/// stream yields frames until the connection drops (stream end or error
/// item), at which point the feed decides whether to reconnect.
#[async_trait]
pub trait FrameTransport: Send + Sync {
    async fn connect(&self) -> Result<FrameStream>;
}

/// WebSocket transport backed by tokio-tungstenite
pub struct WsTransport {
    url: String,
}

impl WsTransport {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl FrameTransport for WsTransport {
    async fn connect(&self) -> Result<FrameStream> {
        let (ws, _response) = connect_async(&self.url)
            .await
            .map_err(|e| FeedError::Transport(e.to_string()))?;
        debug!("[WsTransport] Connected to {}", self.url);

        let stream = ws.filter_map(|item| async move {
            match item {
                Ok(Message::Text(text)) => Some(Ok(Frame::Text(text))),
                Ok(Message::Binary(bytes)) => Some(Ok(Frame::Binary(bytes))),
                // Control frames are handled by tungstenite itself
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) | Ok(Message::Frame(_)) => None,
                Ok(Message::Close(reason)) => Some(Err(FeedError::ConnectionClosed(
                    reason
                        .map(|r| r.reason.to_string())
                        .unwrap_or_else(|| "close frame".to_string()),
                ))),
                Err(e) => Some(Err(FeedError::Transport(e.to_string()))),
            }
        });

        Ok(Box::pin(stream))
    }
}
