use thiserror::Error;

/// Main error type for the event feed
#[derive(Error, Debug)]
pub enum FeedError {
    /// Transport-level failure (connect, read, TLS)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Remote peer closed the connection
    #[error("Connection closed: {0}")]
    ConnectionClosed(String),

    /// Reconnection gave up
    #[error("Reconnection exhausted after {attempts} attempts: {reason}")]
    ReconnectExhausted { attempts: usize, reason: String },
}
