//! Engine configuration
//!
//! Loaded from environment variables (with `.env` support). Only the two
//! endpoint URLs are required; everything else has production defaults.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Base URL of the order REST API, e.g. `http://localhost:8000`
    pub api_base_url: String,
    /// WebSocket endpoint for the order event feed
    pub ws_url: String,
    /// User id of the local viewer, used for the "You" display label
    pub viewer_id: Option<String>,
    /// Minimum spacing between authoritative fetches for one order
    pub fetch_throttle: Duration,
    /// Suppression window for repeated creation notifications
    pub creation_dedup_window: Duration,
    /// Suppression window for repeated update notifications
    pub update_dedup_window: Duration,
    /// First reconnect delay
    pub reconnect_initial: Duration,
    /// Reconnect delay ceiling
    pub reconnect_max: Duration,
    /// Give up after this many consecutive failed reconnects
    pub max_reconnect_attempts: usize,
}

impl EngineConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let api_base_url =
            std::env::var("ORDER_API_URL").map_err(|_| anyhow::anyhow!("ORDER_API_URL not set"))?;
        let ws_url =
            std::env::var("ORDER_WS_URL").map_err(|_| anyhow::anyhow!("ORDER_WS_URL not set"))?;
        let viewer_id = std::env::var("VIEWER_ID").ok().filter(|v| !v.is_empty());

        Ok(Self {
            api_base_url,
            ws_url,
            viewer_id,
            ..Self::default()
        })
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            ws_url: "ws://localhost:8000/ws".to_string(),
            viewer_id: None,
            fetch_throttle: Duration::from_secs(2),
            creation_dedup_window: Duration::from_secs(60),
            update_dedup_window: Duration::from_secs(6),
            reconnect_initial: Duration::from_secs(1),
            reconnect_max: Duration::from_secs(30),
            max_reconnect_attempts: 10,
        }
    }
}
