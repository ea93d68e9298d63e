//! REST client for the order backend.
//!
//! All engine write paths and the authoritative point-fetch go through the
//! `OrderApi` trait so tests can substitute a mock backend.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{debug, warn};

use super::types::{OrderDraft, OrderRecord, OrderUpdate};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("order not found: {0}")]
    NotFound(String),

    #[error("unexpected status {status} for {url}: {body}")]
    UnexpectedStatus {
        status: StatusCode,
        url: String,
        body: String,
    },

    #[error("failed to decode response: {0}")]
    Decode(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// Backend order operations used by the reconcile engine.
#[async_trait]
pub trait OrderApi: Send + Sync {
    /// Point-fetch a single order. `Ok(None)` means the backend does not
    /// know the order (deleted or never existed).
    async fn get_order(&self, id: &str) -> Result<Option<OrderRecord>>;

    async fn list_orders(&self) -> Result<Vec<OrderRecord>>;

    async fn create_order(&self, draft: &OrderDraft) -> Result<OrderRecord>;

    async fn update_order(&self, id: &str, update: &OrderUpdate) -> Result<OrderRecord>;

    async fn delete_order(&self, id: &str) -> Result<()>;

    async fn pay_order(&self, id: &str) -> Result<OrderRecord>;
}

// ============================================================================
// HTTP implementation
// ============================================================================

pub struct RestOrderApi {
    base_url: String,
    client: Client,
}

impl RestOrderApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    fn orders_url(&self) -> String {
        format!("{}/orders", self.base_url)
    }

    fn order_url(&self, id: &str) -> String {
        format!("{}/orders/{}", self.base_url, id)
    }

    async fn decode_record(response: reqwest::Response) -> Result<OrderRecord> {
        response
            .json::<OrderRecord>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn unexpected(response: reqwest::Response) -> ApiError {
        let status = response.status();
        let url = response.url().to_string();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        ApiError::UnexpectedStatus { status, url, body }
    }
}

#[async_trait]
impl OrderApi for RestOrderApi {
    async fn get_order(&self, id: &str) -> Result<Option<OrderRecord>> {
        let url = self.order_url(id);
        debug!("[OrderApi] GET {}", url);

        let response = self.client.get(&url).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(Self::decode_record(response).await?)),
            _ => Err(Self::unexpected(response).await),
        }
    }

    async fn list_orders(&self) -> Result<Vec<OrderRecord>> {
        let url = self.orders_url();
        debug!("[OrderApi] GET {}", url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(Self::unexpected(response).await);
        }
        response
            .json::<Vec<OrderRecord>>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn create_order(&self, draft: &OrderDraft) -> Result<OrderRecord> {
        let url = self.orders_url();
        debug!("[OrderApi] POST {}", url);

        let response = self.client.post(&url).json(draft).send().await?;
        if !response.status().is_success() {
            return Err(Self::unexpected(response).await);
        }
        Self::decode_record(response).await
    }

    async fn update_order(&self, id: &str, update: &OrderUpdate) -> Result<OrderRecord> {
        let url = self.order_url(id);
        debug!("[OrderApi] PUT {}", url);

        let response = self.client.put(&url).json(update).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => {
                warn!("[OrderApi] update hit missing order {}", id);
                Err(ApiError::NotFound(id.to_string()))
            }
            status if status.is_success() => Self::decode_record(response).await,
            _ => Err(Self::unexpected(response).await),
        }
    }

    async fn delete_order(&self, id: &str) -> Result<()> {
        let url = self.order_url(id);
        debug!("[OrderApi] DELETE {}", url);

        let response = self.client.delete(&url).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => {
                warn!("[OrderApi] delete hit missing order {}", id);
                Err(ApiError::NotFound(id.to_string()))
            }
            status if status.is_success() => Ok(()),
            _ => Err(Self::unexpected(response).await),
        }
    }

    async fn pay_order(&self, id: &str) -> Result<OrderRecord> {
        let url = format!("{}/pay", self.order_url(id));
        debug!("[OrderApi] POST {}", url);

        let response = self.client.post(&url).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => {
                warn!("[OrderApi] pay hit missing order {}", id);
                Err(ApiError::NotFound(id.to_string()))
            }
            status if status.is_success() => Self::decode_record(response).await,
            _ => Err(Self::unexpected(response).await),
        }
    }
}
