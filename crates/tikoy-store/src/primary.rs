use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;

use tikoy_types::models::COLLECTION;
use tikoy_types::{TikoyPatch, TikoyRecord};

use crate::{Store, StoreError};

const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Connection settings for the remote document store.
#[derive(Debug, Clone)]
pub struct PrimaryConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl PrimaryConfig {
    /// Reads `TIKOY_PRIMARY_URL`, `TIKOY_PRIMARY_API_KEY` and
    /// `TIKOY_PRIMARY_TIMEOUT_MS`. Returns `None` unless both the URL and the
    /// key are set, in which case the primary path is skipped entirely.
    pub fn from_env() -> Option<Self> {
        let base_url = std::env::var("TIKOY_PRIMARY_URL").unwrap_or_default();
        let api_key = std::env::var("TIKOY_PRIMARY_API_KEY").unwrap_or_default();
        let timeout_ms = std::env::var("TIKOY_PRIMARY_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_MS);

        Self::new(base_url, api_key, Duration::from_millis(timeout_ms))
    }

    pub fn new(base_url: String, api_key: String, timeout: Duration) -> Option<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        let api_key = api_key.trim().to_string();
        if base_url.is_empty() || api_key.is_empty() {
            return None;
        }
        Some(Self {
            base_url,
            api_key,
            timeout,
        })
    }
}

/// Durable store shared across devices: a document collection behind an HTTP
/// API. Documents live at `{base_url}/tikoys/{id}`.
pub struct PrimaryStore {
    client: Client,
    base_url: String,
    api_key: String,
}

impl PrimaryStore {
    pub fn new(config: PrimaryConfig) -> Result<Self, StoreError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url,
            api_key: config.api_key,
        })
    }

    fn doc_url(&self, id: &str) -> Result<String, StoreError> {
        if !is_url_safe(id) {
            return Err(StoreError::InvalidId(id.to_string()));
        }
        Ok(format!("{}/{}/{}", self.base_url, COLLECTION, id))
    }
}

#[async_trait]
impl Store for PrimaryStore {
    async fn put(&self, id: &str, record: &TikoyRecord) -> Result<(), StoreError> {
        let resp = self
            .client
            .put(self.doc_url(id)?)
            .bearer_auth(&self.api_key)
            .json(record)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(StoreError::Rejected(resp.status().as_u16()));
        }
        debug!("Primary: stored {}", id);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<TikoyRecord>, StoreError> {
        let resp = self
            .client
            .get(self.doc_url(id)?)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        match resp.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let body = resp.bytes().await?;
                Ok(Some(serde_json::from_slice(&body)?))
            }
            status => Err(StoreError::Rejected(status.as_u16())),
        }
    }

    async fn patch(&self, id: &str, patch: &TikoyPatch) -> Result<(), StoreError> {
        let resp = self
            .client
            .patch(self.doc_url(id)?)
            .bearer_auth(&self.api_key)
            .json(patch)
            .send()
            .await?;

        match resp.status() {
            StatusCode::NOT_FOUND => Err(StoreError::NotFound(id.to_string())),
            status if status.is_success() => {
                debug!("Primary: patched {}", id);
                Ok(())
            }
            status => Err(StoreError::Rejected(status.as_u16())),
        }
    }

    fn name(&self) -> &'static str {
        "primary"
    }
}

fn is_url_safe(id: &str) -> bool {
    !id.is_empty()
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}
