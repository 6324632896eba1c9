//! Upstream gateway backend
//!
//! Speaks the gateway's own HTTP protocol to another gateway instance, so
//! several front doors can share one queue.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};
use url::Url;

use super::{Publisher, PublisherError};
use crate::config::{RemotePublisherConfig, resolve_secret};
use crate::gateway::{API_KEY_HEADER, LengthPayload};
use crate::{Error, Result};

/// Publisher that forwards `len` and `enqueue` to an upstream gateway.
#[derive(Debug, Clone)]
pub struct RemotePublisher {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl RemotePublisher {
    /// Create a publisher for the gateway at `base_url`.
    pub fn new(base_url: &str, api_key: impl Into<String>, client: Client) -> Result<Self> {
        let mut base_url =
            Url::parse(base_url).map_err(|e| Error::Config(format!("Invalid upstream URL: {e}")))?;

        // Url::join replaces the last segment unless the base ends with '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            client,
            base_url,
            api_key: api_key.into(),
        })
    }

    /// Create a publisher from configuration, building a pooled HTTP client.
    pub fn from_config(config: &RemotePublisherConfig) -> Result<Self> {
        let mut builder = Client::builder().pool_max_idle_per_host(config.max_idle_connections);
        if config.max_io_time_seconds > 0 {
            builder = builder.timeout(Duration::from_secs(config.max_io_time_seconds));
        }

        Self::new(&config.url, resolve_secret(&config.api_key), builder.build()?)
    }

    fn endpoint(&self, name: &str) -> std::result::Result<Url, PublisherError> {
        self.base_url
            .join(name)
            .map_err(|e| PublisherError::Upstream(e.to_string()))
    }

    async fn read_length(
        response: reqwest::Response,
    ) -> std::result::Result<usize, PublisherError> {
        let payload: LengthPayload = response
            .json()
            .await
            .map_err(|e| PublisherError::Upstream(format!("invalid length payload: {e}")))?;
        Ok(payload.length)
    }

    async fn failure(response: reqwest::Response) -> PublisherError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        warn!(status = %status, body = %body, "Upstream gateway rejected request");
        if body.is_empty() {
            PublisherError::Upstream(status.to_string())
        } else {
            PublisherError::Upstream(format!("{status}: {body}"))
        }
    }
}

#[async_trait]
impl Publisher for RemotePublisher {
    async fn length(&self) -> std::result::Result<usize, PublisherError> {
        let response = self
            .client
            .get(self.endpoint("len")?)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| PublisherError::Upstream(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::failure(response).await);
        }
        Self::read_length(response).await
    }

    async fn push(&self, message: Bytes) -> std::result::Result<usize, PublisherError> {
        let response = self
            .client
            .post(self.endpoint("enqueue")?)
            .header(API_KEY_HEADER, &self.api_key)
            .body(message)
            .send()
            .await
            .map_err(|e| PublisherError::Upstream(e.to_string()))?;

        match response.status() {
            StatusCode::PAYLOAD_TOO_LARGE => Err(PublisherError::MessageTooLarge),
            status if status.is_success() => Self::read_length(response).await,
            _ => Err(Self::failure(response).await),
        }
    }

    async fn close(&self) {
        // Pooled connections are released when the client is dropped
        debug!(upstream = %self.base_url, "Remote publisher closed");
    }
}
