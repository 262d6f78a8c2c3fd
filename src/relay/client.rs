//! HTTP client for the relay's chat endpoint

use crate::config::RelayConfig;
use crate::error::{Result, RougechatError};
use crate::relay::{ChatRequest, ChatResponse, RelayTransport};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Client for a running relay instance
///
/// Collapses every failure mode (connection refused, timeout, non-success
/// status, malformed body) into the coarse `Relay` error variant; callers
/// show the fixed fallback message and the cause only reaches the logs.
pub struct RelayClient {
    client: Client,
    endpoint: Url,
}

impl RelayClient {
    /// Create a client for the relay at `config.url`
    ///
    /// # Errors
    ///
    /// Returns an error if HTTP client initialization fails or the
    /// configured URL cannot host the chat endpoint.
    pub fn new(config: &RelayConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("rougechat/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RougechatError::Relay(format!("Failed to create HTTP client: {}", e)))?;

        let endpoint = chat_endpoint(&config.url)?;

        Ok(Self { client, endpoint })
    }

    /// Endpoint this client posts messages to
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

/// Resolve the chat endpoint under a relay base URL
fn chat_endpoint(base: &Url) -> Result<Url> {
    let mut base = base.clone();
    // Url::join treats a path without a trailing slash as a file segment.
    if !base.path().ends_with('/') {
        base.set_path(&format!("{}/", base.path()));
    }
    let endpoint = base
        .join("api/chat")
        .map_err(|e| RougechatError::Relay(format!("Invalid relay URL: {}", e)))?;
    Ok(endpoint)
}

#[async_trait]
impl RelayTransport for RelayClient {
    async fn exchange(&self, message: &str) -> Result<String> {
        let request = ChatRequest {
            message: message.to_string(),
        };

        tracing::debug!("Posting message to relay: {}", self.endpoint);

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Relay request failed: {}", e);
                RougechatError::Relay(format!("Relay request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::warn!("Relay returned error {}: {}", status, error_text);
            return Err(RougechatError::Relay(format!("Relay returned {}", status)).into());
        }

        let body: ChatResponse = response.json().await.map_err(|e| {
            tracing::warn!("Failed to parse relay response: {}", e);
            RougechatError::Relay(format!("Failed to parse relay response: {}", e))
        })?;

        Ok(body.response)
    }
}
