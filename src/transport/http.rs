//! HTTP transport: one JSON POST per turn

use super::{Transport, TransportError};
use crate::config::BridgeConfig;
use crate::protocol::{BridgeRequest, BridgeResponse};
use async_trait::async_trait;
use reqwest::{Client, Url};

/// Posts the request to a configured endpoint and decodes the reply.
///
/// No retries and no timeout: one call is one exchange.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    /// Create a transport for an absolute endpoint URL
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// Create a transport from config, resolving a relative endpoint
    /// against the configured base URL
    pub fn from_config(config: &BridgeConfig) -> Self {
        Self::new(config.endpoint_url())
    }

    /// Reuse an existing client (connection pool, proxies, TLS settings)
    #[must_use]
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    fn url(&self) -> Result<Url, TransportError> {
        Url::parse(&self.endpoint).map_err(|e| TransportError::invalid_endpoint(&self.endpoint, e))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn exchange(&self, request: &BridgeRequest) -> Result<BridgeResponse, TransportError> {
        let url = self.url()?;

        let response = self.client.post(url).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), body = %body, "Agent endpoint rejected request");
            return Err(TransportError::status(
                status.as_u16(),
                status.canonical_reason(),
            ));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| TransportError::parse(e.to_string()))
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}
