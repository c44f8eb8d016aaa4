//! Transport abstraction
//!
//! A transport performs exactly one request/response exchange per call.

mod error;
mod http;

pub use error::{TransportError, TransportErrorKind};
pub use http::HttpTransport;

use crate::protocol::{BridgeRequest, BridgeResponse};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Common interface for agent transports
#[async_trait]
pub trait Transport: Send + Sync {
    /// Submit one request and wait for its single response
    async fn exchange(&self, request: &BridgeRequest) -> Result<BridgeResponse, TransportError>;

    /// Where requests go, for logging
    fn endpoint(&self) -> &str;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn exchange(&self, request: &BridgeRequest) -> Result<BridgeResponse, TransportError> {
        (**self).exchange(request).await
    }

    fn endpoint(&self) -> &str {
        (**self).endpoint()
    }
}

/// Logging wrapper for transports
pub struct LoggingTransport<T> {
    inner: T,
}

impl<T: Transport> LoggingTransport<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<T: Transport> Transport for LoggingTransport<T> {
    async fn exchange(&self, request: &BridgeRequest) -> Result<BridgeResponse, TransportError> {
        let start = Instant::now();
        let result = self.inner.exchange(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(response) => {
                tracing::info!(
                    endpoint = %self.inner.endpoint(),
                    duration_ms = %duration.as_millis(),
                    message_count = request.messages.len(),
                    actions = response.actions.as_ref().map_or(0, Vec::len),
                    has_context = response.context.is_some(),
                    "Agent exchange completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    endpoint = %self.inner.endpoint(),
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    kind = ?e.kind,
                    "Agent exchange failed"
                );
            }
        }

        result
    }

    fn endpoint(&self) -> &str {
        self.inner.endpoint()
    }
}

/// Deadline wrapper for hosts that want one.
///
/// The bridge itself never times out an exchange; a host opts in by wrapping
/// its transport.
pub struct TimeoutTransport<T> {
    inner: T,
    timeout: Duration,
}

impl<T: Transport> TimeoutTransport<T> {
    pub fn new(inner: T, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

#[async_trait]
impl<T: Transport> Transport for TimeoutTransport<T> {
    async fn exchange(&self, request: &BridgeRequest) -> Result<BridgeResponse, TransportError> {
        tokio::time::timeout(self.timeout, self.inner.exchange(request))
            .await
            .unwrap_or_else(|_| Err(TransportError::timeout(self.timeout)))
    }

    fn endpoint(&self) -> &str {
        self.inner.endpoint()
    }
}
