//! Mock implementations for testing
//!
//! These mocks enable session testing without real I/O.

use crate::protocol::{BridgeRequest, BridgeResponse};
use crate::transport::{Transport, TransportError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{Notify, Semaphore};

// ============================================================================
// Mock Transport
// ============================================================================

/// Mock transport that returns queued results in order
pub struct MockTransport {
    results: Mutex<VecDeque<Result<BridgeResponse, TransportError>>>,
    /// Record of all requests made
    requests: Mutex<Vec<BridgeRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            results: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful response
    pub fn queue_response(&self, response: BridgeResponse) {
        self.results.lock().unwrap().push_back(Ok(response));
    }

    /// Queue a failure
    pub fn queue_error(&self, error: TransportError) {
        self.results.lock().unwrap().push_back(Err(error));
    }

    pub fn recorded_requests(&self) -> Vec<BridgeRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn next_result(&self) -> Result<BridgeResponse, TransportError> {
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::network("No mock response queued")))
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn exchange(&self, request: &BridgeRequest) -> Result<BridgeResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        self.next_result()
    }

    fn endpoint(&self) -> &str {
        "mock://agent"
    }
}

// ============================================================================
// Gated Transport (for in-flight testing)
// ============================================================================

/// Mock transport that holds every exchange until the test releases it
pub struct GatedTransport {
    inner: MockTransport,
    gate: Semaphore,
    started: AtomicUsize,
    /// Notified when an exchange starts
    pub exchange_started: Arc<Notify>,
}

impl GatedTransport {
    pub fn new() -> Self {
        Self {
            inner: MockTransport::new(),
            gate: Semaphore::new(0),
            started: AtomicUsize::new(0),
            exchange_started: Arc::new(Notify::new()),
        }
    }

    pub fn queue_response(&self, response: BridgeResponse) {
        self.inner.queue_response(response);
    }

    /// Let one held exchange complete
    pub fn release(&self) {
        self.gate.add_permits(1);
    }

    /// Wait until at least `count` exchanges have started
    pub async fn wait_started(&self, count: usize) {
        loop {
            let notified = self.exchange_started.notified();
            if self.started.load(Ordering::SeqCst) >= count {
                return;
            }
            notified.await;
        }
    }

    pub fn request_count(&self) -> usize {
        self.inner.request_count()
    }
}

impl Default for GatedTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for GatedTransport {
    async fn exchange(&self, request: &BridgeRequest) -> Result<BridgeResponse, TransportError> {
        self.inner.requests.lock().unwrap().push(request.clone());
        self.started.fetch_add(1, Ordering::SeqCst);
        self.exchange_started.notify_waiters();

        match self.gate.acquire().await {
            Ok(permit) => permit.forget(),
            Err(_) => return Err(TransportError::network("gate closed")),
        }
        self.inner.next_result()
    }

    fn endpoint(&self) -> &str {
        "mock://gated"
    }
}

// ============================================================================
// Recorder
// ============================================================================

/// Shared log that host callbacks push into
pub struct Recorder<T> {
    items: Arc<Mutex<Vec<T>>>,
}

impl<T: Clone> Recorder<T> {
    pub fn new() -> Self {
        Self {
            items: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn push(&self, item: T) {
        self.items.lock().unwrap().push(item);
    }

    pub fn items(&self) -> Vec<T> {
        self.items.lock().unwrap().clone()
    }
}

impl<T> Clone for Recorder<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn empty_request() -> BridgeRequest {
        BridgeRequest::from_history(&[], vec![], Value::Null)
    }

    #[tokio::test]
    async fn test_mock_transport_drains_queue() {
        let mock = MockTransport::new();
        mock.queue_response(BridgeResponse::text("Hello"));

        let response = mock.exchange(&empty_request()).await.unwrap();
        assert_eq!(response.response, "Hello");

        // Second call should fail (no more responses)
        assert!(mock.exchange(&empty_request()).await.is_err());
        assert_eq!(mock.request_count(), 2);
    }

    #[tokio::test]
    async fn test_gated_transport_holds_until_released() {
        let gated = Arc::new(GatedTransport::new());
        gated.queue_response(BridgeResponse::text("late"));

        let task = tokio::spawn({
            let gated = Arc::clone(&gated);
            async move { gated.exchange(&empty_request()).await }
        });

        gated.wait_started(1).await;
        assert!(!task.is_finished());

        gated.release();
        let response = task.await.unwrap().unwrap();
        assert_eq!(response.response, "late");
    }
}
