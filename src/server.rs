//! Agent endpoint
//!
//! Mounts `POST /chat` and delegates each decoded request to an
//! `AgentHandler`. This is the server half of the wire protocol the bridge
//! client speaks.

mod handlers;
mod types;

pub use types::ErrorResponse;

use crate::protocol::{BridgeRequest, BridgeResponse};
use async_trait::async_trait;
use axum::Router;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;

/// Failure reported by an agent handler; becomes a 500 response
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct HandlerError {
    pub message: String,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Produces the agent's reply for one turn
#[async_trait]
pub trait AgentHandler: Send + Sync + 'static {
    async fn handle(&self, request: BridgeRequest) -> Result<BridgeResponse, HandlerError>;
}

/// Adapter turning an async closure into an `AgentHandler`
pub struct FnHandler<F> {
    f: F,
}

/// Wrap `async |request| -> Result<BridgeResponse, HandlerError>` as a handler
pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F>
where
    F: Fn(BridgeRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<BridgeResponse, HandlerError>> + Send + 'static,
{
    FnHandler { f }
}

#[async_trait]
impl<F, Fut> AgentHandler for FnHandler<F>
where
    F: Fn(BridgeRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<BridgeResponse, HandlerError>> + Send + 'static,
{
    async fn handle(&self, request: BridgeRequest) -> Result<BridgeResponse, HandlerError> {
        (self.f)(request).await
    }
}

/// State shared across handlers
#[derive(Clone)]
pub(crate) struct AppState {
    handler: Arc<dyn AgentHandler>,
}

/// Router with the agent endpoint at `/chat`
pub fn create_agent_router(handler: impl AgentHandler) -> Router {
    handlers::chat_routes(AppState {
        handler: Arc::new(handler),
    })
}

/// Router with the agent endpoint at `{prefix}/chat`
pub fn create_agent_router_with_prefix(handler: impl AgentHandler, prefix: &str) -> Router {
    let router = create_agent_router(handler);
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return router;
    }
    let prefix = if prefix.starts_with('/') {
        prefix.to_string()
    } else {
        format!("/{prefix}")
    };
    Router::new().nest(&prefix, router)
}
