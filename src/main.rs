//! Echo agent
//!
//! Minimal agent endpoint for exercising a bridge end to end. Replies with
//! the last user message and the size of the context it was sent; never
//! emits actions.

use agent_state_bridge::{
    create_agent_router, handler_fn, BridgeRequest, BridgeResponse, HandlerError,
};
use std::net::SocketAddr;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn echo_reply(request: &BridgeRequest) -> BridgeResponse {
    let said = request.last_user_message().unwrap_or_default();
    let keys = request.context.as_object().map_or(0, |map| map.len());
    BridgeResponse::text(format!(
        "You said: '{said}'. Context has {keys} top-level keys."
    ))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agent_state_bridge=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let port: u16 = std::env::var("AGENT_BRIDGE_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let agent = handler_fn(|request: BridgeRequest| async move {
        Ok::<_, HandlerError>(echo_reply(&request))
    });
    let app = create_agent_router(agent)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Echo agent listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
