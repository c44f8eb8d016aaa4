//! Agent State Bridge
//!
//! Keeps a conversational agent and a host application's live state in
//! sync. Each user turn ships the full history, the host's recent actions
//! and a fresh context snapshot to an agent endpoint; the reply's actions
//! are reconciled back into host state through a tag-keyed handler table.
//!
//! ```no_run
//! use agent_state_bridge::{AgentBridge, BridgeOptions};
//! use serde_json::json;
//!
//! # async fn demo() {
//! let bridge = AgentBridge::spawn(
//!     BridgeOptions::new(|| json!({ "todos": [] })).endpoint("/chat"),
//! );
//! bridge.send_message("add milk").await;
//! let state = bridge.settled().await;
//! println!("{} messages", state.messages.len());
//! # }
//! ```

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod config;
pub mod context;
pub mod protocol;
pub mod reconciler;
pub mod runtime;
pub mod server;
pub mod state_machine;
pub mod transport;

pub use config::BridgeConfig;
pub use context::{ActionSource, ContextProvider, ContextSink, NoActions};
pub use protocol::{
    ActionDescriptor, BridgeRequest, BridgeResponse, ContextSnapshot, Message, Role,
};
pub use reconciler::{ActionError, ActionReconciler, ActionTable, ReconcileReport};
pub use runtime::{AgentBridge, BridgeHandle, BridgeOptions, IgnoredReason, SendOutcome};
pub use server::{
    create_agent_router, create_agent_router_with_prefix, handler_fn, AgentHandler, HandlerError,
};
pub use state_machine::SessionState;
pub use transport::{
    HttpTransport, LoggingTransport, TimeoutTransport, Transport, TransportError,
    TransportErrorKind,
};
