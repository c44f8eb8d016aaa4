//! Runtime for bridge sessions
//!
//! `AgentBridge::spawn` starts one task per session. The task owns the
//! history and phase; hosts talk to it through a cloneable `BridgeHandle`
//! and read state reactively from a watch channel.

mod executor;

#[cfg(test)]
pub mod testing;

use executor::{HostCallbacks, SessionRuntime};

use crate::config::BridgeConfig;
use crate::context::{ActionSource, ContextProvider, ContextSink};
use crate::protocol::Message;
use crate::reconciler::ActionReconciler;
use crate::state_machine::{SessionPhase, SessionState};
use crate::transport::{HttpTransport, LoggingTransport, Transport};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::Instrument;

/// Requests from handles to the session task
#[derive(Debug)]
pub(crate) enum Command {
    Send {
        text: String,
        reply: oneshot::Sender<SendOutcome>,
    },
}

/// What happened to a `send_message` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// User message appended and exchange started
    Accepted,
    /// Nothing changed
    Ignored(IgnoredReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoredReason {
    /// A turn is already in flight
    Busy,
    /// Text was empty after trimming
    EmptyMessage,
    /// The session task is gone
    Closed,
}

/// Host-facing construction options.
///
/// Only `get_context` is required; everything else has a default.
pub struct BridgeOptions {
    endpoint: Option<String>,
    initial_messages: Vec<Message>,
    get_context: Arc<dyn ContextProvider>,
    get_actions: Option<Arc<dyn ActionSource>>,
    on_actions_received: Option<Arc<dyn ActionReconciler>>,
    on_context_updated: Option<Arc<dyn ContextSink>>,
}

impl BridgeOptions {
    pub fn new(get_context: impl ContextProvider + 'static) -> Self {
        Self {
            endpoint: None,
            initial_messages: Vec::new(),
            get_context: Arc::new(get_context),
            get_actions: None,
            on_actions_received: None,
            on_context_updated: None,
        }
    }

    /// Absolute URL or path; defaults to `/chat` on the configured base URL
    #[must_use]
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    #[must_use]
    pub fn initial_messages(mut self, messages: Vec<Message>) -> Self {
        self.initial_messages = messages;
        self
    }

    #[must_use]
    pub fn get_actions(mut self, source: impl ActionSource + 'static) -> Self {
        self.get_actions = Some(Arc::new(source));
        self
    }

    #[must_use]
    pub fn on_actions_received(mut self, reconciler: impl ActionReconciler + 'static) -> Self {
        self.on_actions_received = Some(Arc::new(reconciler));
        self
    }

    #[must_use]
    pub fn on_context_updated(mut self, sink: impl ContextSink + 'static) -> Self {
        self.on_context_updated = Some(Arc::new(sink));
        self
    }

    fn into_parts(self) -> (Option<String>, Vec<Message>, HostCallbacks) {
        let host = HostCallbacks {
            get_context: self.get_context,
            get_actions: self.get_actions,
            on_actions_received: self.on_actions_received,
            on_context_updated: self.on_context_updated,
        };
        (self.endpoint, self.initial_messages, host)
    }
}

/// Factory for bridge sessions
pub struct AgentBridge;

impl AgentBridge {
    /// Start a session that talks HTTP to the configured endpoint.
    ///
    /// Must be called inside a tokio runtime.
    pub fn spawn(options: BridgeOptions) -> BridgeHandle {
        let mut config = BridgeConfig::from_env();
        if let Some(endpoint) = &options.endpoint {
            config = config.with_endpoint(endpoint.clone());
        }
        let transport = LoggingTransport::new(HttpTransport::from_config(&config));
        Self::spawn_with_transport(options, transport)
    }

    /// Start a session over any transport
    pub fn spawn_with_transport<T>(options: BridgeOptions, transport: T) -> BridgeHandle
    where
        T: Transport + 'static,
    {
        let (_, initial_messages, host) = options.into_parts();
        let session_id = uuid::Uuid::new_v4().to_string();

        let (command_tx, command_rx) = mpsc::channel(32);
        let initial_state = SessionState::new(initial_messages.clone(), &SessionPhase::Idle);
        let (state_tx, state_rx) = watch::channel(initial_state);

        let runtime = SessionRuntime::new(
            initial_messages,
            Arc::new(transport),
            host,
            command_rx,
            state_tx,
        );
        let span = tracing::info_span!("bridge_session", session_id = %session_id);
        tokio::spawn(runtime.run().instrument(span));

        BridgeHandle {
            session_id,
            command_tx,
            state_rx,
        }
    }
}

/// Handle to a running session. Cheap to clone; the session stops when the
/// last handle is dropped.
#[derive(Clone)]
pub struct BridgeHandle {
    session_id: String,
    command_tx: mpsc::Sender<Command>,
    state_rx: watch::Receiver<SessionState>,
}

impl BridgeHandle {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Start a turn. Ignored while a turn is in flight or when the text is
    /// blank. Returns once the session has applied or ignored the message;
    /// the agent's reply arrives later through the state.
    pub async fn send_message(&self, text: impl Into<String>) -> SendOutcome {
        let (reply, outcome) = oneshot::channel();
        let command = Command::Send {
            text: text.into(),
            reply,
        };
        if self.command_tx.send(command).await.is_err() {
            return SendOutcome::Ignored(IgnoredReason::Closed);
        }
        outcome
            .await
            .unwrap_or(SendOutcome::Ignored(IgnoredReason::Closed))
    }

    /// Current state snapshot
    pub fn state(&self) -> SessionState {
        self.state_rx.borrow().clone()
    }

    pub fn messages(&self) -> Vec<Message> {
        self.state_rx.borrow().messages.clone()
    }

    pub fn loading(&self) -> bool {
        self.state_rx.borrow().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state_rx.borrow().error.clone()
    }

    /// Receiver notified on every published state change
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_rx.clone()
    }

    /// Wait until no turn is in flight and return that state
    pub async fn settled(&self) -> SessionState {
        let mut rx = self.state_rx.clone();
        if let Ok(state) = rx.wait_for(|state| !state.loading).await {
            return state.clone();
        }
        // Session task is gone; the last published state is final
        let state = rx.borrow().clone();
        state
    }
}

impl std::fmt::Debug for BridgeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state_rx.borrow();
        f.debug_struct("BridgeHandle")
            .field("session_id", &self.session_id)
            .field("messages", &state.messages.len())
            .field("loading", &state.loading)
            .field("error", &state.error)
            .finish()
    }
}
