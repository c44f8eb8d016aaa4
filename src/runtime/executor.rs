//! Session runtime executor

use super::{Command, IgnoredReason, SendOutcome};

use crate::context::{ActionSource, ContextProvider, ContextSink};
use crate::protocol::{BridgeRequest, Message};
use crate::reconciler::ActionReconciler;
use crate::state_machine::{transition, Effect, Event, SessionPhase, SessionState, TransitionError};
use crate::transport::Transport;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// Host capabilities the runtime drives
pub(crate) struct HostCallbacks {
    pub get_context: Arc<dyn ContextProvider>,
    pub get_actions: Option<Arc<dyn ActionSource>>,
    pub on_actions_received: Option<Arc<dyn ActionReconciler>>,
    pub on_context_updated: Option<Arc<dyn ContextSink>>,
}

/// Single owner of one session's state.
///
/// Commands from handles and exchange outcomes from the spawned transport
/// task are processed one at a time, so no locking is needed.
pub(crate) struct SessionRuntime<T>
where
    T: Transport + 'static,
{
    phase: SessionPhase,
    messages: Vec<Message>,
    transport: Arc<T>,
    host: HostCallbacks,
    command_rx: mpsc::Receiver<Command>,
    outcome_tx: mpsc::Sender<Event>,
    outcome_rx: mpsc::Receiver<Event>,
    state_tx: watch::Sender<SessionState>,
}

impl<T> SessionRuntime<T>
where
    T: Transport + 'static,
{
    pub fn new(
        initial_messages: Vec<Message>,
        transport: Arc<T>,
        host: HostCallbacks,
        command_rx: mpsc::Receiver<Command>,
        state_tx: watch::Sender<SessionState>,
    ) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::channel(1);
        Self {
            phase: SessionPhase::Idle,
            messages: initial_messages,
            transport,
            host,
            command_rx,
            outcome_tx,
            outcome_rx,
            state_tx,
        }
    }

    pub async fn run(mut self) {
        tracing::debug!(messages = self.messages.len(), "Starting bridge session");

        loop {
            tokio::select! {
                command = self.command_rx.recv() => {
                    let Some(command) = command else {
                        break;
                    };
                    self.handle_command(command);
                }
                Some(event) = self.outcome_rx.recv() => {
                    if let Err(e) = self.process_event(event) {
                        tracing::warn!(error = %e, "Discarding exchange outcome");
                    }
                }
            }
        }

        tracing::debug!("Bridge session stopped");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Send { text, reply } => {
                let outcome = match self.process_event(Event::user_send(text)) {
                    Ok(()) => SendOutcome::Accepted,
                    Err(TransitionError::EmptyMessage) => {
                        SendOutcome::Ignored(IgnoredReason::EmptyMessage)
                    }
                    // Sends are only rejected while a turn is in flight;
                    // NoExchangeInFlight is reserved for exchange outcomes
                    Err(TransitionError::Busy | TransitionError::NoExchangeInFlight) => {
                        tracing::debug!("Ignoring message, exchange already in flight");
                        SendOutcome::Ignored(IgnoredReason::Busy)
                    }
                };
                // Sender may have given up waiting
                let _ = reply.send(outcome);
            }
        }
    }

    fn process_event(&mut self, event: Event) -> Result<(), TransitionError> {
        // Pure state transition; a rejected event leaves everything untouched
        let result = transition(&self.phase, event)?;
        self.phase = result.new_state;

        for effect in result.effects {
            self.execute_effect(effect);
        }
        Ok(())
    }

    fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::AppendMessage { message } => {
                self.messages.push(message);
            }

            Effect::PublishState => {
                self.state_tx
                    .send_replace(SessionState::new(self.messages.clone(), &self.phase));
            }

            Effect::SubmitExchange => {
                // Snapshot host state now, synchronously, for this turn only
                let context = self.host.get_context.snapshot();
                let actions = self
                    .host
                    .get_actions
                    .as_ref()
                    .map(|source| source.recent_actions())
                    .unwrap_or_default();
                let request = BridgeRequest::from_history(&self.messages, actions, context);

                let transport = Arc::clone(&self.transport);
                let outcome_tx = self.outcome_tx.clone();

                tokio::spawn(async move {
                    tracing::debug!(
                        endpoint = %transport.endpoint(),
                        messages = request.messages.len(),
                        "Submitting exchange (background)"
                    );
                    let event = match transport.exchange(&request).await {
                        Ok(response) => Event::succeeded(response),
                        Err(e) => Event::failed(e.message),
                    };
                    // Runtime may have shut down; the outcome is dropped then
                    let _ = outcome_tx.send(event).await;
                });
            }

            Effect::ReconcileActions { actions } => {
                match &self.host.on_actions_received {
                    Some(reconciler) => {
                        tracing::debug!(count = actions.len(), "Reconciling agent actions");
                        run_host_callback("on_actions_received", || {
                            reconciler.reconcile(&actions);
                        });
                    }
                    None => {
                        tracing::debug!(count = actions.len(), "No reconciler registered, dropping actions");
                    }
                }
            }

            Effect::UpdateContext { context } => {
                if let Some(sink) = &self.host.on_context_updated {
                    run_host_callback("on_context_updated", || sink.context_updated(context));
                }
            }
        }
    }
}

/// Run host code so that a panic in it cannot take the session down. The
/// remaining effects of the turn, including `PublishState`, still run.
fn run_host_callback(callback: &'static str, f: impl FnOnce()) {
    if let Err(panic) = std::panic::catch_unwind(std::panic::AssertUnwindSafe(f)) {
        let reason = panic
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| panic.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        tracing::error!(callback, panic = %reason, "Host callback panicked");
    }
}
