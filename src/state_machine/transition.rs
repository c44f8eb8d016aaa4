//! Pure state transition function

use super::{Effect, Event, SessionPhase};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: SessionPhase,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: SessionPhase) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Reasons an event was rejected. A rejected event leaves the session untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("An exchange is already in flight")]
    Busy,
    #[error("Message is empty")]
    EmptyMessage,
    #[error("No exchange in flight")]
    NoExchangeInFlight,
}

/// Pure transition function.
///
/// Given the same inputs it always produces the same outputs. Messages are
/// stamped with the instant carried by the event.
pub fn transition(state: &SessionPhase, event: Event) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // ============================================================
        // User input
        // ============================================================

        // Busy -> reject, one exchange per session at a time
        (SessionPhase::AwaitingResponse, Event::UserSend { .. }) => Err(TransitionError::Busy),

        // Idle | Errored + UserSend -> AwaitingResponse (prior error cleared)
        (SessionPhase::Idle | SessionPhase::Errored { .. }, Event::UserSend { text, at }) => {
            let text = text.trim();
            if text.is_empty() {
                return Err(TransitionError::EmptyMessage);
            }
            Ok(TransitionResult::new(SessionPhase::AwaitingResponse)
                .with_effect(Effect::append_user_message(text, at))
                .with_effect(Effect::PublishState)
                .with_effect(Effect::SubmitExchange))
        }

        // ============================================================
        // Exchange outcome
        // ============================================================

        // AwaitingResponse + success -> Idle. Host callbacks run before the
        // state is published, so observers of `loading == false` already see
        // the reconciled host state.
        (SessionPhase::AwaitingResponse, Event::ExchangeSucceeded { response, at }) => {
            let mut host_effects = Vec::new();
            if let Some(actions) = response.actions {
                host_effects.push(Effect::ReconcileActions { actions });
            }
            if let Some(context) = response.context {
                host_effects.push(Effect::UpdateContext { context });
            }

            Ok(TransitionResult::new(SessionPhase::Idle)
                .with_effect(Effect::append_agent_message(response.response, at))
                .with_effects(host_effects)
                .with_effect(Effect::PublishState))
        }

        // AwaitingResponse + failure -> Errored, user message stays in history
        (SessionPhase::AwaitingResponse, Event::ExchangeFailed { message }) => {
            Ok(TransitionResult::new(SessionPhase::Errored { message })
                .with_effect(Effect::PublishState))
        }

        // Outcome with nothing in flight -> stale, discard
        (
            SessionPhase::Idle | SessionPhase::Errored { .. },
            Event::ExchangeSucceeded { .. } | Event::ExchangeFailed { .. },
        ) => Err(TransitionError::NoExchangeInFlight),
    }
}
