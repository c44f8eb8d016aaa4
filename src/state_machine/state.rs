//! Session state types

use crate::protocol::Message;
use serde::{Deserialize, Serialize};

/// Phase of a bridge session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionPhase {
    /// Ready for user input, no exchange in flight
    #[default]
    Idle,

    /// User message appended, exchange with the agent in flight
    AwaitingResponse,

    /// Last exchange failed. Accepts input exactly like `Idle`; the message
    /// is what hosts read as `error`.
    Errored { message: String },
}

impl SessionPhase {
    /// True while an exchange is in flight
    pub fn is_loading(&self) -> bool {
        matches!(self, SessionPhase::AwaitingResponse)
    }

    /// Error left behind by the last failed exchange
    pub fn error(&self) -> Option<&str> {
        match self {
            SessionPhase::Errored { message } => Some(message),
            _ => None,
        }
    }

    /// Check if a new turn can start
    pub fn accepts_input(&self) -> bool {
        !self.is_loading()
    }
}

/// Snapshot of a session as the host reads it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub messages: Vec<Message>,
    pub loading: bool,
    pub error: Option<String>,
}

impl SessionState {
    pub fn new(messages: Vec<Message>, phase: &SessionPhase) -> Self {
        Self {
            messages,
            loading: phase.is_loading(),
            error: phase.error().map(str::to_string),
        }
    }
}
