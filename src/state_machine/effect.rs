//! Effects produced by state transitions

use crate::protocol::{ActionDescriptor, ContextSnapshot, Message, Role};
use chrono::{DateTime, Utc};

/// Effects to be executed, in order, after a state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Append a message to the session history
    AppendMessage { message: Message },

    /// Publish the current state to subscribers
    PublishState,

    /// Snapshot context and recent actions, then start one exchange
    SubmitExchange,

    /// Hand agent-issued actions to the host reconciler
    ReconcileActions { actions: Vec<ActionDescriptor> },

    /// Hand an agent-supplied context to the host update callback
    UpdateContext { context: ContextSnapshot },
}

impl Effect {
    pub fn append_user_message(content: impl Into<String>, at: DateTime<Utc>) -> Self {
        Effect::AppendMessage {
            message: Message {
                role: Role::User,
                content: content.into(),
                timestamp: at,
            },
        }
    }

    pub fn append_agent_message(content: impl Into<String>, at: DateTime<Utc>) -> Self {
        Effect::AppendMessage {
            message: Message {
                role: Role::Agent,
                content: content.into(),
                timestamp: at,
            },
        }
    }

    /// Role of the appended message, for `AppendMessage` effects
    pub fn appended_role(&self) -> Option<Role> {
        match self {
            Effect::AppendMessage { message } => Some(message.role),
            _ => None,
        }
    }
}
