//! Wire types shared by the bridge client and the agent endpoint
//!
//! Request (client -> agent): `{ messages, actions, context }`
//! Response (agent -> client): `{ response, actions?, context? }`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Opaque view of host state. The bridge forwards it without inspecting it.
pub type ContextSnapshot = Value;

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    /// Agent backends commonly call this role `assistant`
    #[serde(alias = "assistant")]
    Agent,
}

/// A message in the session history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn agent(content: impl Into<String>) -> Self {
        Self::new(Role::Agent, content)
    }
}

/// History entry as sent over the wire (timestamp stripped)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: Role,
    pub content: String,
}

impl From<&Message> for WireMessage {
    fn from(msg: &Message) -> Self {
        Self {
            role: msg.role,
            content: msg.content.clone(),
        }
    }
}

/// Typed instruction requesting a host state mutation.
///
/// Decoding never fails: an element that is not an object, or whose `type`
/// is missing or not a string, decodes with an empty tag. Such descriptors
/// never match a handler and are skipped by the reconciler instead of failing
/// the whole response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct ActionDescriptor {
    #[serde(rename = "type")]
    pub action_type: String,
    pub payload: Value,
}

impl From<Value> for ActionDescriptor {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(mut map) => {
                let action_type = match map.remove("type") {
                    Some(Value::String(tag)) => tag,
                    _ => String::new(),
                };
                let payload = map.remove("payload").unwrap_or(Value::Null);
                Self {
                    action_type,
                    payload,
                }
            }
            other => Self {
                action_type: String::new(),
                payload: other,
            },
        }
    }
}

impl ActionDescriptor {
    pub fn new(action_type: impl Into<String>, payload: Value) -> Self {
        Self {
            action_type: action_type.into(),
            payload,
        }
    }

    /// Payload as a key-value mapping, if it is one
    pub fn payload_object(&self) -> Option<&Map<String, Value>> {
        self.payload.as_object()
    }
}

/// Outbound payload for one turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeRequest {
    pub messages: Vec<WireMessage>,
    #[serde(default)]
    pub actions: Vec<ActionDescriptor>,
    #[serde(default)]
    pub context: ContextSnapshot,
}

impl BridgeRequest {
    /// Build a request from session history, stripping timestamps
    pub fn from_history(
        history: &[Message],
        actions: Vec<ActionDescriptor>,
        context: ContextSnapshot,
    ) -> Self {
        Self {
            messages: history.iter().map(WireMessage::from).collect(),
            actions,
            context,
        }
    }

    /// Content of the most recent user message, if any
    pub fn last_user_message(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }
}

/// Inbound payload for one turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeResponse {
    pub response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<ActionDescriptor>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<ContextSnapshot>,
}

impl BridgeResponse {
    pub fn text(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            actions: None,
            context: None,
        }
    }

    #[must_use]
    pub fn with_actions(mut self, actions: Vec<ActionDescriptor>) -> Self {
        self.actions = Some(actions);
        self
    }

    #[must_use]
    pub fn with_context(mut self, context: ContextSnapshot) -> Self {
        self.context = Some(context);
        self
    }
}
