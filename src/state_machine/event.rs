//! Events that can occur in a session

use crate::protocol::BridgeResponse;
use chrono::{DateTime, Utc};

/// Events that trigger state transitions.
///
/// Events carry the instant they were observed so the transition function
/// can stamp messages without reading the clock.
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    UserSend {
        text: String,
        at: DateTime<Utc>,
    },

    // Transport events
    ExchangeSucceeded {
        response: BridgeResponse,
        at: DateTime<Utc>,
    },
    ExchangeFailed {
        message: String,
    },
}

impl Event {
    pub fn user_send(text: impl Into<String>) -> Self {
        Event::UserSend {
            text: text.into(),
            at: Utc::now(),
        }
    }

    pub fn succeeded(response: BridgeResponse) -> Self {
        Event::ExchangeSucceeded {
            response,
            at: Utc::now(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Event::ExchangeFailed {
            message: message.into(),
        }
    }
}
