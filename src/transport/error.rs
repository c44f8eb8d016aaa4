//! Transport error types

use std::time::Duration;
use thiserror::Error;

/// Transport error with classification
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Network, message)
    }

    /// Non-success HTTP status. The message is built from the code and its
    /// canonical description.
    pub fn status(code: u16, reason: Option<&str>) -> Self {
        let message = match reason {
            Some(reason) => format!("Request failed with status {code}: {reason}"),
            None => format!("Request failed with status {code}"),
        };
        Self::new(TransportErrorKind::Status(code), message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(
            TransportErrorKind::Parse,
            format!("Invalid response body: {}", message.into()),
        )
    }

    pub fn timeout(after: Duration) -> Self {
        Self::new(
            TransportErrorKind::Timeout,
            format!("Request timed out after {}ms", after.as_millis()),
        )
    }

    pub fn invalid_endpoint(endpoint: &str, reason: impl std::fmt::Display) -> Self {
        Self::new(
            TransportErrorKind::InvalidEndpoint,
            format!("Invalid endpoint '{endpoint}': {reason}"),
        )
    }

    /// HTTP status code, if the failure came from one
    pub fn status_code(&self) -> Option<u16> {
        match self.kind {
            TransportErrorKind::Status(code) => Some(code),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::status(status.as_u16(), status.canonical_reason());
        }
        if err.is_decode() {
            return Self::parse(err.to_string());
        }
        Self::network(err.to_string())
    }
}

/// Error classification.
///
/// Every kind fails the turn the same way; the classification exists for
/// logging and for hosts layering their own policy around the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Connection refused, reset, DNS failure
    Network,
    /// Non-2xx response
    Status(u16),
    /// Body not decodable as a response payload
    Parse,
    /// Deadline applied by a wrapping `TimeoutTransport`
    Timeout,
    /// Endpoint could not be turned into a URL
    InvalidEndpoint,
}
