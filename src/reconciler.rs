//! Applying agent-issued actions to host state
//!
//! Dispatch is a lookup from the `type` tag to a registered handler, so the
//! set of mutations the agent can request is exactly the set of handlers the
//! host registered. Application is best-effort: a descriptor that has no
//! handler, carries a malformed payload, or whose handler fails is skipped
//! and the rest of the batch still runs, left to right.

use crate::protocol::ActionDescriptor;
use serde_json::{Map, Value};
use std::collections::HashMap;
use thiserror::Error;

/// Host capability that applies a batch of actions.
///
/// Never fails: per-action problems stay local to the host.
pub trait ActionReconciler: Send + Sync {
    fn reconcile(&self, actions: &[ActionDescriptor]);
}

impl<F> ActionReconciler for F
where
    F: Fn(&[ActionDescriptor]) + Send + Sync,
{
    fn reconcile(&self, actions: &[ActionDescriptor]) {
        self(actions);
    }
}

/// Why a single action was skipped
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("no handler for action type '{0}'")]
    UnknownType(String),
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
    #[error("target not found: {0}")]
    NotFound(String),
    #[error("rejected: {0}")]
    Rejected(String),
}

type Handler = Box<dyn Fn(&Map<String, Value>) -> Result<(), ActionError> + Send + Sync>;

/// An action that was not applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedAction {
    /// Position in the batch
    pub index: usize,
    pub action_type: String,
    pub reason: ActionError,
}

/// Outcome of one batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub applied: usize,
    pub skipped: Vec<SkippedAction>,
}

/// Tag-to-handler lookup table
#[derive(Default)]
pub struct ActionTable {
    handlers: HashMap<String, Handler>,
}

impl ActionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the handler for one action type. A later registration for
    /// the same tag replaces the earlier one.
    #[must_use]
    pub fn on<F>(mut self, action_type: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Map<String, Value>) -> Result<(), ActionError> + Send + Sync + 'static,
    {
        self.handlers.insert(action_type.into(), Box::new(handler));
        self
    }

    /// Registered action types, sorted
    pub fn action_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    /// Apply a batch in order and report what happened
    pub fn apply(&self, actions: &[ActionDescriptor]) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        for (index, action) in actions.iter().enumerate() {
            match self.apply_one(action) {
                Ok(()) => report.applied += 1,
                Err(reason) => {
                    tracing::debug!(
                        index,
                        action_type = %action.action_type,
                        reason = %reason,
                        "Skipping action"
                    );
                    report.skipped.push(SkippedAction {
                        index,
                        action_type: action.action_type.clone(),
                        reason,
                    });
                }
            }
        }

        report
    }

    fn apply_one(&self, action: &ActionDescriptor) -> Result<(), ActionError> {
        let handler = self
            .handlers
            .get(&action.action_type)
            .ok_or_else(|| ActionError::UnknownType(action.action_type.clone()))?;
        let payload = action
            .payload_object()
            .ok_or_else(|| ActionError::MalformedPayload("payload is not an object".to_string()))?;
        handler(payload)
    }
}

impl ActionReconciler for ActionTable {
    fn reconcile(&self, actions: &[ActionDescriptor]) {
        let report = self.apply(actions);
        tracing::debug!(
            applied = report.applied,
            skipped = report.skipped.len(),
            "Reconciled agent actions"
        );
    }
}

impl std::fmt::Debug for ActionTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionTable")
            .field("action_types", &self.action_types())
            .finish()
    }
}

/// Read a required string field
pub fn payload_str<'a>(payload: &'a Map<String, Value>, key: &str) -> Result<&'a str, ActionError> {
    payload
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| ActionError::MalformedPayload(format!("missing string field '{key}'")))
}

/// Read a required integer field. Integral floats and numeric strings are
/// accepted since agents are loose about number encoding.
#[allow(clippy::cast_possible_truncation)] // float is range-checked first
pub fn payload_i64(payload: &Map<String, Value>, key: &str) -> Result<i64, ActionError> {
    let value = payload
        .get(key)
        .ok_or_else(|| ActionError::MalformedPayload(format!("missing field '{key}'")))?;

    let parsed = match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract().abs() < f64::EPSILON && f.abs() < 9.0e15)
                .map(|f| f.round() as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };

    parsed.ok_or_else(|| ActionError::MalformedPayload(format!("field '{key}' is not an integer")))
}
