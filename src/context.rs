//! Host-supplied capabilities for reading state
//!
//! The bridge depends only on these traits, never on a concrete store.
//! Closures implement them directly, so a host usually passes
//! `move || json!({ ... })`.

use crate::protocol::{ActionDescriptor, ContextSnapshot};

/// Produces a fresh view of host state.
///
/// Invoked exactly once per outbound request, immediately before the
/// exchange starts. Implementations must read current state on every call.
pub trait ContextProvider: Send + Sync {
    fn snapshot(&self) -> ContextSnapshot;
}

impl<F> ContextProvider for F
where
    F: Fn() -> ContextSnapshot + Send + Sync,
{
    fn snapshot(&self) -> ContextSnapshot {
        self()
    }
}

/// Supplies recent local actions to send alongside the context
pub trait ActionSource: Send + Sync {
    fn recent_actions(&self) -> Vec<ActionDescriptor>;
}

impl<F> ActionSource for F
where
    F: Fn() -> Vec<ActionDescriptor> + Send + Sync,
{
    fn recent_actions(&self) -> Vec<ActionDescriptor> {
        self()
    }
}

/// Action source that never reports anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoActions;

impl ActionSource for NoActions {
    fn recent_actions(&self) -> Vec<ActionDescriptor> {
        Vec::new()
    }
}

/// Receives a context pushed back by the agent
pub trait ContextSink: Send + Sync {
    fn context_updated(&self, context: ContextSnapshot);
}

impl<F> ContextSink for F
where
    F: Fn(ContextSnapshot) + Send + Sync,
{
    fn context_updated(&self, context: ContextSnapshot) {
        self(context);
    }
}
