//! Core session state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions:
//! `transition` maps `(phase, event)` to a new phase plus the effects the
//! runtime must execute. No I/O happens here.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::Event;
pub use state::{SessionPhase, SessionState};
pub use transition::{transition, TransitionError, TransitionResult};
