//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::*;
use crate::protocol::{ActionDescriptor, BridgeResponse, Role};
use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use serde_json::json;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_phase() -> impl Strategy<Value = SessionPhase> {
    prop_oneof![
        Just(SessionPhase::Idle),
        Just(SessionPhase::AwaitingResponse),
        "[a-zA-Z ]{1,30}".prop_map(|message| SessionPhase::Errored { message }),
    ]
}

fn arb_accepting_phase() -> impl Strategy<Value = SessionPhase> {
    prop_oneof![
        Just(SessionPhase::Idle),
        "[a-zA-Z ]{1,30}".prop_map(|message| SessionPhase::Errored { message }),
    ]
}

fn arb_blank_text() -> impl Strategy<Value = String> {
    "[ \t\n]{0,8}"
}

fn arb_action() -> impl Strategy<Value = ActionDescriptor> {
    (
        prop_oneof![Just("post"), Just("put"), Just("delete")],
        0i64..100,
    )
        .prop_map(|(tag, id)| ActionDescriptor::new(tag, json!({ "id": id })))
}

fn arb_response() -> impl Strategy<Value = BridgeResponse> {
    (
        "[a-zA-Z .]{0,40}",
        proptest::option::of(proptest::collection::vec(arb_action(), 0..4)),
        proptest::option::of(Just(json!({"items": []}))),
    )
        .prop_map(|(response, actions, context)| BridgeResponse {
            response,
            actions,
            context,
        })
}

fn arb_event() -> impl Strategy<Value = Event> {
    let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    prop_oneof![
        "[a-zA-Z ]{0,20}".prop_map(move |text| Event::UserSend { text, at }),
        arb_response().prop_map(move |response| Event::ExchangeSucceeded { response, at }),
        "[a-zA-Z ]{1,20}".prop_map(|message| Event::ExchangeFailed { message }),
    ]
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Blank input never starts a turn, whatever the phase
    #[test]
    fn prop_blank_send_is_rejected(phase in arb_phase(), text in arb_blank_text()) {
        let result = transition(&phase, Event::user_send(text));
        prop_assert!(result.is_err());
    }

    /// Busy sessions reject input without effects
    #[test]
    fn prop_send_while_busy_is_rejected(text in "[a-zA-Z]{1,20}") {
        let result = transition(&SessionPhase::AwaitingResponse, Event::user_send(text));
        prop_assert_eq!(result.err(), Some(TransitionError::Busy));
    }

    /// Accepted input appends exactly one user message and submits exactly once
    #[test]
    fn prop_send_starts_one_exchange(phase in arb_accepting_phase(), text in "[a-zA-Z]{1,20}") {
        let result = transition(&phase, Event::user_send(text)).unwrap();
        prop_assert!(result.new_state.is_loading());
        prop_assert!(result.new_state.error().is_none());
        let submits = result.effects.iter().filter(|e| **e == Effect::SubmitExchange).count();
        prop_assert_eq!(submits, 1);
        let roles: Vec<_> = result.effects.iter().filter_map(Effect::appended_role).collect();
        prop_assert_eq!(roles, vec![Role::User]);
    }

    /// Success appends one agent message; reconciliation only when actions are present
    #[test]
    fn prop_success_reconciles_only_present_actions(response in arb_response()) {
        let had_actions = response.actions.is_some();
        let had_context = response.context.is_some();
        let result = transition(&SessionPhase::AwaitingResponse, Event::succeeded(response)).unwrap();

        prop_assert_eq!(&result.new_state, &SessionPhase::Idle);
        let roles: Vec<_> = result.effects.iter().filter_map(Effect::appended_role).collect();
        prop_assert_eq!(roles, vec![Role::Agent]);
        let reconciles = result.effects.iter().any(|e| matches!(e, Effect::ReconcileActions { .. }));
        prop_assert_eq!(reconciles, had_actions);
        let updates = result.effects.iter().any(|e| matches!(e, Effect::UpdateContext { .. }));
        prop_assert_eq!(updates, had_context);
    }

    /// Over any event sequence: every agent message directly answers a user
    /// message, and history grows by 2 per success and 1 per failure.
    #[test]
    fn prop_history_growth(events in proptest::collection::vec(arb_event(), 0..40)) {
        let mut phase = SessionPhase::Idle;
        let mut history: Vec<Role> = Vec::new();
        let mut successes = 0usize;
        let mut failures = 0usize;

        for event in events {
            let is_success = matches!(event, Event::ExchangeSucceeded { .. });
            let Ok(result) = transition(&phase, event) else {
                continue;
            };
            if result.new_state == SessionPhase::Idle && is_success {
                successes += 1;
            } else if result.new_state.error().is_some() {
                failures += 1;
            }
            history.extend(result.effects.iter().filter_map(Effect::appended_role));
            phase = result.new_state;
        }

        let in_flight = usize::from(phase.is_loading());
        prop_assert_eq!(history.len(), 2 * successes + failures + in_flight);
        for (i, role) in history.iter().enumerate() {
            if *role == Role::Agent {
                prop_assert!(i > 0);
                prop_assert_eq!(history[i - 1], Role::User);
            }
        }
    }
}
