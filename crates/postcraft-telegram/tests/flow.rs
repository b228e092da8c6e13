//! Transition table coverage for the conversation state machine.

use postcraft_telegram::{FlowEvent, FlowState};

use FlowEvent as E;
use FlowState as S;

const STATES: [FlowState; 9] = [
    S::Idle,
    S::CollectingFiles,
    S::AwaitingAudience,
    S::AwaitingTone,
    S::AwaitingFreeformContext,
    S::ReviewingDraft,
    S::AwaitingEditInstructions,
    S::AwaitingRelationshipChoice,
    S::AwaitingFollowupContext,
];

const EVENTS: [FlowEvent; 17] = [
    E::SourceUploaded,
    E::ProjectStarted,
    E::FilesDone,
    E::AudienceChosen,
    E::ContextRequested,
    E::ContextProvided,
    E::ToneChosen,
    E::Regenerated,
    E::EditRequested,
    E::EditProvided,
    E::Approved,
    E::Discarded,
    E::ContinueRequested,
    E::RelationshipChosen,
    E::FollowupContextProvided,
    E::Cancelled,
    E::TimedOut,
];

/// Every allowed (from, event, to) triple apart from cancel and timeout.
fn allowed() -> Vec<(FlowState, FlowEvent, FlowState)> {
    vec![
        (S::Idle, E::SourceUploaded, S::AwaitingAudience),
        (S::AwaitingAudience, E::SourceUploaded, S::AwaitingAudience),
        (S::AwaitingTone, E::SourceUploaded, S::AwaitingAudience),
        (S::ReviewingDraft, E::SourceUploaded, S::AwaitingAudience),
        (S::Idle, E::ProjectStarted, S::CollectingFiles),
        (S::CollectingFiles, E::SourceUploaded, S::CollectingFiles),
        (S::CollectingFiles, E::FilesDone, S::AwaitingAudience),
        (S::AwaitingAudience, E::AudienceChosen, S::AwaitingTone),
        (S::AwaitingTone, E::ContextRequested, S::AwaitingFreeformContext),
        (S::AwaitingFreeformContext, E::ContextProvided, S::AwaitingTone),
        (S::AwaitingTone, E::ToneChosen, S::ReviewingDraft),
        (S::ReviewingDraft, E::Regenerated, S::ReviewingDraft),
        (S::ReviewingDraft, E::EditRequested, S::AwaitingEditInstructions),
        (S::AwaitingEditInstructions, E::EditProvided, S::ReviewingDraft),
        (S::ReviewingDraft, E::Approved, S::Idle),
        (S::ReviewingDraft, E::Discarded, S::Idle),
        (S::Idle, E::ContinueRequested, S::AwaitingRelationshipChoice),
        (S::AwaitingRelationshipChoice, E::RelationshipChosen, S::AwaitingFollowupContext),
        (S::AwaitingFollowupContext, E::FollowupContextProvided, S::ReviewingDraft),
    ]
}

#[test]
fn allowed_transitions_reach_expected_state() {
    for (from, event, to) in allowed() {
        assert_eq!(from.on(event), Ok(to), "{:?} + {:?}", from, event);
    }
}

#[test]
fn cancel_and_timeout_always_return_to_idle() {
    for state in STATES {
        assert_eq!(state.on(E::Cancelled), Ok(S::Idle));
        assert_eq!(state.on(E::TimedOut), Ok(S::Idle));
    }
}

#[test]
fn every_other_pair_is_rejected() {
    let allowed = allowed();
    for state in STATES {
        for event in EVENTS {
            if matches!(event, E::Cancelled | E::TimedOut) {
                continue;
            }
            let listed = allowed.iter().any(|(f, e, _)| *f == state && *e == event);
            let result = state.on(event);
            if listed {
                assert!(result.is_ok(), "{:?} + {:?} should be allowed", state, event);
            } else {
                let err = result.expect_err("pair is not in the table");
                assert_eq!(err.state, state);
                assert_eq!(err.event, event);
            }
        }
    }
}

#[test]
fn follow_up_round_trip() {
    let state = S::Idle
        .on(E::ContinueRequested)
        .and_then(|s| s.on(E::RelationshipChosen))
        .and_then(|s| s.on(E::FollowupContextProvided))
        .and_then(|s| s.on(E::EditRequested))
        .and_then(|s| s.on(E::EditProvided))
        .and_then(|s| s.on(E::Approved));
    assert_eq!(state, Ok(S::Idle));
}

#[test]
fn rejection_message_names_next_step() {
    let err = S::AwaitingAudience.on(E::Approved).unwrap_err();
    assert!(err.to_string().contains(S::AwaitingAudience.hint()));
}
