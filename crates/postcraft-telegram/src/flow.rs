//! Conversation state machine.
//!
//! Every button press and message is turned into a [`FlowEvent`] and fed
//! through [`FlowState::on`]. Pairs missing from the transition table are
//! rejected with an [`InvalidTransition`] whose message tells the user what
//! the bot is waiting for instead.

use std::fmt;

use thiserror::Error;

/// Where a user is in the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FlowState {
    #[default]
    Idle,
    /// `/project` started; documents are being collected.
    CollectingFiles,
    AwaitingAudience,
    AwaitingTone,
    /// Waiting for a free-form instruction to add to the prompt.
    AwaitingFreeformContext,
    /// A draft is on screen with approve / regenerate / edit / discard.
    ReviewingDraft,
    AwaitingEditInstructions,
    AwaitingRelationshipChoice,
    AwaitingFollowupContext,
}

/// Something the user did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowEvent {
    SourceUploaded,
    ProjectStarted,
    FilesDone,
    AudienceChosen,
    ContextRequested,
    ContextProvided,
    ToneChosen,
    Regenerated,
    EditRequested,
    EditProvided,
    Approved,
    Discarded,
    ContinueRequested,
    RelationshipChosen,
    FollowupContextProvided,
    Cancelled,
    TimedOut,
}

/// An event that is not allowed in the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{event:?} is not possible while {state}: {}", .state.hint())]
pub struct InvalidTransition {
    pub state: FlowState,
    pub event: FlowEvent,
}

impl FlowState {
    /// Apply `event`, returning the next state.
    pub fn on(self, event: FlowEvent) -> Result<FlowState, InvalidTransition> {
        use FlowEvent as E;
        use FlowState as S;

        let next = match (self, event) {
            (_, E::Cancelled | E::TimedOut) => S::Idle,

            (S::Idle | S::AwaitingAudience | S::AwaitingTone | S::ReviewingDraft, E::SourceUploaded) => {
                S::AwaitingAudience
            }
            (S::Idle, E::ProjectStarted) => S::CollectingFiles,
            (S::CollectingFiles, E::SourceUploaded) => S::CollectingFiles,
            (S::CollectingFiles, E::FilesDone) => S::AwaitingAudience,

            (S::AwaitingAudience, E::AudienceChosen) => S::AwaitingTone,
            (S::AwaitingTone, E::ContextRequested) => S::AwaitingFreeformContext,
            (S::AwaitingFreeformContext, E::ContextProvided) => S::AwaitingTone,
            (S::AwaitingTone, E::ToneChosen) => S::ReviewingDraft,

            (S::ReviewingDraft, E::Regenerated) => S::ReviewingDraft,
            (S::ReviewingDraft, E::EditRequested) => S::AwaitingEditInstructions,
            (S::AwaitingEditInstructions, E::EditProvided) => S::ReviewingDraft,
            (S::ReviewingDraft, E::Approved | E::Discarded) => S::Idle,

            (S::Idle, E::ContinueRequested) => S::AwaitingRelationshipChoice,
            (S::AwaitingRelationshipChoice, E::RelationshipChosen) => S::AwaitingFollowupContext,
            (S::AwaitingFollowupContext, E::FollowupContextProvided) => S::ReviewingDraft,

            (state, event) => return Err(InvalidTransition { state, event }),
        };
        Ok(next)
    }

    /// True for every state except [`FlowState::Idle`].
    pub fn is_mid_flow(&self) -> bool {
        *self != FlowState::Idle
    }

    /// What the bot expects next, for error replies.
    pub fn hint(&self) -> &'static str {
        match self {
            Self::Idle => "send a markdown file to start, or /continue to extend your series",
            Self::CollectingFiles => "send more files, then /done or /batch",
            Self::AwaitingAudience => "pick an audience with the buttons above",
            Self::AwaitingTone => "pick a tone with the buttons above",
            Self::AwaitingFreeformContext => "send the extra context as a message",
            Self::ReviewingDraft => "approve, regenerate, edit or discard the draft",
            Self::AwaitingEditInstructions => "send your edit instructions as a message",
            Self::AwaitingRelationshipChoice => "pick how the follow-up relates to the last post",
            Self::AwaitingFollowupContext => "send context for the follow-up, or tap Skip",
        }
    }
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::CollectingFiles => "collecting files",
            Self::AwaitingAudience => "choosing audience",
            Self::AwaitingTone => "choosing tone",
            Self::AwaitingFreeformContext => "adding context",
            Self::ReviewingDraft => "reviewing draft",
            Self::AwaitingEditInstructions => "editing draft",
            Self::AwaitingRelationshipChoice => "choosing follow-up type",
            Self::AwaitingFollowupContext => "adding follow-up context",
        };
        f.write_str(label)
    }
}
