//! Inline button payloads.
//!
//! Telegram limits callback data to 64 bytes, so actions are short
//! `action[:arg]` strings.

use std::fmt;
use std::str::FromStr;

use postcraft_models::{AudienceType, RelationshipType, Tone};

/// Telegram's callback data limit in bytes.
pub const MAX_CALLBACK_BYTES: usize = 64;

/// What an inline button does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    Audience(AudienceType),
    /// `None` lets the model pick.
    Tone(Option<Tone>),
    AddContext,
    /// Generate without adding context.
    Generate,
    Approve,
    Regenerate,
    Edit,
    Discard,
    Relationship(RelationshipType),
    SkipContext,
    BatchApprove(usize),
}

impl fmt::Display for CallbackAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Audience(a) => write!(f, "aud:{}", a.code()),
            Self::Tone(Some(t)) => write!(f, "tone:{}", t.code()),
            Self::Tone(None) => f.write_str("tone:auto"),
            Self::AddContext => f.write_str("ctx"),
            Self::Generate => f.write_str("gen"),
            Self::Approve => f.write_str("approve"),
            Self::Regenerate => f.write_str("regen"),
            Self::Edit => f.write_str("edit"),
            Self::Discard => f.write_str("discard"),
            Self::Relationship(r) => write!(f, "rel:{}", r.code()),
            Self::SkipContext => f.write_str("skipctx"),
            Self::BatchApprove(n) => write!(f, "bapprove:{}", n),
        }
    }
}

/// Callback data that is not one of ours.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown callback data: {0}")]
pub struct UnknownCallback(pub String);

impl FromStr for CallbackAction {
    type Err = UnknownCallback;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let unknown = || UnknownCallback(data.to_string());
        let (action, arg) = match data.split_once(':') {
            Some((action, arg)) => (action, Some(arg)),
            None => (data, None),
        };

        let parsed = match (action, arg) {
            ("aud", Some(code)) => Self::Audience(code.parse().map_err(|_| unknown())?),
            ("tone", Some("auto")) => Self::Tone(None),
            ("tone", Some(code)) => Self::Tone(Some(Tone::from_code(code).ok_or_else(unknown)?)),
            ("ctx", None) => Self::AddContext,
            ("gen", None) => Self::Generate,
            ("approve", None) => Self::Approve,
            ("regen", None) => Self::Regenerate,
            ("edit", None) => Self::Edit,
            ("discard", None) => Self::Discard,
            ("rel", Some(code)) => {
                Self::Relationship(RelationshipType::from_code(code).ok_or_else(unknown)?)
            }
            ("skipctx", None) => Self::SkipContext,
            ("bapprove", Some(n)) => Self::BatchApprove(n.parse().map_err(|_| unknown())?),
            _ => return Err(unknown()),
        };
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_actions() -> Vec<CallbackAction> {
        let mut actions = vec![
            CallbackAction::Tone(None),
            CallbackAction::AddContext,
            CallbackAction::Generate,
            CallbackAction::Approve,
            CallbackAction::Regenerate,
            CallbackAction::Edit,
            CallbackAction::Discard,
            CallbackAction::SkipContext,
            CallbackAction::BatchApprove(12),
        ];
        actions.extend(AudienceType::ALL.map(CallbackAction::Audience));
        actions.extend(Tone::ALL.map(|t| CallbackAction::Tone(Some(t))));
        actions.extend(RelationshipType::FOLLOW_UPS.map(CallbackAction::Relationship));
        actions
    }

    #[test]
    fn test_every_action_parses_back_and_fits() {
        for action in all_actions() {
            let data = action.to_string();
            assert!(data.len() <= MAX_CALLBACK_BYTES, "{} too long", data);
            assert_eq!(data.parse::<CallbackAction>().unwrap(), action);
        }
    }

    #[test]
    fn test_wire_format() {
        assert_eq!(CallbackAction::Audience(AudienceType::Technical).to_string(), "aud:technical");
        assert_eq!(CallbackAction::Tone(None).to_string(), "tone:auto");
        assert_eq!(CallbackAction::BatchApprove(0).to_string(), "bapprove:0");
    }

    #[test]
    fn test_rejects_unknown() {
        for data in ["", "nope", "aud:marketing", "tone:loud", "bapprove:x", "approve:1", "rel:none2"] {
            assert!(data.parse::<CallbackAction>().is_err(), "{} parsed", data);
        }
    }
}
