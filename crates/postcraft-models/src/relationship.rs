//! How a follow-up post relates to its parent.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ParseLabelError;

/// Relationship between a follow-up post and the post it continues.
///
/// Metadata only: nothing enforces that the parent exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    DifferentAspects,
    DifferentAngles,
    SeriesContinuation,
    ThematicConnection,
    TechnicalDeepDive,
    SequentialStory,
    /// First post of a series, or unrelated.
    #[default]
    None,
}

impl RelationshipType {
    /// The six follow-up relationships offered to the user (excludes `None`).
    pub const FOLLOW_UPS: [RelationshipType; 6] = [
        RelationshipType::DifferentAspects,
        RelationshipType::DifferentAngles,
        RelationshipType::SeriesContinuation,
        RelationshipType::ThematicConnection,
        RelationshipType::TechnicalDeepDive,
        RelationshipType::SequentialStory,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Self::DifferentAspects => "different_aspects",
            Self::DifferentAngles => "different_angles",
            Self::SeriesContinuation => "series_continuation",
            Self::ThematicConnection => "thematic_connection",
            Self::TechnicalDeepDive => "technical_deep_dive",
            Self::SequentialStory => "sequential_story",
            Self::None => "none",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::DifferentAspects => "Different Aspects",
            Self::DifferentAngles => "Different Angles",
            Self::SeriesContinuation => "Series Continuation",
            Self::ThematicConnection => "Thematic Connection",
            Self::TechnicalDeepDive => "Technical Deep Dive",
            Self::SequentialStory => "Sequential Story",
            Self::None => "None",
        }
    }

    /// Guidance given to the model when writing a follow-up of this kind.
    pub fn guidance(&self) -> &'static str {
        match self {
            Self::DifferentAspects => {
                "Cover a different part of the same project that the previous post did not touch."
            }
            Self::DifferentAngles => {
                "Revisit the same topic from a new perspective: the user, the cost, the trade-offs."
            }
            Self::SeriesContinuation => {
                "Pick up where the previous post stopped, as the next chapter of the same series."
            }
            Self::ThematicConnection => {
                "Write about a related theme that connects back to the previous post in one line."
            }
            Self::TechnicalDeepDive => {
                "Go one level deeper into how one piece of the previous post actually works."
            }
            Self::SequentialStory => {
                "Tell what happened next, keeping the chronological thread of the previous post."
            }
            Self::None => "Write a standalone post.",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::FOLLOW_UPS
            .into_iter()
            .chain(std::iter::once(Self::None))
            .find(|r| r.code() == code)
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for RelationshipType {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_lowercase().replace([' ', '-'], "_");
        Self::from_code(&code).ok_or_else(|| ParseLabelError::new("relationship", s))
    }
}
