//! Audience types selecting vocabulary complexity.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ParseLabelError;

/// Who the post is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AudienceType {
    /// Business owners and non-technical readers.
    #[default]
    Business,
    /// Developers and technical peers.
    Technical,
}

impl AudienceType {
    /// Both audiences in display order.
    pub const ALL: [AudienceType; 2] = [AudienceType::Business, AudienceType::Technical];

    /// Machine code used in callbacks and records.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Business => "business",
            Self::Technical => "technical",
        }
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Business => "Business",
            Self::Technical => "Technical",
        }
    }

    /// Emoji shown on audience buttons.
    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Business => "💼",
            Self::Technical => "👩‍💻",
        }
    }
}

impl fmt::Display for AudienceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for AudienceType {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "business" | "biz" => Ok(Self::Business),
            "technical" | "tech" => Ok(Self::Technical),
            _ => Err(ParseLabelError::new("audience", s)),
        }
    }
}
