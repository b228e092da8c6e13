//! Core data models for Postcraft.
//!
//! This crate provides the fundamental data types shared by every Postcraft
//! crate: the five brand tones, audience types, follow-up relationship types,
//! generated and persisted posts, and the series that groups them.

pub mod audience;
pub mod ids;
pub mod post;
pub mod relationship;
pub mod series;
pub mod tone;

use thiserror::Error;

// Re-export main types
pub use audience::AudienceType;
pub use ids::{PostId, SeriesId};
pub use post::{GeneratedPost, Post};
pub use relationship::RelationshipType;
pub use series::Series;
pub use tone::Tone;

/// Error returned when a label does not match any known variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value}")]
pub struct ParseLabelError {
    /// Which enum was being parsed (e.g. "tone").
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

impl ParseLabelError {
    pub(crate) fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}
