//! Generated and persisted posts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::audience::AudienceType;
use crate::ids::{PostId, SeriesId};
use crate::relationship::RelationshipType;
use crate::tone::Tone;

/// Structured fields parsed out of a raw model response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedPost {
    /// Tone the model says it used (or the default when it didn't say).
    pub tone: Tone,
    /// The post body.
    pub post_content: String,
    /// The model's explanation of its tone choice. Empty when absent.
    pub reason: String,
    /// True when the response had no recognizable markers and the whole
    /// text was taken as the post.
    #[serde(default)]
    pub fallback: bool,
}

impl GeneratedPost {
    /// Number of whitespace-separated words in the post body.
    pub fn word_count(&self) -> usize {
        self.post_content.split_whitespace().count()
    }
}

/// A post as written to the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Unique identifier for the post.
    pub id: PostId,

    /// Series this post belongs to.
    pub series_id: SeriesId,

    /// Position within the series, starting at 1.
    pub sequence: u32,

    /// Post body.
    pub content: String,

    /// Tone used.
    pub tone: Tone,

    /// Audience the post was written for.
    pub audience: AudienceType,

    /// Relationship to the parent post.
    #[serde(default)]
    pub relationship: RelationshipType,

    /// Parent post, for follow-ups.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub parent_id: Option<PostId>,

    /// Name of the markdown file the post came from.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub source_file: Option<String>,

    /// When the post was created.
    pub created_at: DateTime<Utc>,

    /// Whether the user approved the post.
    #[serde(default)]
    pub approved: bool,
}

impl Post {
    /// Creates an unapproved post from parsed model output.
    pub fn from_generated(
        generated: &GeneratedPost,
        audience: AudienceType,
        series_id: SeriesId,
        sequence: u32,
    ) -> Self {
        Self {
            id: PostId::new(),
            series_id,
            sequence,
            content: generated.post_content.clone(),
            tone: generated.tone,
            audience,
            relationship: RelationshipType::None,
            parent_id: None,
            source_file: None,
            created_at: Utc::now(),
            approved: false,
        }
    }

    /// Sets the parent post and how this post relates to it.
    pub fn with_parent(mut self, parent_id: PostId, relationship: RelationshipType) -> Self {
        self.parent_id = Some(parent_id);
        self.relationship = relationship;
        self
    }

    /// Sets the source file name.
    pub fn with_source(mut self, source_file: impl Into<String>) -> Self {
        self.source_file = Some(source_file.into());
        self
    }

    /// Marks the post approved.
    pub fn approve(&mut self) {
        self.approved = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generated() -> GeneratedPost {
        GeneratedPost {
            tone: Tone::WhatBroke,
            post_content: "The deploy failed twice before lunch.".to_string(),
            reason: "It is about a failure".to_string(),
            fallback: false,
        }
    }

    #[test]
    fn test_from_generated() {
        let series = SeriesId::new();
        let post = Post::from_generated(&generated(), AudienceType::Technical, series.clone(), 1);

        assert_eq!(post.series_id, series);
        assert_eq!(post.sequence, 1);
        assert_eq!(post.tone, Tone::WhatBroke);
        assert_eq!(post.relationship, RelationshipType::None);
        assert!(!post.approved);
    }

    #[test]
    fn test_with_parent() {
        let parent = PostId::new();
        let post = Post::from_generated(&generated(), AudienceType::Business, SeriesId::new(), 2)
            .with_parent(parent.clone(), RelationshipType::TechnicalDeepDive)
            .with_source("journal.md");

        assert_eq!(post.parent_id, Some(parent));
        assert_eq!(post.relationship, RelationshipType::TechnicalDeepDive);
        assert_eq!(post.source_file.as_deref(), Some("journal.md"));
    }

    #[test]
    fn test_word_count() {
        assert_eq!(generated().word_count(), 6);
    }
}
