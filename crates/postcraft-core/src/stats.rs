//! Aggregate statistics over stored posts.

use std::collections::{BTreeMap, HashSet};

use postcraft_models::{AudienceType, Post, RelationshipType, Tone};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostStats {
    pub total: usize,
    pub approved: usize,
    pub series: usize,
    pub by_tone: BTreeMap<Tone, usize>,
    pub by_audience: BTreeMap<AudienceType, usize>,
    pub by_relationship: BTreeMap<RelationshipType, usize>,
}

impl PostStats {
    pub fn from_posts(posts: &[Post]) -> Self {
        let mut stats = Self {
            total: posts.len(),
            ..Self::default()
        };
        let mut series = HashSet::new();

        for post in posts {
            if post.approved {
                stats.approved += 1;
            }
            series.insert(post.series_id.as_str());
            *stats.by_tone.entry(post.tone).or_insert(0) += 1;
            *stats.by_audience.entry(post.audience).or_insert(0) += 1;
            *stats.by_relationship.entry(post.relationship).or_insert(0) += 1;
        }

        stats.series = series.len();
        stats
    }

    /// Plain-text report for chat.
    pub fn render(&self) -> String {
        if self.total == 0 {
            return "📈 No posts stored yet.".to_string();
        }

        let mut out = format!(
            "📈 Post statistics\n\nPosts: {} ({} approved)\nSeries: {}\n",
            self.total, self.approved, self.series
        );

        out.push_str("\nBy tone:\n");
        for (tone, count) in &self.by_tone {
            out.push_str(&format!("{} {}: {}\n", tone.emoji(), tone.label(), count));
        }

        out.push_str("\nBy audience:\n");
        for (audience, count) in &self.by_audience {
            out.push_str(&format!("{} {}: {}\n", audience.emoji(), audience.label(), count));
        }

        let follow_ups: Vec<_> = self
            .by_relationship
            .iter()
            .filter(|(r, _)| **r != RelationshipType::None)
            .collect();
        if !follow_ups.is_empty() {
            out.push_str("\nFollow-ups:\n");
            for (relationship, count) in follow_ups {
                out.push_str(&format!("{}: {}\n", relationship.label(), count));
            }
        }

        out
    }
}
