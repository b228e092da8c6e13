//! Content strategy summary for a source document.

use postcraft_models::{RelationshipType, Series, Tone};

use crate::recommend::{score_tones, ToneScore};

/// What a source document offers and where the current series could go next.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentStrategy {
    pub word_count: usize,
    /// Markdown headings (`#` lines) in the source.
    pub section_count: usize,
    /// Every tone with its keyword score, highest first.
    pub ranking: Vec<ToneScore>,
    /// Tones the current series has not used yet.
    pub unused_tones: Vec<Tone>,
    /// Posts already approved in the current series.
    pub series_length: usize,
    /// Relationship suggested for the next follow-up.
    pub suggested_relationship: RelationshipType,
}

impl ContentStrategy {
    pub fn analyze(markdown: &str, series: Option<&Series>) -> Self {
        let word_count = markdown.split_whitespace().count();
        let section_count = markdown
            .lines()
            .filter(|line| line.trim_start().starts_with('#'))
            .count();

        let used = series.map(Series::tones_used).unwrap_or_default();
        let unused_tones = Tone::ALL
            .into_iter()
            .filter(|t| !used.contains(t))
            .collect();

        let series_length = series.map(Series::len).unwrap_or(0);
        let follow_ups = RelationshipType::FOLLOW_UPS;
        let suggested_relationship = follow_ups[series_length % follow_ups.len()];

        Self {
            word_count,
            section_count,
            ranking: score_tones(markdown),
            unused_tones,
            series_length,
            suggested_relationship,
        }
    }

    /// Plain-text report for chat.
    pub fn render(&self) -> String {
        let mut out = format!(
            "📊 Content strategy\n\nSource: {} words, {} sections\n",
            self.word_count, self.section_count
        );

        out.push_str("\nTone fit:\n");
        for score in &self.ranking {
            out.push_str(&format!(
                "{} {}: {:.1}\n",
                score.tone.emoji(),
                score.tone.label(),
                score.score
            ));
        }

        if self.series_length > 0 {
            out.push_str(&format!("\nSeries so far: {} post(s)\n", self.series_length));
            if self.unused_tones.is_empty() {
                out.push_str("Every tone has been used in this series.\n");
            } else {
                let names: Vec<&str> = self.unused_tones.iter().map(|t| t.label()).collect();
                out.push_str(&format!("Not used yet: {}\n", names.join(", ")));
            }
            out.push_str(&format!(
                "Suggested next follow-up: {}\n",
                self.suggested_relationship.label()
            ));
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use postcraft_models::{AudienceType, GeneratedPost, Post};

    fn approved(series: &Series, tone: Tone) -> Post {
        let generated = GeneratedPost {
            tone,
            post_content: "body".into(),
            reason: String::new(),
            fallback: false,
        };
        Post::from_generated(&generated, AudienceType::Business, series.id.clone(), series.next_sequence())
    }

    #[test]
    fn test_counts_words_and_sections() {
        let markdown = "# Title\n\nSome words here.\n\n## Part two\nMore text\n";
        let strategy = ContentStrategy::analyze(markdown, None);

        assert_eq!(strategy.word_count, 10);
        assert_eq!(strategy.section_count, 2);
        assert_eq!(strategy.ranking.len(), 5);
        assert_eq!(strategy.unused_tones, Tone::ALL.to_vec());
        assert_eq!(strategy.series_length, 0);
    }

    #[test]
    fn test_unused_tones_and_relationship_cycle() {
        let mut series = Series::new("notes.md");
        let first = approved(&series, Tone::WhatBroke);
        series.push(first);

        let strategy = ContentStrategy::analyze("fixed the bug", Some(&series));
        assert!(!strategy.unused_tones.contains(&Tone::WhatBroke));
        assert_eq!(strategy.unused_tones.len(), 4);
        assert_eq!(strategy.suggested_relationship, RelationshipType::DifferentAngles);

        for _ in 0..5 {
            let next = approved(&series, Tone::MiniLesson);
            series.push(next);
        }
        let strategy = ContentStrategy::analyze("x", Some(&series));
        assert_eq!(strategy.suggested_relationship, RelationshipType::DifferentAspects);
    }

    #[test]
    fn test_render_mentions_series_only_when_present() {
        let alone = ContentStrategy::analyze("I built it", None).render();
        assert!(alone.contains("Behind-the-Build"));
        assert!(!alone.contains("Series so far"));

        let mut series = Series::new("a.md");
        let post = approved(&series, Tone::BehindTheBuild);
        series.push(post);
        let with_series = ContentStrategy::analyze("I built it", Some(&series)).render();
        assert!(with_series.contains("Series so far: 1 post(s)"));
        assert!(with_series.contains("Suggested next follow-up: Different Angles"));
    }
}
