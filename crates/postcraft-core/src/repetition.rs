//! "Avoid repeating" block built from previously generated posts.
//!
//! Follow-up posts tend to reuse the openings, examples and sign-offs of the
//! posts before them. Before each follow-up the prior posts are split into
//! sentences and the most reusable ones are listed back to the model as
//! things not to repeat.
//!
//! Sentence splitting is a plain split on `.`; abbreviations, decimals and
//! ellipses get mis-segmented.

/// Words that mark a sentence as carrying an example.
pub const EXAMPLE_TRIGGERS: &[&str] = &["example", "examples", "like", "instance"];

/// Number of sentences taken from each end of a post.
const EDGE_SENTENCES: usize = 2;

/// Split on `.`, trim, drop empty fragments.
pub fn split_sentences(text: &str) -> Vec<&str> {
    text.split('.')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

fn contains_trigger(sentence: &str) -> bool {
    sentence
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .any(|w| {
            let lower = w.to_lowercase();
            EXAMPLE_TRIGGERS.contains(&lower.as_str())
        })
}

fn push_unique(list: &mut Vec<String>, sentence: &str) {
    if !list.iter().any(|s| s == sentence) {
        list.push(sentence.to_string());
    }
}

/// Sentences extracted from prior posts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvoidBlock {
    /// First sentences of each prior post.
    pub openings: Vec<String>,
    /// Sentences containing an example trigger word.
    pub examples: Vec<String>,
    /// Last sentences of each prior post.
    pub conclusions: Vec<String>,
}

impl AvoidBlock {
    /// Extract openings, examples and conclusions from `posts`.
    pub fn from_posts<S: AsRef<str>>(posts: &[S]) -> Self {
        let mut block = Self::default();

        for post in posts {
            let sentences = split_sentences(post.as_ref());
            if sentences.is_empty() {
                continue;
            }

            for sentence in sentences.iter().take(EDGE_SENTENCES) {
                push_unique(&mut block.openings, sentence);
            }

            let tail_start = sentences.len().saturating_sub(EDGE_SENTENCES);
            for sentence in &sentences[tail_start..] {
                push_unique(&mut block.conclusions, sentence);
            }

            for sentence in sentences.iter().filter(|s| contains_trigger(s)) {
                push_unique(&mut block.examples, sentence);
            }
        }

        block
    }

    pub fn is_empty(&self) -> bool {
        self.openings.is_empty() && self.examples.is_empty() && self.conclusions.is_empty()
    }

    /// Render the block for inclusion in a prompt. Empty when nothing was extracted.
    pub fn render(&self) -> String {
        if self.is_empty() {
            return String::new();
        }

        let mut out = String::from(
            "AVOID REPETITION\n\
             Earlier posts in this series already used the lines below. \
             Do not reuse these openings, examples or conclusions, and do not paraphrase them closely.\n",
        );

        let sections = [
            ("Previous openings:", &self.openings),
            ("Previous examples:", &self.examples),
            ("Previous conclusions:", &self.conclusions),
        ];
        for (heading, sentences) in sections {
            if sentences.is_empty() {
                continue;
            }
            out.push('\n');
            out.push_str(heading);
            out.push('\n');
            for sentence in sentences {
                out.push_str("- ");
                out.push_str(sentence);
                out.push('\n');
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sentences_drops_empty() {
        assert_eq!(
            split_sentences("One. Two.  . Three"),
            vec!["One", "Two", "Three"]
        );
        assert!(split_sentences("...").is_empty());
    }

    #[test]
    fn test_split_sentences_known_limitation() {
        // Decimals are split; documented heuristic.
        assert_eq!(split_sentences("Saved 2.5 hours"), vec!["Saved 2", "5 hours"]);
    }

    #[test]
    fn test_extracts_edges_and_examples() {
        let posts = [
            "I built a bot. It reads my notes. For example it drafts posts. It saves me time. Try it.",
            "Deploys kept failing. Logs looked like noise. I added retries. Now it works.",
        ];
        let block = AvoidBlock::from_posts(&posts);

        assert_eq!(
            block.openings,
            vec!["I built a bot", "It reads my notes", "Deploys kept failing", "Logs looked like noise"]
        );
        assert_eq!(
            block.conclusions,
            vec!["It saves me time", "Try it", "I added retries", "Now it works"]
        );
        assert_eq!(
            block.examples,
            vec!["For example it drafts posts", "Logs looked like noise"]
        );
    }

    #[test]
    fn test_trigger_words_match_whole_words_only() {
        let block = AvoidBlock::from_posts(&["It will likely ship. Nothing else."]);
        assert!(block.examples.is_empty());
    }

    #[test]
    fn test_render_contains_sentences_verbatim() {
        let posts = [
            "Automation starts small. Then it grows. The end is near.",
            "Tests caught the bug. I shipped anyway. Never again.",
        ];
        let rendered = AvoidBlock::from_posts(&posts).render();

        for sentence in [
            "Automation starts small",
            "Then it grows",
            "The end is near",
            "Tests caught the bug",
            "I shipped anyway",
            "Never again",
        ] {
            assert!(rendered.contains(sentence), "missing {:?}", sentence);
        }
        assert!(rendered.contains("Previous openings:"));
        assert!(rendered.contains("Previous conclusions:"));
        assert!(!rendered.contains("Previous examples:"));
    }

    #[test]
    fn test_empty_posts_render_nothing() {
        let empty: [&str; 0] = [];
        assert_eq!(AvoidBlock::from_posts(&empty).render(), "");
        assert_eq!(AvoidBlock::from_posts(&["", "  "]).render(), "");
    }
}
