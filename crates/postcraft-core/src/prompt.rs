//! Prompt assembly.
//!
//! A prompt is plain text: static brand guidance, a tone directive, the
//! audience rules, optional follow-up guidance, the source markdown, an
//! optional anti-repetition block, optional user instructions and finally
//! the required output format.

use postcraft_models::{AudienceType, GeneratedPost, RelationshipType, Tone};

use crate::repetition::AvoidBlock;

/// At most this many prior posts are used for anti-repetition context.
pub const MAX_PREVIOUS_POSTS: usize = 5;

/// House style shared by every prompt.
pub const HOUSE_RULES: &str = "HOUSE STYLE RULES
- Write in the first person, as the developer who did the work (\"I\", \"my\").
- Never use time references such as \"today\", \"yesterday\", \"this week\", \"recently\" or dates. Posts are published later and must read as timeless.
- Aim for 150 to 250 words.
- Plain text suitable for Facebook: short paragraphs, no markdown headers, at most two emoji, at most three hashtags at the very end.
- Open with a hook sentence, not with a greeting.
- Stay faithful to the source: never invent features, numbers or results that are not in it.";

/// Business audience rules.
pub const BUSINESS_AUDIENCE_INSTRUCTIONS: &str = "AUDIENCE: BUSINESS
Write for business owners and non-technical readers.
- Replace jargon with plain words (\"API\" becomes \"a connection between two apps\").
- Focus on outcomes: time saved, money saved, fewer mistakes, happier customers.
- Leave out code, library names and implementation details unless they are the point.";

/// Technical audience rules.
pub const TECHNICAL_AUDIENCE_INSTRUCTIONS: &str = "AUDIENCE: TECHNICAL
Write for developers and technical peers.
- Keep the technical terms, tool names and libraries from the source.
- Include the interesting implementation detail: the approach, the trade-off, the gotcha.
- Do not explain basics that any working developer already knows.";

/// Required response layout, parsed by [`crate::parser::parse_response`].
pub const OUTPUT_FORMAT: &str = "OUTPUT FORMAT
Respond with exactly these three sections and nothing else:
TONE: <the tone name you used, exactly as listed above>
POST: <the full post text>
REASON: <one or two sentences on why this tone fits the material>";

/// Audience rules for `audience`.
pub fn audience_instructions(audience: AudienceType) -> &'static str {
    match audience {
        AudienceType::Business => BUSINESS_AUDIENCE_INSTRUCTIONS,
        AudienceType::Technical => TECHNICAL_AUDIENCE_INSTRUCTIONS,
    }
}

/// The five tones described for the model.
pub fn tone_guide() -> String {
    let mut out = String::from(
        "You turn a developer's journal entries into engaging Facebook posts for their brand.\n\n\
         BRAND TONES\n",
    );
    for (i, tone) in Tone::ALL.iter().enumerate() {
        out.push_str(&format!("{}. {}: {}\n", i + 1, tone.label(), tone.description()));
    }
    out
}

fn tone_directive(tone: Option<Tone>) -> String {
    match tone {
        Some(tone) => format!(
            "TONE SELECTION\nUse the \"{}\" tone for this post.",
            tone.label()
        ),
        None => "TONE SELECTION\nChoose the single tone from the list above that best fits the \
                 source material."
            .to_string(),
    }
}

/// The post a follow-up continues and how it should relate to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowUp {
    pub relationship: RelationshipType,
    pub parent_content: String,
}

/// Everything needed to assemble one generation prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRequest {
    /// Source markdown. Not validated; empty still produces a prompt.
    pub markdown: String,
    pub audience: AudienceType,
    /// `None` lets the model choose.
    pub tone: Option<Tone>,
    /// Prior posts in the series, oldest first, capped at [`MAX_PREVIOUS_POSTS`].
    pub previous_posts: Vec<String>,
    /// Free-form user instruction, appended verbatim.
    pub instructions: Option<String>,
    pub follow_up: Option<FollowUp>,
}

impl PromptRequest {
    pub fn new(markdown: impl Into<String>, audience: AudienceType) -> Self {
        Self {
            markdown: markdown.into(),
            audience,
            tone: None,
            previous_posts: Vec::new(),
            instructions: None,
            follow_up: None,
        }
    }

    pub fn with_tone(mut self, tone: Option<Tone>) -> Self {
        self.tone = tone;
        self
    }

    /// Keeps only the most recent [`MAX_PREVIOUS_POSTS`] posts.
    pub fn with_previous_posts(mut self, posts: Vec<String>) -> Self {
        let skip = posts.len().saturating_sub(MAX_PREVIOUS_POSTS);
        self.previous_posts = posts.into_iter().skip(skip).collect();
        self
    }

    /// Blank instructions are ignored.
    pub fn with_instructions(mut self, instructions: Option<String>) -> Self {
        self.instructions = instructions.filter(|i| !i.trim().is_empty());
        self
    }

    pub fn with_follow_up(mut self, relationship: RelationshipType, parent_content: impl Into<String>) -> Self {
        self.follow_up = Some(FollowUp {
            relationship,
            parent_content: parent_content.into(),
        });
        self
    }

    /// Assemble the prompt text.
    pub fn build(&self) -> String {
        let mut sections = vec![
            tone_guide(),
            HOUSE_RULES.to_string(),
            tone_directive(self.tone),
            audience_instructions(self.audience).to_string(),
        ];

        if let Some(follow_up) = &self.follow_up {
            sections.push(format!(
                "FOLLOW-UP POST\nThis post follows an earlier post in the same series.\n\
                 Relationship: {}. {}\n\nEarlier post:\n\"\"\"\n{}\n\"\"\"",
                follow_up.relationship.label(),
                follow_up.relationship.guidance(),
                follow_up.parent_content.trim()
            ));
        }

        sections.push(format!(
            "SOURCE MATERIAL (developer journal, markdown)\n<<<\n{}\n>>>",
            self.markdown
        ));

        let avoid = AvoidBlock::from_posts(&self.previous_posts).render();
        if !avoid.is_empty() {
            sections.push(avoid.trim_end().to_string());
        }

        if let Some(instructions) = &self.instructions {
            sections.push(format!("ADDITIONAL INSTRUCTIONS FROM THE AUTHOR\n{}", instructions));
        }

        sections.push(OUTPUT_FORMAT.to_string());
        sections.join("\n\n")
    }
}

/// Prompt asking the model to revise an existing draft.
///
/// The draft's tone is kept; the user's instructions are passed verbatim.
pub fn build_revision_prompt(
    draft: &GeneratedPost,
    instructions: &str,
    audience: AudienceType,
) -> String {
    [
        tone_guide(),
        HOUSE_RULES.to_string(),
        format!(
            "TONE SELECTION\nKeep the \"{}\" tone unless the instructions ask for another one.",
            draft.tone.label()
        ),
        audience_instructions(audience).to_string(),
        format!("CURRENT DRAFT\n<<<\n{}\n>>>", draft.post_content),
        format!(
            "REVISION INSTRUCTIONS\nRewrite the draft following these instructions:\n{}",
            instructions.trim()
        ),
        OUTPUT_FORMAT.to_string(),
    ]
    .join("\n\n")
}
