//! The five fixed brand tones.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ParseLabelError;

/// A stylistic template applied to a generated post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    /// How something was put together.
    #[default]
    BehindTheBuild,
    /// A failure and what it taught.
    WhatBroke,
    /// A shipped result worth celebrating.
    FinishedAndProud,
    /// Problem, the fix, the measurable outcome.
    ProblemSolutionResult,
    /// One practical takeaway.
    MiniLesson,
}

impl Tone {
    /// All tones in display order.
    pub const ALL: [Tone; 5] = [
        Tone::BehindTheBuild,
        Tone::WhatBroke,
        Tone::FinishedAndProud,
        Tone::ProblemSolutionResult,
        Tone::MiniLesson,
    ];

    /// Human-readable label, as used in prompts and stored records.
    pub fn label(&self) -> &'static str {
        match self {
            Self::BehindTheBuild => "Behind-the-Build",
            Self::WhatBroke => "What Broke",
            Self::FinishedAndProud => "Finished & Proud",
            Self::ProblemSolutionResult => "Problem→Solution→Result",
            Self::MiniLesson => "Mini Lesson",
        }
    }

    /// Short machine code, used in callback data.
    pub fn code(&self) -> &'static str {
        match self {
            Self::BehindTheBuild => "behind_the_build",
            Self::WhatBroke => "what_broke",
            Self::FinishedAndProud => "finished_and_proud",
            Self::ProblemSolutionResult => "problem_solution_result",
            Self::MiniLesson => "mini_lesson",
        }
    }

    /// Emoji shown on tone buttons.
    pub fn emoji(&self) -> &'static str {
        match self {
            Self::BehindTheBuild => "🔧",
            Self::WhatBroke => "💥",
            Self::FinishedAndProud => "🎉",
            Self::ProblemSolutionResult => "🧩",
            Self::MiniLesson => "💡",
        }
    }

    /// Style guidance for the model.
    pub fn description(&self) -> &'static str {
        match self {
            Self::BehindTheBuild => {
                "Walk the reader through how something was built: the decisions, \
                 the tools, the small surprises along the way. Curious and hands-on."
            }
            Self::WhatBroke => {
                "Be honest about something that failed, what the failure looked like, \
                 and how it was tracked down. Self-aware, a little humorous, never defeatist."
            }
            Self::FinishedAndProud => {
                "Celebrate something that shipped. Show what it does and why it matters \
                 without bragging. Warm and confident."
            }
            Self::ProblemSolutionResult => {
                "State the problem plainly, explain the solution, finish with the concrete \
                 result (time saved, errors avoided, numbers when available). Crisp and structured."
            }
            Self::MiniLesson => {
                "Teach one practical lesson drawn from the work. Lead with the insight, \
                 support it with the story, close with advice the reader can use."
            }
        }
    }

    /// Looks a tone up by its machine code.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }

    /// Fuzzy label match tolerant of case, punctuation, arrows and extra words.
    ///
    /// `"problem -> solution -> result"`, `"**Mini Lesson**"` and
    /// `"what_broke"` all resolve.
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized: String = label
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect();
        if normalized.is_empty() {
            return None;
        }

        const KEYS: [(&str, Tone); 6] = [
            ("behindthebuild", Tone::BehindTheBuild),
            ("whatbroke", Tone::WhatBroke),
            ("finishedandproud", Tone::FinishedAndProud),
            ("finishedproud", Tone::FinishedAndProud),
            ("problemsolutionresult", Tone::ProblemSolutionResult),
            ("minilesson", Tone::MiniLesson),
        ];

        KEYS.iter()
            .find(|(key, _)| normalized.contains(key))
            .map(|(_, tone)| *tone)
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Tone {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s.trim())
            .or_else(|| Self::from_label(s))
            .ok_or_else(|| ParseLabelError::new("tone", s))
    }
}
