//! Per-user conversation state.

use std::time::Duration;

use chrono::{DateTime, Utc};
use postcraft_core::PromptRequest;
use postcraft_models::{AudienceType, GeneratedPost, PostId, RelationshipType, Series, Tone};

use crate::flow::{FlowEvent, FlowState, InvalidTransition};

/// A markdown document supplied by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// File name, or `pasted-text` for pasted messages.
    pub name: String,
    pub content: String,
}

impl SourceDocument {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// A generated post awaiting review, with everything needed to redo it.
#[derive(Debug, Clone)]
pub struct Draft {
    pub post: GeneratedPost,
    /// The request that produced the post; reused for regeneration.
    pub request: PromptRequest,
    pub source_name: String,
    /// Parent post and relationship, for follow-ups.
    pub parent: Option<(PostId, RelationshipType)>,
}

impl Draft {
    pub fn audience(&self) -> AudienceType {
        self.request.audience
    }
}

/// One entry of a batch run.
#[derive(Debug, Clone)]
pub struct BatchDraft {
    pub draft: Draft,
    pub saved: bool,
}

/// A user's session with the bot.
///
/// Lives only in memory; gone on restart or after the session timeout.
#[derive(Debug, Clone)]
pub struct UserSession {
    /// Telegram user id (session key).
    pub user_id: i64,
    /// Chat to talk back to.
    pub chat_id: i64,
    pub state: FlowState,
    /// Current source document.
    pub source: Option<SourceDocument>,
    /// Project name given to `/project`.
    pub project: Option<String>,
    /// Files collected in project mode.
    pub files: Vec<SourceDocument>,
    pub audience: Option<AudienceType>,
    /// Tones suggested for the current source.
    pub recommended: Vec<Tone>,
    /// Free-form instruction for the next generation.
    pub context: Option<String>,
    /// Approved posts from the current source.
    pub series: Option<Series>,
    pub draft: Option<Draft>,
    /// Relationship picked for the pending follow-up.
    pub pending_relationship: Option<RelationshipType>,
    pub batch: Vec<BatchDraft>,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl UserSession {
    pub fn new(user_id: i64, chat_id: i64, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            chat_id,
            state: FlowState::Idle,
            source: None,
            project: None,
            files: Vec::new(),
            audience: None,
            recommended: Vec::new(),
            context: None,
            series: None,
            draft: None,
            pending_relationship: None,
            batch: Vec::new(),
            created_at: now,
            last_activity: now,
        }
    }

    /// Record activity at `now`.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_activity = now;
    }

    /// Idle time at `now`. Zero when `now` precedes the last activity.
    pub fn idle_for(&self, now: DateTime<Utc>) -> Duration {
        (now - self.last_activity).to_std().unwrap_or_default()
    }

    /// True when more than `timeout` has passed since the last activity.
    pub fn is_expired(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        self.idle_for(now) > timeout
    }

    /// Time left before expiry.
    pub fn time_remaining(&self, now: DateTime<Utc>, timeout: Duration) -> Duration {
        timeout.saturating_sub(self.idle_for(now))
    }

    /// Session age at `now`.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        (now - self.created_at).to_std().unwrap_or_default()
    }

    /// Feed `event` through the state machine, updating the state on success.
    pub fn apply(&mut self, event: FlowEvent) -> Result<FlowState, InvalidTransition> {
        let next = self.state.on(event)?;
        self.state = next;
        Ok(next)
    }

    /// Start over with a new source document and a fresh series.
    pub fn start_source(&mut self, source: SourceDocument, recommended: Vec<Tone>) {
        self.series = Some(Series::new(source.name.clone()));
        self.source = Some(source);
        self.recommended = recommended;
        self.audience = None;
        self.context = None;
        self.draft = None;
        self.pending_relationship = None;
    }

    /// Drop in-progress work. Source and series are kept for `/continue`.
    pub fn clear_pending(&mut self) {
        self.context = None;
        self.draft = None;
        self.pending_relationship = None;
        self.project = None;
        self.files.clear();
        self.batch.clear();
    }

    /// Collected project files merged into one document.
    pub fn combined_files(&self) -> Option<SourceDocument> {
        if self.files.is_empty() {
            return None;
        }
        let name = self
            .project
            .clone()
            .unwrap_or_else(|| format!("{} files", self.files.len()));
        let content = self
            .files
            .iter()
            .map(|f| format!("# {}\n\n{}", f.name, f.content.trim()))
            .collect::<Vec<_>>()
            .join("\n\n");
        Some(SourceDocument::new(name, content))
    }
}
