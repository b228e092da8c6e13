//! Shared state for the Telegram bot.
//!
//! [`BotState`] owns the session store, the post generator and the post
//! store. The methods here drive a [`UserSession`] through generation,
//! review and approval; handlers only translate between Telegram and these
//! calls.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use postcraft_core::{recommend_tones, CoreError, PostGenerator, PromptRequest};
use postcraft_models::{AudienceType, Post, PostId, RelationshipType, Series, Tone};
use postcraft_persistence::PostStore;
use tracing::{debug, info, warn};

use crate::error::{BotError, Result};
use crate::flow::{FlowEvent, FlowState};
use crate::session::{BatchDraft, Draft, SourceDocument, UserSession};
use crate::session_store::SessionStore;

/// Audience used when none was picked (batch runs).
pub const DEFAULT_AUDIENCE: AudienceType = AudienceType::Business;

/// Shared state for the Telegram bot.
pub struct BotState {
    sessions: Arc<dyn SessionStore>,
    generator: PostGenerator,
    store: Arc<dyn PostStore>,
    session_timeout: Duration,
}

impl BotState {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        generator: PostGenerator,
        store: Arc<dyn PostStore>,
        session_timeout: Duration,
    ) -> Self {
        Self {
            sessions,
            generator,
            store,
            session_timeout,
        }
    }

    pub fn generator(&self) -> &PostGenerator {
        &self.generator
    }

    pub fn store(&self) -> &Arc<dyn PostStore> {
        &self.store
    }

    pub fn session_timeout(&self) -> Duration {
        self.session_timeout
    }

    /// Number of live sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.len().await
    }

    /// The user's session, created if missing, with activity recorded now.
    pub async fn session(&self, user_id: i64, chat_id: i64) -> UserSession {
        let now = Utc::now();
        let mut session = match self.sessions.get(user_id).await {
            Some(session) => session,
            None => {
                debug!(user_id, chat_id, "Creating session");
                UserSession::new(user_id, chat_id, now)
            }
        };
        session.chat_id = chat_id;
        session.touch(now);
        self.sessions.put(session.clone()).await;
        session
    }

    pub async fn save_session(&self, session: UserSession) {
        self.sessions.put(session).await;
    }

    /// Drop a user's session entirely.
    pub async fn end_session(&self, user_id: i64) -> Option<UserSession> {
        self.sessions.expire(user_id).await
    }

    /// Expire sessions idle past the timeout, returning them as they were.
    ///
    /// Idle sessions are removed. Sessions caught mid-flow are reset to idle
    /// and kept for one more timeout period with their source and series, so
    /// `/continue` still works after the notice.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> Vec<UserSession> {
        let expired = self.sessions.expired(now, self.session_timeout).await;
        for session in expired.iter().filter(|s| s.state.is_mid_flow()) {
            let mut reset = session.clone();
            reset.clear_pending();
            if reset.apply(FlowEvent::TimedOut).is_err() {
                continue;
            }
            reset.touch(now);
            // The user may have started over since the sweep began.
            if self.sessions.get(reset.user_id).await.is_none() {
                debug!(user_id = reset.user_id, from = %session.state, "Session reset after timeout");
                self.sessions.put(reset).await;
            }
        }
        expired
    }

    /// Posts of the session's series, oldest first.
    ///
    /// Read from the post store; the session's own copy is used when the
    /// store fails or has none of them yet.
    pub async fn series_posts(&self, session: &UserSession) -> Vec<Post> {
        let Some(series) = session.series.as_ref() else {
            return Vec::new();
        };
        match self.store.series_posts(&series.id).await {
            Ok(posts) if !posts.is_empty() => posts,
            Ok(_) => series.posts.clone(),
            Err(e) => {
                warn!(series_id = %series.id, error = %e, "Could not load series from store");
                series.posts.clone()
            }
        }
    }

    /// Series post contents for the avoid-repetition block; the prompt keeps
    /// only the most recent ones.
    async fn previous_posts(&self, session: &UserSession) -> Vec<String> {
        self.series_posts(session)
            .await
            .into_iter()
            .map(|p| p.content)
            .collect()
    }

    /// Take a new source document, returning the recommended tones.
    pub fn receive_source(&self, session: &mut UserSession, source: SourceDocument) -> Result<Vec<Tone>> {
        session.apply(FlowEvent::SourceUploaded)?;
        let recommended = recommend_tones(&source.content);
        info!(
            user_id = session.user_id,
            source = %source.name,
            chars = source.content.len(),
            recommended = ?recommended,
            "Source received"
        );
        session.start_source(source, recommended.clone());
        Ok(recommended)
    }

    /// Add a file to the project being collected. Returns the file count.
    pub fn collect_file(&self, session: &mut UserSession, file: SourceDocument) -> Result<usize> {
        session.apply(FlowEvent::SourceUploaded)?;
        debug!(user_id = session.user_id, file = %file.name, "File collected");
        session.files.push(file);
        Ok(session.files.len())
    }

    /// Merge the collected files into the session's source.
    pub fn finish_collecting(&self, session: &mut UserSession) -> Result<Vec<Tone>> {
        let combined = session
            .combined_files()
            .ok_or_else(|| BotError::Unavailable("No files collected yet.".into()))?;
        session.apply(FlowEvent::FilesDone)?;
        let recommended = recommend_tones(&combined.content);
        session.start_source(combined, recommended.clone());
        session.files.clear();
        Ok(recommended)
    }

    pub fn choose_audience(&self, session: &mut UserSession, audience: AudienceType) -> Result<()> {
        session.apply(FlowEvent::AudienceChosen)?;
        session.audience = Some(audience);
        Ok(())
    }

    pub fn request_context(&self, session: &mut UserSession) -> Result<()> {
        session.apply(FlowEvent::ContextRequested)?;
        Ok(())
    }

    pub fn provide_context(&self, session: &mut UserSession, context: &str) -> Result<()> {
        session.apply(FlowEvent::ContextProvided)?;
        session.context = Some(context.trim().to_string()).filter(|c| !c.is_empty());
        Ok(())
    }

    /// Generate the first draft for the current source.
    pub async fn generate_draft(&self, session: &mut UserSession, tone: Option<Tone>) -> Result<Draft> {
        let source = session
            .source
            .clone()
            .ok_or_else(|| BotError::Unavailable("Send a markdown file first.".into()))?;
        let request = PromptRequest::new(source.content, session.audience.unwrap_or(DEFAULT_AUDIENCE))
            .with_tone(tone)
            .with_previous_posts(self.previous_posts(session).await)
            .with_instructions(session.context.clone());

        self.run_generation(session, FlowEvent::ToneChosen, request, source.name, None)
            .await
    }

    /// Generate a new draft from the same request.
    pub async fn regenerate(&self, session: &mut UserSession) -> Result<Draft> {
        let draft = current_draft(session)?;
        self.run_generation(session, FlowEvent::Regenerated, draft.request, draft.source_name, draft.parent)
            .await
    }

    pub fn request_edit(&self, session: &mut UserSession) -> Result<()> {
        current_draft(session)?;
        session.apply(FlowEvent::EditRequested)?;
        Ok(())
    }

    /// Rewrite the current draft following the user's instructions.
    pub async fn revise(&self, session: &mut UserSession, instructions: &str) -> Result<Draft> {
        let draft = current_draft(session)?;
        let previous = session.state;
        session.apply(FlowEvent::EditProvided)?;

        let result = self
            .generator
            .revise(&draft.post, instructions, draft.audience())
            .await;
        match result {
            Ok(post) => {
                let revised = Draft { post, ..draft };
                session.draft = Some(revised.clone());
                Ok(revised)
            }
            Err(e) => {
                session.state = previous;
                Err(e.into())
            }
        }
    }

    /// Save the current draft as the next post of the series.
    ///
    /// On a storage failure the draft stays up for another try.
    pub async fn approve(&self, session: &mut UserSession) -> Result<Post> {
        let draft = current_draft(session)?;
        session.state.on(FlowEvent::Approved)?;

        let series = session
            .series
            .get_or_insert_with(|| Series::new(draft.source_name.clone()));
        let mut post = Post::from_generated(&draft.post, draft.audience(), series.id.clone(), series.next_sequence())
            .with_source(draft.source_name.clone());
        if let Some((parent_id, relationship)) = draft.parent.clone() {
            post = post.with_parent(parent_id, relationship);
        }
        post.approve();

        self.store.save_post(&post).await?;
        info!(
            user_id = session.user_id,
            series_id = %post.series_id,
            sequence = post.sequence,
            tone = %post.tone,
            backend = self.store.backend_name(),
            "Post approved"
        );

        series.push(post.clone());
        session.draft = None;
        session.context = None;
        session.pending_relationship = None;
        session.apply(FlowEvent::Approved)?;
        Ok(post)
    }

    pub fn discard(&self, session: &mut UserSession) -> Result<()> {
        session.apply(FlowEvent::Discarded)?;
        session.draft = None;
        session.context = None;
        session.pending_relationship = None;
        Ok(())
    }

    /// Start a follow-up to the last approved post.
    pub fn start_continue<'a>(&self, session: &'a mut UserSession) -> Result<&'a Post> {
        let has_parent = session.series.as_ref().is_some_and(|s| !s.is_empty()) && session.source.is_some();
        if !has_parent {
            return Err(BotError::Unavailable(
                "No approved posts to continue yet. Approve a post first.".into(),
            ));
        }
        session.apply(FlowEvent::ContinueRequested)?;
        session
            .series
            .as_ref()
            .and_then(Series::last)
            .ok_or_else(|| BotError::Unavailable("Series is empty.".into()))
    }

    pub fn choose_relationship(&self, session: &mut UserSession, relationship: RelationshipType) -> Result<()> {
        session.apply(FlowEvent::RelationshipChosen)?;
        session.pending_relationship = Some(relationship);
        Ok(())
    }

    /// Generate the follow-up draft, with optional extra context.
    pub async fn generate_follow_up(&self, session: &mut UserSession, context: Option<String>) -> Result<Draft> {
        let relationship = session
            .pending_relationship
            .ok_or_else(|| BotError::Unavailable("Pick a follow-up type first.".into()))?;
        let source = session
            .source
            .clone()
            .ok_or_else(|| BotError::Unavailable("The source document is gone. Send it again.".into()))?;
        let parent = session
            .series
            .as_ref()
            .and_then(Series::last)
            .cloned()
            .ok_or_else(|| BotError::Unavailable("No approved post to follow up on.".into()))?;

        let request = PromptRequest::new(source.content, parent.audience)
            .with_previous_posts(self.previous_posts(session).await)
            .with_follow_up(relationship, parent.content.clone())
            .with_instructions(context);

        self.run_generation(
            session,
            FlowEvent::FollowupContextProvided,
            request,
            source.name,
            Some((parent.id, relationship)),
        )
        .await
    }

    /// Generate one draft per collected file.
    ///
    /// Returns one entry per file, in file order: the batch index of the
    /// draft or the error that file hit.
    pub async fn generate_batch(&self, session: &mut UserSession) -> Result<Vec<std::result::Result<usize, CoreError>>> {
        if session.files.is_empty() {
            return Err(BotError::Unavailable(
                "No files collected. Start with /project and send some files.".into(),
            ));
        }
        let audience = session.audience.unwrap_or(DEFAULT_AUDIENCE);
        let requests: Vec<PromptRequest> = session
            .files
            .iter()
            .map(|f| PromptRequest::new(f.content.clone(), audience))
            .collect();

        let results = self.generator.generate_batch(&requests).await;

        session.batch.clear();
        let mut outcomes = Vec::with_capacity(results.len());
        for ((file, request), result) in session.files.iter().zip(requests).zip(results) {
            match result {
                Ok(post) => {
                    session.batch.push(BatchDraft {
                        draft: Draft {
                            post,
                            request,
                            source_name: file.name.clone(),
                            parent: None,
                        },
                        saved: false,
                    });
                    outcomes.push(Ok(session.batch.len() - 1));
                }
                Err(e) => {
                    warn!(user_id = session.user_id, file = %file.name, error = %e, "Batch item failed");
                    outcomes.push(Err(e));
                }
            }
        }
        Ok(outcomes)
    }

    /// Save one batch draft as the first post of its own series.
    pub async fn approve_batch(&self, session: &mut UserSession, index: usize) -> Result<Post> {
        let entry = session
            .batch
            .get(index)
            .ok_or_else(|| BotError::Unavailable("That batch draft is no longer available.".into()))?;
        if entry.saved {
            return Err(BotError::Unavailable(format!("Draft #{} is already saved.", index + 1)));
        }

        let series = Series::new(entry.draft.source_name.clone());
        let mut post = Post::from_generated(
            &entry.draft.post,
            entry.draft.audience(),
            series.id.clone(),
            series.next_sequence(),
        )
        .with_source(entry.draft.source_name.clone());
        post.approve();

        self.store.save_post(&post).await?;
        info!(
            user_id = session.user_id,
            series_id = %post.series_id,
            index,
            "Batch post approved"
        );
        if let Some(entry) = session.batch.get_mut(index) {
            entry.saved = true;
        }
        Ok(post)
    }

    /// Reset the conversation, keeping source and series for `/continue`.
    pub fn cancel(&self, session: &mut UserSession) -> FlowState {
        let previous = session.state;
        session.clear_pending();
        session.state = FlowState::Idle;
        previous
    }

    /// Transition, generate, and roll the state back if generation fails.
    async fn run_generation(
        &self,
        session: &mut UserSession,
        event: FlowEvent,
        request: PromptRequest,
        source_name: String,
        parent: Option<(PostId, RelationshipType)>,
    ) -> Result<Draft> {
        let previous = session.state;
        session.apply(event)?;

        let result = self.generator.generate(&request).await;
        match result {
            Ok(post) => {
                let draft = Draft {
                    post,
                    request,
                    source_name,
                    parent,
                };
                session.draft = Some(draft.clone());
                Ok(draft)
            }
            Err(e) => {
                warn!(user_id = session.user_id, error = %e, "Generation failed");
                session.state = previous;
                Err(e.into())
            }
        }
    }
}

fn current_draft(session: &UserSession) -> Result<Draft> {
    session
        .draft
        .clone()
        .ok_or_else(|| BotError::Unavailable("There is no draft to work on.".into()))
}
