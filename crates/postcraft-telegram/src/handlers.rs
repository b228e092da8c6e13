//! Command, message and button handlers for the Telegram bot.

use std::sync::Arc;
use std::time::Duration;

use postcraft_core::{escape_markdown, ContentStrategy, PostStats};
use postcraft_models::{Post, Tone};
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{ChatAction, Document, InlineKeyboardMarkup, ParseMode};
use teloxide::utils::command::BotCommands;
use tracing::{debug, info, warn};

use crate::callbacks::CallbackAction;
use crate::error::BotError;
use crate::flow::{FlowEvent, FlowState};
use crate::keyboards::{
    after_context_keyboard, audience_keyboard, batch_approve_keyboard, relationship_keyboard,
    review_keyboard, skip_context_keyboard, tone_keyboard,
};
use crate::session::{Draft, SourceDocument, UserSession};
use crate::state::BotState;

/// Longest draft text shown for review, in characters.
pub const REVIEW_TEXT_LIMIT: usize = 3000;

/// Pasted text at least this long is treated as a source document.
pub const MIN_PASTED_CHARS: usize = 100;

/// Largest document accepted for download.
pub const MAX_DOCUMENT_BYTES: u32 = 1_000_000;

/// File extensions accepted as source documents.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["md", "markdown", "txt"];

/// Posts read from the store for `/stats`.
const STATS_SAMPLE: usize = 500;

/// Bot commands that can be invoked with /.
#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "Start the bot and get help")]
    Start,

    #[command(description = "Show help message")]
    Help,

    #[command(description = "Generate one draft per collected project file")]
    Batch,

    #[command(description = "Write a follow-up to the last approved post")]
    Continue,

    #[command(description = "Show the posts of the current series")]
    Series,

    #[command(description = "Show statistics for stored posts")]
    Stats,

    #[command(description = "Show session status and time remaining")]
    Sessions,

    #[command(description = "Show a content strategy for the current source")]
    Strategy,

    #[command(description = "Start collecting files for a project: /project [name]")]
    Project(String),

    #[command(description = "List collected project files")]
    Files,

    #[command(description = "Finish collecting files and write one post from all of them")]
    Done,

    #[command(description = "Cancel the current step")]
    Cancel,
}

/// Telegram user id of a message's sender; falls back to the chat id.
fn sender_id(msg: &Message) -> i64 {
    msg.from
        .as_ref()
        .map(|u| u.id.0 as i64)
        .unwrap_or(msg.chat.id.0)
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Cut `text` to at most `limit` characters, marking the cut.
pub fn truncate_for_review(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(limit.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

/// Whether a document name has one of [`ACCEPTED_EXTENSIONS`].
pub fn is_accepted_file_name(name: &str) -> bool {
    name.rsplit_once('.')
        .map(|(_, ext)| ACCEPTED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Minutes and seconds, e.g. `12m 05s`.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{}m {:02}s", secs / 60, secs % 60)
}

/// Draft rendered as MarkdownV2.
pub fn draft_markdown(draft: &Draft) -> String {
    let post = &draft.post;
    let mut text = format!(
        "{} *{}*\n\n{}",
        post.tone.emoji(),
        escape_markdown(post.tone.label()),
        escape_markdown(&truncate_for_review(&post.post_content, REVIEW_TEXT_LIMIT)),
    );
    if !post.reason.trim().is_empty() {
        text.push_str(&format!("\n\n_{}_", escape_markdown(post.reason.trim())));
    }
    text
}

/// Draft rendered as plain text.
pub fn draft_plain(draft: &Draft) -> String {
    let post = &draft.post;
    let mut text = format!(
        "{} {}\n\n{}",
        post.tone.emoji(),
        post.tone.label(),
        truncate_for_review(&post.post_content, REVIEW_TEXT_LIMIT),
    );
    if !post.reason.trim().is_empty() {
        text.push_str(&format!("\n\nWhy: {}", post.reason.trim()));
    }
    text
}

/// Send a draft as MarkdownV2, retrying as plain text if Telegram rejects the markup.
async fn send_draft(
    bot: &Bot,
    chat_id: ChatId,
    draft: &Draft,
    keyboard: InlineKeyboardMarkup,
) -> ResponseResult<()> {
    let sent = bot
        .send_message(chat_id, draft_markdown(draft))
        .parse_mode(ParseMode::MarkdownV2)
        .reply_markup(keyboard.clone())
        .await;

    if let Err(e) = sent {
        warn!(chat_id = %chat_id, error = %e, "MarkdownV2 rejected, sending plain text");
        bot.send_message(chat_id, draft_plain(draft))
            .reply_markup(keyboard)
            .await?;
    }
    Ok(())
}

/// Tell the user why an action failed.
async fn report(bot: &Bot, chat_id: ChatId, err: &BotError) -> ResponseResult<()> {
    let text = match err {
        BotError::Flow(e) => format!("⚠️ Not now: {}.", e.state.hint()),
        BotError::Unavailable(message) => format!("⚠️ {}", message),
        other => format!("❌ {}", other),
    };
    warn!(chat_id = %chat_id, error = %err, "Action failed");
    bot.send_message(chat_id, text).await?;
    Ok(())
}

async fn typing(bot: &Bot, chat_id: ChatId) {
    let _ = bot.send_chat_action(chat_id, ChatAction::Typing).await;
}

/// Ask for an audience after a new source arrived.
async fn prompt_audience(bot: &Bot, chat_id: ChatId, session: &UserSession) -> ResponseResult<()> {
    let name = session.source.as_ref().map(|s| s.name.as_str()).unwrap_or("source");
    let recommended = session
        .recommended
        .iter()
        .map(|t| format!("{} {}", t.emoji(), t.label()))
        .collect::<Vec<_>>()
        .join(", ");
    bot.send_message(
        chat_id,
        format!(
            "📄 Got {}.\nSuggested tones: {}\n\n👥 Who is this post for?",
            name, recommended
        ),
    )
    .reply_markup(audience_keyboard())
    .await?;
    Ok(())
}

/// Handle the /start command.
pub async fn handle_start(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let welcome = format!(
        "Welcome to Postcraft! ✍️\n\n\
        I turn your dev-journal markdown into Facebook posts.\n\n\
        <b>Getting Started:</b>\n\
        1. Send a .md file (or paste a long note)\n\
        2. Pick the audience and a tone\n\
        3. Approve, regenerate, edit or discard the draft\n\
        4. Use /continue to write a follow-up\n\n\
        <b>Projects:</b> /project, send files, then /done or /batch\n\n\
        <b>Model:</b> {} ({})\n\
        <b>Storage:</b> {}\n\n\
        Type /help for all commands.",
        html_escape(state.generator().model()),
        state.generator().provider(),
        state.store().backend_name(),
    );

    bot.send_message(msg.chat.id, welcome)
        .parse_mode(ParseMode::Html)
        .await?;

    info!(chat_id = %msg.chat.id, user = ?msg.from.as_ref().map(|u| &u.username), "User started bot");
    Ok(())
}

/// Handle the /help command.
pub async fn handle_help(bot: Bot, msg: Message) -> ResponseResult<()> {
    let help_text = Command::descriptions().to_string();
    bot.send_message(msg.chat.id, help_text).await?;
    Ok(())
}

/// Handle the /project command - start collecting files.
pub async fn handle_project(
    bot: Bot,
    msg: Message,
    state: Arc<BotState>,
    name: String,
) -> ResponseResult<()> {
    let mut session = state.session(sender_id(&msg), msg.chat.id.0).await;
    let result = session
        .apply(FlowEvent::ProjectStarted)
        .map_err(BotError::from);
    let name = name.trim();
    if result.is_ok() {
        session.project = Some(name.to_string()).filter(|n| !n.is_empty());
        session.files.clear();
        session.batch.clear();
    }
    state.save_session(session).await;

    match result {
        Ok(_) => {
            let title = if name.is_empty() { "your project".to_string() } else { name.to_string() };
            bot.send_message(
                msg.chat.id,
                format!(
                    "📁 Collecting files for {}.\n\nSend markdown files, then /done for one post \
                     from all of them or /batch for one post per file.",
                    title
                ),
            )
            .await?;
        }
        Err(e) => report(&bot, msg.chat.id, &e).await?,
    }
    Ok(())
}

/// Handle the /files command.
pub async fn handle_files(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let session = state.session(sender_id(&msg), msg.chat.id.0).await;
    let text = if session.files.is_empty() {
        "No files collected. Use /project to start.".to_string()
    } else {
        let list = session
            .files
            .iter()
            .enumerate()
            .map(|(i, f)| format!("{}. {} ({} chars)", i + 1, f.name, f.content.chars().count()))
            .collect::<Vec<_>>()
            .join("\n");
        format!("📁 {} file(s):\n\n{}", session.files.len(), list)
    };
    state.save_session(session).await;
    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}

/// Handle the /done command - merge collected files into one source.
pub async fn handle_done(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let mut session = state.session(sender_id(&msg), msg.chat.id.0).await;
    let result = state.finish_collecting(&mut session);
    let reply = match &result {
        Ok(_) => prompt_audience(&bot, msg.chat.id, &session).await,
        Err(e) => report(&bot, msg.chat.id, e).await,
    };
    state.save_session(session).await;
    reply
}

/// Handle the /batch command - one draft per collected file.
pub async fn handle_batch(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let chat_id = msg.chat.id;
    let mut session = state.session(sender_id(&msg), chat_id.0).await;
    if session.state != FlowState::CollectingFiles {
        let err = BotError::Unavailable("Start a project with /project and send files first.".into());
        state.save_session(session).await;
        return report(&bot, chat_id, &err).await;
    }

    bot.send_message(
        chat_id,
        format!("⏳ Generating {} drafts...", session.files.len()),
    )
    .await?;
    typing(&bot, chat_id).await;

    let result = state.generate_batch(&mut session).await;
    let files: Vec<String> = session.files.iter().map(|f| f.name.clone()).collect();
    let drafts: Vec<Draft> = session.batch.iter().map(|b| b.draft.clone()).collect();
    state.save_session(session).await;

    match result {
        Ok(outcomes) => {
            for (name, outcome) in files.iter().zip(outcomes) {
                match outcome {
                    Ok(index) => {
                        if let Some(draft) = drafts.get(index) {
                            bot.send_message(chat_id, format!("📄 {}", name)).await?;
                            send_draft(&bot, chat_id, draft, batch_approve_keyboard(index)).await?;
                        }
                    }
                    Err(e) => {
                        bot.send_message(chat_id, format!("❌ {}: {}", name, e)).await?;
                    }
                }
            }
        }
        Err(e) => report(&bot, chat_id, &e).await?,
    }
    Ok(())
}

/// Handle the /continue command - offer follow-up types.
pub async fn handle_continue(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let mut session = state.session(sender_id(&msg), msg.chat.id.0).await;
    let preview = state
        .start_continue(&mut session)
        .map(|parent| truncate_for_review(&parent.content, 300));
    state.save_session(session).await;

    match preview {
        Ok(preview) => {
            bot.send_message(
                msg.chat.id,
                format!("🔗 Follow-up to:\n\n{}\n\nHow should the next post relate?", preview),
            )
            .reply_markup(relationship_keyboard())
            .await?;
        }
        Err(e) => report(&bot, msg.chat.id, &e).await?,
    }
    Ok(())
}

fn series_line(post: &Post) -> String {
    let first_line = post.content.lines().next().unwrap_or_default();
    format!(
        "{}. {} {} ({}, {})\n   {}",
        post.sequence,
        post.tone.emoji(),
        post.tone.label(),
        post.audience.label(),
        post.relationship.label(),
        truncate_for_review(first_line, 80),
    )
}

/// Handle the /series command.
pub async fn handle_series(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let session = state.session(sender_id(&msg), msg.chat.id.0).await;
    let posts = state.series_posts(&session).await;
    let text = match session.series.as_ref().filter(|_| !posts.is_empty()) {
        None => "📚 No approved posts in this series yet.".to_string(),
        Some(series) => {
            let lines = posts.iter().map(series_line).collect::<Vec<_>>().join("\n");
            format!(
                "📚 Series {} from {} ({} posts)\n\n{}",
                series.id.short(),
                series.source_name,
                posts.len(),
                lines
            )
        }
    };
    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}

/// Handle the /stats command.
pub async fn handle_stats(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    typing(&bot, msg.chat.id).await;
    match state.store().recent_posts(STATS_SAMPLE).await {
        Ok(posts) => {
            let stats = PostStats::from_posts(&posts);
            debug!(total = stats.total, "Computed stats");
            bot.send_message(msg.chat.id, stats.render()).await?;
        }
        Err(e) => report(&bot, msg.chat.id, &BotError::from(e)).await?,
    }
    Ok(())
}

/// Handle the /sessions command.
pub async fn handle_sessions(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let session = state.session(sender_id(&msg), msg.chat.id.0).await;
    let now = chrono::Utc::now();
    let timeout = state.session_timeout();
    let details = format!(
        "Your session:\n\
        - state: {}\n\
        - age: {}\n\
        - expires in: {}\n\
        - series posts: {}",
        session.state,
        format_duration(session.age(now)),
        format_duration(session.time_remaining(now, timeout)),
        session.series.as_ref().map(|s| s.len()).unwrap_or(0),
    );
    state.save_session(session).await;

    let text = format!("🗂 Active sessions: {}\n\n{}", state.session_count().await, details);
    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}

/// Handle the /strategy command.
pub async fn handle_strategy(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let session = state.session(sender_id(&msg), msg.chat.id.0).await;
    let text = match &session.source {
        Some(source) => ContentStrategy::analyze(&source.content, session.series.as_ref()).render(),
        None => "Send a markdown file first, then /strategy.".to_string(),
    };
    state.save_session(session).await;
    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}

/// Handle the /cancel command.
pub async fn handle_cancel(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let mut session = state.session(sender_id(&msg), msg.chat.id.0).await;
    let previous = state.cancel(&mut session);
    state.save_session(session).await;

    let text = if previous.is_mid_flow() {
        format!("🛑 Cancelled ({}). Send a new file whenever you're ready.", previous)
    } else {
        "Nothing to cancel.".to_string()
    };
    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}

/// Route a new source to collection or to a fresh flow.
async fn accept_source(
    bot: &Bot,
    chat_id: ChatId,
    state: &BotState,
    session: &mut UserSession,
    source: SourceDocument,
) -> ResponseResult<()> {
    if session.state == FlowState::CollectingFiles {
        let name = source.name.clone();
        match state.collect_file(session, source) {
            Ok(count) => {
                bot.send_message(
                    chat_id,
                    format!("📎 Added {} ({} file(s)). Send more, or /done or /batch.", name, count),
                )
                .await?;
            }
            Err(e) => report(bot, chat_id, &e).await?,
        }
        return Ok(());
    }

    match state.receive_source(session, source) {
        Ok(_) => prompt_audience(bot, chat_id, session).await,
        Err(e) => report(bot, chat_id, &e).await,
    }
}

/// Handle regular text messages, routed by conversation state.
pub async fn handle_message(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let chat_id = msg.chat.id;
    let mut session = state.session(sender_id(&msg), chat_id.0).await;

    let reply = match session.state {
        FlowState::AwaitingFreeformContext => match state.provide_context(&mut session, text) {
            Ok(()) => {
                bot.send_message(chat_id, "📝 Context added. Pick a tone or generate now:")
                    .reply_markup(after_context_keyboard(&session.recommended))
                    .await
                    .map(|_| ())
            }
            Err(e) => report(&bot, chat_id, &e).await,
        },
        FlowState::AwaitingEditInstructions => {
            typing(&bot, chat_id).await;
            match state.revise(&mut session, text).await {
                Ok(draft) => send_draft(&bot, chat_id, &draft, review_keyboard()).await,
                Err(e) => report(&bot, chat_id, &e).await,
            }
        }
        FlowState::AwaitingFollowupContext => {
            typing(&bot, chat_id).await;
            match state.generate_follow_up(&mut session, Some(text.to_string())).await {
                Ok(draft) => send_draft(&bot, chat_id, &draft, review_keyboard()).await,
                Err(e) => report(&bot, chat_id, &e).await,
            }
        }
        _ if text.chars().count() >= MIN_PASTED_CHARS => {
            let source = SourceDocument::new("pasted-text", text);
            accept_source(&bot, chat_id, &state, &mut session, source).await
        }
        current => {
            debug!(chat_id = %chat_id, state = %current, "Short text outside a text step");
            bot.send_message(chat_id, format!("🤔 To continue, {}.", current.hint()))
                .await
                .map(|_| ())
        }
    };

    state.save_session(session).await;
    reply
}

async fn download_document(bot: &Bot, doc: &Document) -> Result<SourceDocument, BotError> {
    let name = doc.file_name.clone().unwrap_or_else(|| "document.md".to_string());
    if !is_accepted_file_name(&name) {
        return Err(BotError::Unavailable(format!(
            "{} is not a markdown or text file. Send a .md, .markdown or .txt file.",
            name
        )));
    }
    if doc.file.size > MAX_DOCUMENT_BYTES {
        return Err(BotError::Unavailable(format!(
            "{} is too large ({} bytes, limit {}).",
            name, doc.file.size, MAX_DOCUMENT_BYTES
        )));
    }

    let file = bot.get_file(doc.file.id.clone()).await?;
    let mut bytes = Vec::new();
    bot.download_file(&file.path, &mut bytes)
        .await
        .map_err(|e| BotError::Download(e.to_string()))?;

    let content = String::from_utf8(bytes)
        .map_err(|_| BotError::Download(format!("{} is not valid UTF-8 text", name)))?;
    if content.trim().is_empty() {
        return Err(BotError::Unavailable(format!("{} is empty.", name)));
    }
    debug!(file = %name, bytes = content.len(), "Downloaded document");
    Ok(SourceDocument::new(name, content))
}

/// Handle uploaded documents.
pub async fn handle_document(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let Some(doc) = msg.document() else {
        return Ok(());
    };
    let chat_id = msg.chat.id;

    let source = match download_document(&bot, doc).await {
        Ok(source) => source,
        Err(e) => return report(&bot, chat_id, &e).await,
    };

    let mut session = state.session(sender_id(&msg), chat_id.0).await;
    let reply = accept_source(&bot, chat_id, &state, &mut session, source).await;
    state.save_session(session).await;
    reply
}

/// Handle inline button presses.
pub async fn handle_callback(bot: Bot, q: CallbackQuery, state: Arc<BotState>) -> ResponseResult<()> {
    let _ = bot.answer_callback_query(q.id.clone()).await;

    let user_id = q.from.id.0 as i64;
    let chat_id = q
        .message
        .as_ref()
        .map(|m| m.chat().id)
        .unwrap_or(ChatId(user_id));

    let Some(data) = q.data.as_deref() else {
        return Ok(());
    };
    let action = match data.parse::<CallbackAction>() {
        Ok(action) => action,
        Err(e) => {
            warn!(chat_id = %chat_id, error = %e, "Ignoring callback");
            return Ok(());
        }
    };
    info!(chat_id = %chat_id, user_id, action = %action, "Callback");

    let mut session = state.session(user_id, chat_id.0).await;
    let reply = run_action(&bot, chat_id, &state, &mut session, action).await;
    state.save_session(session).await;
    reply
}

async fn run_action(
    bot: &Bot,
    chat_id: ChatId,
    state: &BotState,
    session: &mut UserSession,
    action: CallbackAction,
) -> ResponseResult<()> {
    match action {
        CallbackAction::Audience(audience) => match state.choose_audience(session, audience) {
            Ok(()) => {
                bot.send_message(
                    chat_id,
                    format!("{} {} audience. Pick a tone (⭐ = suggested):", audience.emoji(), audience.label()),
                )
                .reply_markup(tone_keyboard(&session.recommended))
                .await?;
            }
            Err(e) => report(bot, chat_id, &e).await?,
        },
        CallbackAction::Tone(tone) => {
            generate(bot, chat_id, state, session, tone).await?;
        }
        CallbackAction::Generate => {
            generate(bot, chat_id, state, session, None).await?;
        }
        CallbackAction::AddContext => match state.request_context(session) {
            Ok(()) => {
                bot.send_message(
                    chat_id,
                    "📝 Send the extra context as a message (an angle, a detail to stress, a call to action).",
                )
                .await?;
            }
            Err(e) => report(bot, chat_id, &e).await?,
        },
        CallbackAction::Approve => match state.approve(session).await {
            Ok(post) => {
                bot.send_message(
                    chat_id,
                    format!(
                        "✅ Saved as post #{} of series {}.\nUse /continue for a follow-up or send a new file.",
                        post.sequence,
                        post.series_id.short()
                    ),
                )
                .await?;
            }
            Err(e) => report(bot, chat_id, &e).await?,
        },
        CallbackAction::Regenerate => {
            typing(bot, chat_id).await;
            match state.regenerate(session).await {
                Ok(draft) => send_draft(bot, chat_id, &draft, review_keyboard()).await?,
                Err(e) => report(bot, chat_id, &e).await?,
            }
        }
        CallbackAction::Edit => match state.request_edit(session) {
            Ok(()) => {
                bot.send_message(chat_id, "✏️ What should change? Send your instructions.")
                    .await?;
            }
            Err(e) => report(bot, chat_id, &e).await?,
        },
        CallbackAction::Discard => match state.discard(session) {
            Ok(()) => {
                bot.send_message(chat_id, "🗑 Draft discarded.").await?;
            }
            Err(e) => report(bot, chat_id, &e).await?,
        },
        CallbackAction::Relationship(relationship) => {
            match state.choose_relationship(session, relationship) {
                Ok(()) => {
                    bot.send_message(
                        chat_id,
                        format!(
                            "🔗 {}.\nSend context for the follow-up, or skip.",
                            relationship.label()
                        ),
                    )
                    .reply_markup(skip_context_keyboard())
                    .await?;
                }
                Err(e) => report(bot, chat_id, &e).await?,
            }
        }
        CallbackAction::SkipContext => {
            typing(bot, chat_id).await;
            match state.generate_follow_up(session, None).await {
                Ok(draft) => send_draft(bot, chat_id, &draft, review_keyboard()).await?,
                Err(e) => report(bot, chat_id, &e).await?,
            }
        }
        CallbackAction::BatchApprove(index) => match state.approve_batch(session, index).await {
            Ok(post) => {
                bot.send_message(
                    chat_id,
                    format!(
                        "✅ Draft #{} saved ({}) as series {}.",
                        index + 1,
                        post.source_file.as_deref().unwrap_or("batch"),
                        post.series_id.short()
                    ),
                )
                .await?;
            }
            Err(e) => report(bot, chat_id, &e).await?,
        },
    }
    Ok(())
}

async fn generate(
    bot: &Bot,
    chat_id: ChatId,
    state: &BotState,
    session: &mut UserSession,
    tone: Option<Tone>,
) -> ResponseResult<()> {
    typing(bot, chat_id).await;
    match state.generate_draft(session, tone).await {
        Ok(draft) => send_draft(bot, chat_id, &draft, review_keyboard()).await,
        Err(e) => report(bot, chat_id, &e).await,
    }
}

/// Dispatch commands to appropriate handlers.
pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    state: Arc<BotState>,
) -> ResponseResult<()> {
    match cmd {
        Command::Start => handle_start(bot, msg, state).await,
        Command::Help => handle_help(bot, msg).await,
        Command::Batch => handle_batch(bot, msg, state).await,
        Command::Continue => handle_continue(bot, msg, state).await,
        Command::Series => handle_series(bot, msg, state).await,
        Command::Stats => handle_stats(bot, msg, state).await,
        Command::Sessions => handle_sessions(bot, msg, state).await,
        Command::Strategy => handle_strategy(bot, msg, state).await,
        Command::Project(name) => handle_project(bot, msg, state, name).await,
        Command::Files => handle_files(bot, msg, state).await,
        Command::Done => handle_done(bot, msg, state).await,
        Command::Cancel => handle_cancel(bot, msg, state).await,
    }
}
