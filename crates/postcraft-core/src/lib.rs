//! Postcraft Core - the text pipeline between a journal entry and a post.
//!
//! This crate holds everything that turns developer-journal markdown into a
//! Facebook post, independent of Telegram and storage:
//!
//! - **config**: environment configuration loading and validation
//! - **prompt**: prompt assembly (tones, house rules, audience, follow-ups)
//! - **repetition**: "avoid repeating" block built from prior posts
//! - **parser**: `TONE:`/`POST:`/`REASON:` response parsing
//! - **markdown**: idempotent MarkdownV2 escaping and unescaping
//! - **recommend**: keyword-based tone recommendation
//! - **strategy**: content strategy summary for a source document
//! - **stats**: aggregate statistics over stored posts
//! - **generator**: prompt → model → parsed post, with timeout and batch fan-out

pub mod config;
pub mod error;
pub mod generator;
pub mod markdown;
pub mod parser;
pub mod prompt;
pub mod recommend;
pub mod repetition;
pub mod stats;
pub mod strategy;

// Re-export commonly used items for convenience
pub use config::{AirtableSettings, AppConfig, ConfigError};
pub use error::{CoreError, Result};
pub use generator::{PostGenerator, BATCH_CONCURRENCY};
pub use markdown::{escape_markdown, unescape_markdown};
pub use parser::{parse_response, DEFAULT_TONE};
pub use prompt::{build_revision_prompt, FollowUp, PromptRequest};
pub use recommend::{recommend_tones, recommend_tones_with_rng, score_tones, ToneScore};
pub use repetition::{split_sentences, AvoidBlock};
pub use stats::PostStats;
pub use strategy::ContentStrategy;
