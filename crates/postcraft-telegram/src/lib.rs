//! Telegram bot interface for Postcraft.
//!
//! Users send a dev-journal markdown file (or paste a long note), pick an
//! audience and a tone, and review the generated Facebook post. Approved
//! posts are stored as a series that `/continue` extends with follow-ups.
//!
//! # Features
//!
//! - Guided flow driven by an explicit state machine ([`flow`])
//! - Five brand tones with keyword-based recommendations
//! - Regenerate, edit with free-form instructions, or discard drafts
//! - Project mode: collect several files, then one merged post or a batch
//! - Posts stored in Airtable, or in local JSON files when Airtable is not configured
//! - Idle sessions expire after `SESSION_TIMEOUT_MINUTES`
//!
//! # Environment Variables
//!
//! Required:
//! - `TELEGRAM_BOT_TOKEN`: Bot token from @BotFather
//! - `OPENAI_API_KEY` or `ANTHROPIC_API_KEY`, depending on `CONTENT_GENERATION_PROVIDER`
//!
//! Optional:
//! - `AIRTABLE_API_KEY`, `AIRTABLE_BASE_ID`, `AIRTABLE_TABLE_NAME`
//! - `PROCESSING_TIMEOUT`, `SESSION_TIMEOUT_MINUTES`
//! - `POSTCRAFT_STATE_DIR`: local post store location
//!
//! # Example
//!
//! ```no_run
//! use postcraft_core::AppConfig;
//! use postcraft_telegram::PostcraftBot;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::from_env()?;
//!     let bot = PostcraftBot::new(&config)?;
//!     bot.run().await?;
//!     Ok(())
//! }
//! ```

pub mod bot;
pub mod callbacks;
pub mod error;
pub mod flow;
pub mod handlers;
pub mod keyboards;
pub mod session;
pub mod session_store;
pub mod state;

pub use bot::{build_post_store, build_telegram_bot, PostcraftBot};
pub use callbacks::CallbackAction;
pub use error::{BotError, Result};
pub use flow::{FlowEvent, FlowState, InvalidTransition};
pub use session::{SourceDocument, UserSession};
pub use session_store::{InMemorySessionStore, SessionStore};
pub use state::BotState;
