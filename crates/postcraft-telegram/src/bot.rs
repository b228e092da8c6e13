//! Main Telegram bot implementation.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use postcraft_core::{AppConfig, PostGenerator};
use postcraft_llm::build_client;
use postcraft_persistence::{AirtableStore, JsonPostStore, PostStore};
use teloxide::dispatching::UpdateFilterExt;
use teloxide::prelude::*;
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::error::{BotError, Result};
use crate::handlers::{handle_callback, handle_command, handle_document, handle_message, Command};
use crate::session_store::InMemorySessionStore;
use crate::state::BotState;

/// How often expired sessions are swept.
const SWEEP_INTERVAL_SECS: u64 = 60;

/// Build the Telegram client with explicit timeout and pool settings.
pub fn build_telegram_bot(config: &AppConfig) -> Result<Bot> {
    let client = teloxide::net::default_reqwest_settings()
        .timeout(config.telegram_http_timeout)
        .pool_max_idle_per_host(config.telegram_pool_size)
        .build()
        .map_err(|e| BotError::Startup(format!("HTTP client: {}", e)))?;
    Ok(Bot::with_client(config.telegram_token.clone(), client))
}

/// Airtable when configured, otherwise JSON files under the state directory.
pub fn build_post_store(config: &AppConfig) -> Result<Arc<dyn PostStore>> {
    let store: Arc<dyn PostStore> = match &config.airtable {
        Some(airtable) => Arc::new(AirtableStore::new(
            airtable.api_key.clone(),
            airtable.base_id.clone(),
            airtable.table_name.clone(),
        )),
        None => {
            info!(dir = %config.state_dir.display(), "Airtable not configured, storing posts locally");
            Arc::new(JsonPostStore::new(config.state_dir.clone())?)
        }
    };
    Ok(store)
}

/// The Postcraft Telegram bot.
pub struct PostcraftBot {
    /// The teloxide bot instance.
    bot: Bot,
    /// Shared state across handlers.
    state: Arc<BotState>,
}

impl PostcraftBot {
    /// Build the bot, model client and post store from configuration.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let bot = build_telegram_bot(config)?;
        let llm = build_client(&config.model, &config.llm_api_key)?;
        let generator = PostGenerator::new(llm, config.processing_timeout);
        let store = build_post_store(config)?;

        info!(
            provider = %generator.provider(),
            model = generator.model(),
            store = store.backend_name(),
            "Bot configured"
        );

        let state = Arc::new(BotState::new(
            Arc::new(InMemorySessionStore::new()),
            generator,
            store,
            config.session_timeout,
        ));
        Ok(Self { bot, state })
    }

    /// Create a bot around existing state (for testing).
    pub fn with_state(bot: Bot, state: Arc<BotState>) -> Self {
        Self { bot, state }
    }

    pub fn state(&self) -> &Arc<BotState> {
        &self.state
    }

    /// Get the bot's username.
    pub async fn get_me(&self) -> Result<String> {
        let me = self
            .bot
            .get_me()
            .await
            .map_err(|e| BotError::Startup(e.to_string()))?;
        Ok(me.username().to_string())
    }

    /// Run in long-polling mode until Ctrl+C.
    pub async fn run(&self) -> Result<()> {
        info!("Starting Telegram bot in polling mode...");

        let bot = self.bot.clone();
        let state = Arc::clone(&self.state);

        let sweep_state = Arc::clone(&self.state);
        let sweep_bot = bot.clone();
        tokio::spawn(async move {
            sweep_sessions_loop(sweep_bot, sweep_state).await;
        });

        let state_for_commands = Arc::clone(&state);
        let state_for_documents = Arc::clone(&state);
        let state_for_messages = Arc::clone(&state);
        let state_for_callbacks = Arc::clone(&state);

        let handler = dptree::entry()
            .branch(
                Update::filter_callback_query()
                    .endpoint(move |bot: Bot, q: CallbackQuery| {
                        let state = Arc::clone(&state_for_callbacks);
                        async move { handle_callback(bot, q, state).await }
                    }),
            )
            .branch(
                Update::filter_message()
                    .filter_command::<Command>()
                    .endpoint(move |bot: Bot, msg: Message, cmd: Command| {
                        let state = Arc::clone(&state_for_commands);
                        info!(chat_id = %msg.chat.id, "Command matched: {:?}", cmd);
                        async move { handle_command(bot, msg, cmd, state).await }
                    }),
            )
            .branch(
                Update::filter_message()
                    .filter(|msg: Message| msg.document().is_some())
                    .endpoint(move |bot: Bot, msg: Message| {
                        let state = Arc::clone(&state_for_documents);
                        info!(
                            chat_id = %msg.chat.id,
                            file = ?msg.document().and_then(|d| d.file_name.clone()),
                            "Document received"
                        );
                        async move { handle_document(bot, msg, state).await }
                    }),
            )
            .branch(
                Update::filter_message()
                    .filter(|msg: Message| {
                        // Commands that did not parse
                        msg.text().map(|t| t.starts_with('/')).unwrap_or(false)
                    })
                    .endpoint(move |bot: Bot, msg: Message| async move {
                        if let Some(text) = msg.text() {
                            info!(cmd = %text, "Unrecognized command");
                            bot.send_message(
                                msg.chat.id,
                                format!(
                                    "Unknown command: {}\n\nUse /help to see available commands.",
                                    text.split_whitespace().next().unwrap_or(text)
                                ),
                            )
                            .await?;
                        }
                        Ok(())
                    }),
            )
            .branch(
                Update::filter_message()
                    .filter(|msg: Message| msg.text().map(|t| !t.starts_with('/')).unwrap_or(false))
                    .endpoint(move |bot: Bot, msg: Message| {
                        let state = Arc::clone(&state_for_messages);
                        debug!(chat_id = %msg.chat.id, chars = msg.text().map(str::len), "Text received");
                        async move { handle_message(bot, msg, state).await }
                    }),
            );

        info!("Bot is running! Send /start to begin.");

        Dispatcher::builder(bot, handler)
            .default_handler(|upd| async move {
                debug!("Unhandled update: {:?}", upd.kind);
            })
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        info!("Bot stopped");
        Ok(())
    }
}

/// Background task that expires idle sessions and tells mid-flow users.
async fn sweep_sessions_loop(bot: Bot, state: Arc<BotState>) {
    let mut sweep_interval = interval(Duration::from_secs(SWEEP_INTERVAL_SECS));

    loop {
        sweep_interval.tick().await;

        for session in state.sweep_expired(Utc::now()).await {
            if !session.state.is_mid_flow() {
                continue;
            }
            info!(
                user_id = session.user_id,
                chat_id = session.chat_id,
                state = %session.state,
                "Session timed out mid-flow"
            );
            let notice = format!(
                "⏰ Your session timed out after {} minutes of inactivity ({}). \
                 Send a file to start again, or /continue to extend your series.",
                state.session_timeout().as_secs() / 60,
                session.state
            );
            if let Err(e) = bot.send_message(ChatId(session.chat_id), notice).await {
                warn!(chat_id = session.chat_id, error = %e, "Failed to send timeout notice");
            }
        }
    }
}
