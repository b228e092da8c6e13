//! Postcraft Telegram Bot binary.
//!
//! Start the bot with:
//! ```bash
//! TELEGRAM_BOT_TOKEN=xxx OPENAI_API_KEY=xxx cargo run -p postcraft-telegram --bin postcraft-bot
//! ```

use std::process::ExitCode;

use clap::Parser;
use postcraft_core::AppConfig;
use postcraft_telegram::PostcraftBot;
use tracing_subscriber::EnvFilter;

/// Postcraft Telegram Bot - turn dev-journal markdown into Facebook posts
#[derive(Parser, Debug)]
#[command(name = "postcraft-bot")]
#[command(about = "Telegram bot that turns dev-journal markdown into Facebook posts")]
struct Args {
    /// Validate configuration, print a summary and exit
    #[arg(long)]
    check_config: bool,

    /// Verbose logging (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// `RUST_LOG` wins over the verbosity flags when set.
fn init_logging(verbose: u8) {
    let filter = match verbose {
        // Targets match by prefix, so `postcraft` covers every postcraft_* crate.
        0 => "postcraft=info,teloxide=warn",
        1 => "postcraft=debug,teloxide=info",
        2 => "postcraft=trace,teloxide=debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Local .env.local or .env, if present
    let _ = dotenvy::from_filename(".env.local").or_else(|_| dotenvy::dotenv());

    init_logging(args.verbose);

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    if args.check_config {
        println!("Configuration OK\n{}", config.summary());
        return ExitCode::SUCCESS;
    }

    let bot = match PostcraftBot::new(&config) {
        Ok(bot) => bot,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build bot");
            return ExitCode::FAILURE;
        }
    };

    match bot.get_me().await {
        Ok(username) => {
            tracing::info!(username = %username, "Bot initialized successfully");
            println!("\n[bot] Postcraft Telegram Bot");
            println!("   Bot: @{}", username);
            println!("   Model: {} ({})", config.model.model, config.model.provider);
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to get bot info");
            return ExitCode::FAILURE;
        }
    }

    println!("\n[phone] Open Telegram and send /start to begin");
    println!("   Press Ctrl+C to stop\n");

    if let Err(e) = bot.run().await {
        tracing::error!(error = %e, "Bot exited with error");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
