//! Startup health check.
//!
//! Validates configuration, then checks Telegram (`getMe`), the model
//! provider and the post store. Exits 0 when everything answers, 1 otherwise.

use std::process::ExitCode;

use postcraft_core::AppConfig;
use postcraft_llm::build_client;
use postcraft_telegram::{build_post_store, build_telegram_bot};
use teloxide::prelude::*;
use tracing_subscriber::EnvFilter;

fn report(name: &str, result: Result<String, String>) -> bool {
    match result {
        Ok(detail) => {
            println!("✅ {}: {}", name, detail);
            true
        }
        Err(e) => {
            println!("❌ {}: {}", name, e);
            tracing::error!(check = name, error = %e, "Health check failed");
            false
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::from_filename(".env.local").or_else(|_| dotenvy::dotenv());

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            report("configuration", Err(e.to_string()));
            return ExitCode::FAILURE;
        }
    };
    report("configuration", Ok("loaded".into()));

    let telegram = match build_telegram_bot(&config) {
        Ok(bot) => bot
            .get_me()
            .await
            .map(|me| format!("@{}", me.username()))
            .map_err(|e| e.to_string()),
        Err(e) => Err(e.to_string()),
    };
    let telegram_ok = report("telegram", telegram);

    let llm = match build_client(&config.model, &config.llm_api_key) {
        Ok(client) => client
            .health_check()
            .await
            .map(|_| format!("{} ({})", client.model(), client.provider()))
            .map_err(|e| e.to_string()),
        Err(e) => Err(e.to_string()),
    };
    let llm_ok = report("model", llm);

    let store = match build_post_store(&config) {
        Ok(store) => store
            .health_check()
            .await
            .map(|_| store.backend_name().to_string())
            .map_err(|e| e.to_string()),
        Err(e) => Err(e.to_string()),
    };
    let store_ok = report("store", store);

    if telegram_ok && llm_ok && store_ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
