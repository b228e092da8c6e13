//! Environment configuration for Postcraft.
//!
//! All settings come from environment variables (optionally seeded from a
//! `.env` file by the binaries). Missing credentials are fatal at startup;
//! everything else has a default.
//!
//! # Environment Variables
//!
//! Required:
//! - `TELEGRAM_BOT_TOKEN`: Bot token from @BotFather
//! - `OPENAI_API_KEY` or `ANTHROPIC_API_KEY`, matching the provider
//!
//! Optional:
//! - `CONTENT_GENERATION_PROVIDER`: `openai` (default) or `claude`
//! - `OPENAI_MODEL` / `CLAUDE_MODEL`: model overrides
//! - `LLM_MAX_TOKENS` (default 2000), `LLM_TEMPERATURE` (default 0.7)
//! - `PROCESSING_TIMEOUT`: seconds per model call (default 300)
//! - `SESSION_TIMEOUT_MINUTES`: idle session expiry (default 30)
//! - `AIRTABLE_API_KEY`, `AIRTABLE_BASE_ID`, `AIRTABLE_TABLE_NAME`
//! - `POSTCRAFT_STATE_DIR`: local store directory (default `~/.postcraft`)
//! - `TELEGRAM_HTTP_TIMEOUT` (default 30), `TELEGRAM_POOL_SIZE` (default 8)

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use postcraft_llm::{ModelConfig, Provider};
use thiserror::Error;

pub const TELEGRAM_TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";
pub const PROVIDER_ENV: &str = "CONTENT_GENERATION_PROVIDER";
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const OPENAI_MODEL_ENV: &str = "OPENAI_MODEL";
pub const ANTHROPIC_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";
/// Accepted as an alias of `ANTHROPIC_API_KEY`.
pub const CLAUDE_API_KEY_ENV: &str = "CLAUDE_API_KEY";
pub const CLAUDE_MODEL_ENV: &str = "CLAUDE_MODEL";
pub const MAX_TOKENS_ENV: &str = "LLM_MAX_TOKENS";
pub const TEMPERATURE_ENV: &str = "LLM_TEMPERATURE";
pub const PROCESSING_TIMEOUT_ENV: &str = "PROCESSING_TIMEOUT";
pub const SESSION_TIMEOUT_ENV: &str = "SESSION_TIMEOUT_MINUTES";
pub const AIRTABLE_API_KEY_ENV: &str = "AIRTABLE_API_KEY";
pub const AIRTABLE_BASE_ID_ENV: &str = "AIRTABLE_BASE_ID";
pub const AIRTABLE_TABLE_ENV: &str = "AIRTABLE_TABLE_NAME";
pub const STATE_DIR_ENV: &str = "POSTCRAFT_STATE_DIR";
pub const TELEGRAM_HTTP_TIMEOUT_ENV: &str = "TELEGRAM_HTTP_TIMEOUT";
pub const TELEGRAM_POOL_SIZE_ENV: &str = "TELEGRAM_POOL_SIZE";

/// Default Airtable table name.
pub const DEFAULT_AIRTABLE_TABLE: &str = "Generated Posts";

const DEFAULT_STATE_DIR: &str = ".postcraft";
const DEFAULT_PROCESSING_TIMEOUT_SECS: u64 = 300;
const DEFAULT_SESSION_TIMEOUT_MINUTES: u64 = 30;
const DEFAULT_TELEGRAM_HTTP_TIMEOUT_SECS: u64 = 30;
const DEFAULT_TELEGRAM_POOL_SIZE: usize = 8;

/// Configuration errors. Fatal at startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("{0} is not set")]
    Missing(&'static str),

    /// A variable is set but unusable.
    #[error("invalid value for {var}: '{value}' ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Airtable connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AirtableSettings {
    pub api_key: String,
    pub base_id: String,
    pub table_name: String,
}

/// Fully resolved application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Telegram bot token.
    pub telegram_token: String,
    /// Model selection and sampling settings.
    pub model: ModelConfig,
    /// API key for the selected provider.
    pub llm_api_key: String,
    /// Airtable settings; `None` selects the local JSON store.
    pub airtable: Option<AirtableSettings>,
    /// Upper bound on a single model call.
    pub processing_timeout: Duration,
    /// Idle time after which a session expires.
    pub session_timeout: Duration,
    /// Base directory for local state.
    pub state_dir: PathBuf,
    /// Request timeout for the Telegram HTTP client.
    pub telegram_http_timeout: Duration,
    /// Idle connections kept per host by the Telegram HTTP client.
    pub telegram_pool_size: usize,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let telegram_token = get(TELEGRAM_TOKEN_ENV).ok_or(ConfigError::Missing(TELEGRAM_TOKEN_ENV))?;

        let provider = match get(PROVIDER_ENV) {
            Some(value) => Provider::from_str(&value).map_err(|e| ConfigError::Invalid {
                var: PROVIDER_ENV,
                value,
                reason: e.to_string(),
            })?,
            None => Provider::default(),
        };

        let (llm_api_key, model_name) = match provider {
            Provider::OpenAi => (
                get(OPENAI_API_KEY_ENV).ok_or(ConfigError::Missing(OPENAI_API_KEY_ENV))?,
                get(OPENAI_MODEL_ENV),
            ),
            Provider::Claude => (
                get(ANTHROPIC_API_KEY_ENV)
                    .or_else(|| get(CLAUDE_API_KEY_ENV))
                    .ok_or(ConfigError::Missing(ANTHROPIC_API_KEY_ENV))?,
                get(CLAUDE_MODEL_ENV),
            ),
        };

        let mut model = ModelConfig::new(
            provider,
            model_name.unwrap_or_else(|| provider.default_model().to_string()),
        );
        if let Some(max_tokens) = parse_opt::<u32>(MAX_TOKENS_ENV, get(MAX_TOKENS_ENV))? {
            model = model.with_max_tokens(max_tokens);
        }
        let temperature_raw = get(TEMPERATURE_ENV);
        if let Some(temperature) = parse_opt::<f32>(TEMPERATURE_ENV, temperature_raw.clone())? {
            if !temperature.is_finite() {
                return Err(ConfigError::Invalid {
                    var: TEMPERATURE_ENV,
                    value: temperature_raw.unwrap_or_default(),
                    reason: "must be a finite number".to_string(),
                });
            }
            model = model.with_temperature(temperature);
        }

        let airtable = match (get(AIRTABLE_API_KEY_ENV), get(AIRTABLE_BASE_ID_ENV)) {
            (Some(api_key), Some(base_id)) => Some(AirtableSettings {
                api_key,
                base_id,
                table_name: get(AIRTABLE_TABLE_ENV)
                    .unwrap_or_else(|| DEFAULT_AIRTABLE_TABLE.to_string()),
            }),
            (Some(_), None) => return Err(ConfigError::Missing(AIRTABLE_BASE_ID_ENV)),
            (None, Some(_)) => return Err(ConfigError::Missing(AIRTABLE_API_KEY_ENV)),
            (None, None) => None,
        };

        let processing_timeout = positive_secs(
            PROCESSING_TIMEOUT_ENV,
            get(PROCESSING_TIMEOUT_ENV),
            DEFAULT_PROCESSING_TIMEOUT_SECS,
        )?;
        let session_raw = get(SESSION_TIMEOUT_ENV);
        let session_minutes = positive::<u64>(
            SESSION_TIMEOUT_ENV,
            session_raw.clone(),
            DEFAULT_SESSION_TIMEOUT_MINUTES,
        )?;
        let session_secs = session_minutes
            .checked_mul(60)
            .ok_or_else(|| ConfigError::Invalid {
                var: SESSION_TIMEOUT_ENV,
                value: session_raw.unwrap_or_default(),
                reason: "too large".to_string(),
            })?;
        let telegram_http_timeout = positive_secs(
            TELEGRAM_HTTP_TIMEOUT_ENV,
            get(TELEGRAM_HTTP_TIMEOUT_ENV),
            DEFAULT_TELEGRAM_HTTP_TIMEOUT_SECS,
        )?;
        let telegram_pool_size = positive::<usize>(
            TELEGRAM_POOL_SIZE_ENV,
            get(TELEGRAM_POOL_SIZE_ENV),
            DEFAULT_TELEGRAM_POOL_SIZE,
        )?;

        let state_dir = get(STATE_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(default_state_dir);

        Ok(Self {
            telegram_token,
            model,
            llm_api_key,
            airtable,
            processing_timeout,
            session_timeout: Duration::from_secs(session_secs),
            state_dir,
            telegram_http_timeout,
            telegram_pool_size,
        })
    }

    /// Human-readable summary with secrets omitted.
    pub fn summary(&self) -> String {
        let store = match &self.airtable {
            Some(a) => format!("airtable ({}/{})", a.base_id, a.table_name),
            None => format!("local ({})", self.state_dir.display()),
        };
        format!(
            "provider: {}\nmodel: {}\nmax tokens: {}\ntemperature: {}\nstore: {}\n\
             processing timeout: {}s\nsession timeout: {}m",
            self.model.provider,
            self.model.model,
            self.model.max_tokens,
            self.model.temperature,
            store,
            self.processing_timeout.as_secs(),
            self.session_timeout.as_secs() / 60,
        )
    }
}

/// `~/.postcraft`, or `.postcraft` in the working directory without a home.
pub fn default_state_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(DEFAULT_STATE_DIR))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR))
}

fn parse_opt<T>(var: &'static str, value: Option<String>) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .map(|v| {
            v.parse::<T>().map_err(|e| ConfigError::Invalid {
                var,
                reason: e.to_string(),
                value: v,
            })
        })
        .transpose()
}

fn positive<T>(var: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd + Default,
    T::Err: std::fmt::Display,
{
    match parse_opt::<T>(var, value.clone())? {
        Some(v) if v <= T::default() => Err(ConfigError::Invalid {
            var,
            value: value.unwrap_or_default(),
            reason: "must be greater than zero".to_string(),
        }),
        Some(v) => Ok(v),
        None => Ok(default),
    }
}

fn positive_secs(
    var: &'static str,
    value: Option<String>,
    default: u64,
) -> Result<Duration, ConfigError> {
    positive::<u64>(var, value, default).map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn test_minimal_openai_config() {
        let config = load(&[(TELEGRAM_TOKEN_ENV, "tg"), (OPENAI_API_KEY_ENV, "sk")]).unwrap();

        assert_eq!(config.model.provider, Provider::OpenAi);
        assert_eq!(config.model.model, "gpt-4o");
        assert_eq!(config.llm_api_key, "sk");
        assert!(config.airtable.is_none());
        assert_eq!(config.processing_timeout, Duration::from_secs(300));
        assert_eq!(config.session_timeout, Duration::from_secs(30 * 60));
        assert_eq!(config.telegram_pool_size, 8);
    }

    #[test]
    fn test_missing_telegram_token() {
        let err = load(&[(OPENAI_API_KEY_ENV, "sk")]).unwrap_err();
        assert_eq!(err, ConfigError::Missing(TELEGRAM_TOKEN_ENV));
    }

    #[test]
    fn test_empty_value_counts_as_missing() {
        let err = load(&[(TELEGRAM_TOKEN_ENV, "tg"), (OPENAI_API_KEY_ENV, "  ")]).unwrap_err();
        assert_eq!(err, ConfigError::Missing(OPENAI_API_KEY_ENV));
    }

    #[test]
    fn test_claude_provider_uses_alias_key_and_model_override() {
        let config = load(&[
            (TELEGRAM_TOKEN_ENV, "tg"),
            (PROVIDER_ENV, "claude"),
            (CLAUDE_API_KEY_ENV, "ck"),
            (CLAUDE_MODEL_ENV, "claude-custom"),
        ])
        .unwrap();

        assert_eq!(config.model.provider, Provider::Claude);
        assert_eq!(config.model.model, "claude-custom");
        assert_eq!(config.llm_api_key, "ck");
    }

    #[test]
    fn test_claude_provider_requires_anthropic_key() {
        let err = load(&[
            (TELEGRAM_TOKEN_ENV, "tg"),
            (PROVIDER_ENV, "anthropic"),
            (OPENAI_API_KEY_ENV, "sk"),
        ])
        .unwrap_err();
        assert_eq!(err, ConfigError::Missing(ANTHROPIC_API_KEY_ENV));
    }

    #[test]
    fn test_unknown_provider_is_invalid() {
        let err = load(&[(TELEGRAM_TOKEN_ENV, "tg"), (PROVIDER_ENV, "gemini")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: PROVIDER_ENV, .. }));
    }

    #[test]
    fn test_airtable_requires_both_values() {
        let err = load(&[
            (TELEGRAM_TOKEN_ENV, "tg"),
            (OPENAI_API_KEY_ENV, "sk"),
            (AIRTABLE_API_KEY_ENV, "pat"),
        ])
        .unwrap_err();
        assert_eq!(err, ConfigError::Missing(AIRTABLE_BASE_ID_ENV));

        let config = load(&[
            (TELEGRAM_TOKEN_ENV, "tg"),
            (OPENAI_API_KEY_ENV, "sk"),
            (AIRTABLE_API_KEY_ENV, "pat"),
            (AIRTABLE_BASE_ID_ENV, "appXYZ"),
        ])
        .unwrap();
        let airtable = config.airtable.unwrap();
        assert_eq!(airtable.base_id, "appXYZ");
        assert_eq!(airtable.table_name, DEFAULT_AIRTABLE_TABLE);
    }

    #[test]
    fn test_numeric_overrides() {
        let config = load(&[
            (TELEGRAM_TOKEN_ENV, "tg"),
            (OPENAI_API_KEY_ENV, "sk"),
            (MAX_TOKENS_ENV, "4000"),
            (TEMPERATURE_ENV, "0.4"),
            (PROCESSING_TIMEOUT_ENV, "60"),
            (SESSION_TIMEOUT_ENV, "5"),
        ])
        .unwrap();

        assert_eq!(config.model.max_tokens, 4000);
        assert_eq!(config.model.temperature, 0.4);
        assert_eq!(config.processing_timeout, Duration::from_secs(60));
        assert_eq!(config.session_timeout, Duration::from_secs(300));
    }

    #[test]
    fn test_zero_and_garbage_numbers_rejected() {
        let err = load(&[
            (TELEGRAM_TOKEN_ENV, "tg"),
            (OPENAI_API_KEY_ENV, "sk"),
            (SESSION_TIMEOUT_ENV, "0"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: SESSION_TIMEOUT_ENV, .. }));

        let err = load(&[
            (TELEGRAM_TOKEN_ENV, "tg"),
            (OPENAI_API_KEY_ENV, "sk"),
            (MAX_TOKENS_ENV, "lots"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: MAX_TOKENS_ENV, .. }));
    }

    #[test]
    fn test_out_of_range_numbers_rejected() {
        let err = load(&[
            (TELEGRAM_TOKEN_ENV, "tg"),
            (OPENAI_API_KEY_ENV, "sk"),
            (SESSION_TIMEOUT_ENV, &u64::MAX.to_string()),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: SESSION_TIMEOUT_ENV, .. }));

        for bad in ["NaN", "inf", "-inf"] {
            let err = load(&[
                (TELEGRAM_TOKEN_ENV, "tg"),
                (OPENAI_API_KEY_ENV, "sk"),
                (TEMPERATURE_ENV, bad),
            ])
            .unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { var: TEMPERATURE_ENV, .. }), "{}", bad);
        }
    }

    #[test]
    fn test_summary_omits_secrets() {
        let config = load(&[
            (TELEGRAM_TOKEN_ENV, "tg-secret"),
            (OPENAI_API_KEY_ENV, "sk-secret"),
            (STATE_DIR_ENV, "/tmp/postcraft"),
        ])
        .unwrap();
        let summary = config.summary();

        assert!(summary.contains("provider: openai"));
        assert!(summary.contains("local (/tmp/postcraft)"));
        assert!(!summary.contains("secret"));
    }
}
