//! Configuration built once at startup
//!
//! Values come from the process environment (the binary loads `.env` with
//! `dotenvy` first). The resulting [`Config`] is passed by reference into the
//! completion client and the store constructors; component code never reads
//! the environment itself.

use std::env;
use std::time::Duration;

use log::LevelFilter;
use secrecy::{ExposeSecret, SecretString};

use crate::error::{AppError, AppResult};

/// Default values used when a variable is not set
pub mod defaults {
    /// Groq's OpenAI-compatible chat completions endpoint
    pub const COMPLETION_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

    pub const COMPLETION_MODEL: &str = "llama-3.3-70b-versatile";

    /// Low temperature keeps both stages near-deterministic
    pub const COMPLETION_TEMPERATURE: f32 = 0.2;

    pub const COMPLETION_MAX_TOKENS: u32 = 2000;

    /// Bounds each of the two pipeline calls independently
    pub const COMPLETION_TIMEOUT_SECS: u64 = 60;

    pub const DATABASE_PATH: &str = "db.sqlite";

    pub const LOG_FILE_PATH: &str = "app.log";

    pub const LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;

    pub const PORT: u16 = 8000;
}

/// Remote completion service settings
#[derive(Debug)]
pub struct CompletionConfig {
    pub api_url: String,
    /// Read from COMPLETION_API_KEY, falling back to GROQ_API_KEY
    pub api_key: Option<SecretString>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
    /// Run the enhancement stage before code generation
    pub enhance: bool,
}

impl CompletionConfig {
    /// Returns the API key or a configuration error naming the variable.
    pub fn require_api_key(&self) -> AppResult<&SecretString> {
        self.api_key
            .as_ref()
            .ok_or_else(|| AppError::Config("GROQ_API_KEY (or COMPLETION_API_KEY) is not set".to_string()))
    }
}

/// Telegram bot and mini app settings
#[derive(Debug, Default)]
pub struct TelegramConfig {
    pub bot_token: Option<SecretString>,
    /// Public base URL of this service, used to register the webhook
    pub app_url: Option<String>,
    /// URL opened by the keyboard button; defaults to `app_url`
    pub miniapp_url: Option<String>,
    pub webhook_secret: Option<SecretString>,
}

impl TelegramConfig {
    /// Mini app URL, falling back to the service base URL.
    pub fn miniapp_url(&self) -> Option<&str> {
        self.miniapp_url.as_deref().or(self.app_url.as_deref())
    }

    /// `<APP_URL>/webhook`, if APP_URL is set.
    pub fn webhook_url(&self) -> Option<String> {
        self.app_url
            .as_deref()
            .map(|base| format!("{}/webhook", base.trim_end_matches('/')))
    }

    /// Compares a received secret header with the configured one, verbatim.
    ///
    /// When no secret is configured every delivery is rejected.
    pub fn webhook_secret_matches(&self, received: Option<&str>) -> bool {
        match (&self.webhook_secret, received) {
            (Some(expected), Some(received)) => expected.expose_secret() == received,
            _ => false,
        }
    }
}

/// Process-wide configuration
#[derive(Debug)]
pub struct Config {
    pub completion: CompletionConfig,
    pub telegram: TelegramConfig,
    pub database_path: String,
    pub log_file_path: String,
    /// Applied to both the terminal and the file logger
    pub log_level: LevelFilter,
    pub port: u16,
}

impl Config {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable lookup.
    ///
    /// Plain settings are trimmed; secrets are kept byte for byte since the
    /// webhook secret is compared verbatim. A blank value counts as unset.
    /// Unparseable values fall back to their defaults with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key).and_then(|value| {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            })
        };
        let secret = |key: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .map(SecretString::from)
        };

        let completion = CompletionConfig {
            api_url: var("COMPLETION_API_URL").unwrap_or_else(|| defaults::COMPLETION_API_URL.to_string()),
            api_key: secret("COMPLETION_API_KEY").or_else(|| secret("GROQ_API_KEY")),
            model: var("COMPLETION_MODEL").unwrap_or_else(|| defaults::COMPLETION_MODEL.to_string()),
            temperature: parse_or(var("COMPLETION_TEMPERATURE"), "COMPLETION_TEMPERATURE", defaults::COMPLETION_TEMPERATURE)
                .clamp(0.0, 2.0),
            max_tokens: parse_or(var("COMPLETION_MAX_TOKENS"), "COMPLETION_MAX_TOKENS", defaults::COMPLETION_MAX_TOKENS),
            timeout: Duration::from_secs(parse_or(
                var("COMPLETION_TIMEOUT_SECS"),
                "COMPLETION_TIMEOUT_SECS",
                defaults::COMPLETION_TIMEOUT_SECS,
            )),
            enhance: parse_or(var("COMPLETION_ENHANCE"), "COMPLETION_ENHANCE", true),
        };

        let telegram = TelegramConfig {
            bot_token: secret("BOT_TOKEN").or_else(|| secret("TELOXIDE_TOKEN")),
            app_url: var("APP_URL"),
            miniapp_url: var("MINIAPP_URL"),
            webhook_secret: secret("WEBHOOK_SECRET"),
        };

        Self {
            completion,
            telegram,
            database_path: var("DATABASE_PATH").unwrap_or_else(|| defaults::DATABASE_PATH.to_string()),
            log_file_path: var("LOG_FILE_PATH").unwrap_or_else(|| defaults::LOG_FILE_PATH.to_string()),
            log_level: parse_or(var("LOG_LEVEL"), "LOG_LEVEL", defaults::LOG_LEVEL),
            port: parse_or(var("PORT"), "PORT", defaults::PORT),
        }
    }
}

fn parse_or<T: std::str::FromStr>(raw: Option<String>, key: &str, default: T) -> T {
    match raw {
        Some(value) => value.parse().unwrap_or_else(|_| {
            log::warn!("Ignoring invalid {}={:?}, using default", key, value);
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = config_from(&[]);
        assert_eq!(config.completion.api_url, defaults::COMPLETION_API_URL);
        assert_eq!(config.completion.model, defaults::COMPLETION_MODEL);
        assert_eq!(config.completion.max_tokens, 2000);
        assert_eq!(config.completion.timeout, Duration::from_secs(60));
        assert!(config.completion.enhance);
        assert!(config.completion.api_key.is_none());
        assert_eq!(config.database_path, "db.sqlite");
        assert_eq!(config.port, 8000);
        assert!(config.telegram.bot_token.is_none());
        assert_eq!(config.log_level, LevelFilter::Info);
    }

    #[test]
    fn test_overrides_and_fallbacks() {
        let config = config_from(&[
            ("GROQ_API_KEY", "gsk_test"),
            ("COMPLETION_TIMEOUT_SECS", "120"),
            ("COMPLETION_ENHANCE", "false"),
            ("PORT", "9000"),
            ("APP_URL", "https://bot.example.com/"),
        ]);
        assert_eq!(config.completion.require_api_key().unwrap().expose_secret(), "gsk_test");
        assert_eq!(config.completion.timeout, Duration::from_secs(120));
        assert!(!config.completion.enhance);
        assert_eq!(config.port, 9000);
        assert_eq!(
            config.telegram.webhook_url().as_deref(),
            Some("https://bot.example.com/webhook")
        );
        assert_eq!(config.telegram.miniapp_url(), Some("https://bot.example.com/"));
    }

    #[test]
    fn test_completion_api_key_takes_priority() {
        let config = config_from(&[("GROQ_API_KEY", "groq"), ("COMPLETION_API_KEY", "primary")]);
        assert_eq!(config.completion.require_api_key().unwrap().expose_secret(), "primary");
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let config = config_from(&[("COMPLETION_MAX_TOKENS", "lots"), ("COMPLETION_TEMPERATURE", "9.5")]);
        assert_eq!(config.completion.max_tokens, defaults::COMPLETION_MAX_TOKENS);
        assert_eq!(config.completion.temperature, 2.0);
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config = config_from(&[("BOT_TOKEN", "   "), ("MINIAPP_URL", "")]);
        assert!(config.telegram.bot_token.is_none());
        assert!(config.telegram.miniapp_url().is_none());
    }

    #[test]
    fn test_webhook_secret_compared_verbatim() {
        let config = config_from(&[("WEBHOOK_SECRET", "s3cret")]);
        assert!(config.telegram.webhook_secret_matches(Some("s3cret")));
        assert!(!config.telegram.webhook_secret_matches(Some("S3CRET")));
        assert!(!config.telegram.webhook_secret_matches(None));

        let unset = config_from(&[]);
        assert!(!unset.telegram.webhook_secret_matches(Some("")));
    }

    #[test]
    fn test_secrets_keep_surrounding_whitespace() {
        let config = config_from(&[("WEBHOOK_SECRET", " s3cret "), ("GROQ_API_KEY", "gsk_key\t")]);
        assert!(config.telegram.webhook_secret_matches(Some(" s3cret ")));
        assert!(!config.telegram.webhook_secret_matches(Some("s3cret")));
        assert_eq!(config.completion.require_api_key().unwrap().expose_secret(), "gsk_key\t");
    }

    #[test]
    fn test_log_level_override() {
        assert_eq!(config_from(&[("LOG_LEVEL", "debug")]).log_level, LevelFilter::Debug);
        assert_eq!(config_from(&[("LOG_LEVEL", " WARN ")]).log_level, LevelFilter::Warn);
        assert_eq!(config_from(&[("LOG_LEVEL", "chatty")]).log_level, LevelFilter::Info);
    }
}
