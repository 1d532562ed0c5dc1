use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::core::matcher::DEFAULT_SHUFFLE_ATTEMPTS;
use crate::core::MatcherSettings;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub telegram: TelegramSettings,
    pub admin: AdminSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub notifications: NotificationSettings,
    #[serde(default)]
    pub sessions: SessionSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramSettings {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    pub bot_token: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_base() -> String { "https://api.telegram.org".to_string() }
fn default_timeout_secs() -> u64 { 30 }

#[derive(Debug, Clone, Deserialize)]
pub struct AdminSettings {
    pub api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_shuffle_attempts")]
    pub shuffle_attempts: usize,
    /// Fixed RNG seed for reproducible draws; random when unset
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            shuffle_attempts: default_shuffle_attempts(),
            seed: None,
        }
    }
}

impl From<&MatchingSettings> for MatcherSettings {
    fn from(value: &MatchingSettings) -> Self {
        MatcherSettings {
            shuffle_attempts: value.shuffle_attempts,
        }
    }
}

fn default_shuffle_attempts() -> usize { DEFAULT_SHUFFLE_ATTEMPTS }

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationSettings {
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
        }
    }
}

fn default_concurrency() -> usize { 8 }

#[derive(Debug, Clone, Deserialize)]
pub struct SessionSettings {
    #[serde(default = "default_session_ttl")]
    pub ttl_secs: u64,
    #[serde(default = "default_session_capacity")]
    pub capacity: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            ttl_secs: default_session_ttl(),
            capacity: default_session_capacity(),
        }
    }
}

fn default_session_ttl() -> u64 { 900 }
fn default_session_capacity() -> u64 { 10_000 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with SANTA_)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., SANTA__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("SANTA")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings = apply_env_overrides(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("SANTA")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Conventional variable names win over the layered sources
///
/// `DATABASE_URL`, `BOT_TOKEN` and `ADMIN_API_KEY` are honoured directly so
/// that a plain `.env` file is enough to run the service.
fn apply_env_overrides(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    for (var, key) in [
        ("DATABASE_URL", "database.url"),
        ("BOT_TOKEN", "telegram.bot_token"),
        ("ADMIN_API_KEY", "admin.api_key"),
    ] {
        if let Ok(value) = env::var(var) {
            builder = builder.set_override(key, value)?;
        }
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matching() {
        let matching = MatchingSettings::default();
        assert_eq!(matching.shuffle_attempts, 1000);
        assert_eq!(matching.seed, None);
        assert_eq!(MatcherSettings::from(&matching).shuffle_attempts, 1000);
    }

    #[test]
    fn test_default_logging() {
        let level = default_log_level();
        let format = default_log_format();
        assert_eq!(level, "info");
        assert_eq!(format, "json");
    }

    #[test]
    fn test_partial_sections_use_defaults() {
        let matching: MatchingSettings = toml::from_str("seed = 42").unwrap();
        assert_eq!(matching.seed, Some(42));
        assert_eq!(matching.shuffle_attempts, 1000);

        let sessions: SessionSettings = toml::from_str("").unwrap();
        assert_eq!(sessions.ttl_secs, 900);
        assert_eq!(sessions.capacity, 10_000);
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("santa-settings-{}.toml", std::process::id()));
        std::fs::write(
            &path,
            r#"
            [server]
            host = "127.0.0.1"
            port = 9000

            [database]
            url = "postgres://localhost/santa"

            [telegram]
            bot_token = "123:abc"

            [admin]
            api_key = "secret"

            [notifications]
            concurrency = 2
            "#,
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.telegram.api_base, "https://api.telegram.org");
        assert_eq!(settings.telegram.timeout_secs, 30);
        assert_eq!(settings.notifications.concurrency, 2);
        assert_eq!(settings.matching.shuffle_attempts, 1000);
        assert_eq!(settings.logging.format, "json");
    }
}
