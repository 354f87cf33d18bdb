//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file when
//! present).

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub database: DatabaseConfig,
    pub source: SourceConfig,
    pub poller: PollerConfig,
    pub retention: RetentionConfig,
}

/// General application settings
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub name: String,
    pub env: Environment,
    pub log_format: LogFormat,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "development" => Ok(Self::Development),
            other => Err(ConfigError::InvalidValue("APP_ENV", other.to_string())),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::InvalidValue("LOG_FORMAT", other.to_string())),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Message source (session bridge) configuration
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub url: String,
    pub token: Option<String>,
    pub timeout_secs: u64,
}

impl SourceConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Polling loop configuration
#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub channel_names: Vec<String>,
    pub interval_secs: u64,
    pub error_backoff_secs: u64,
    pub channel_delay_ms: u64,
    pub group_window: u32,
}

impl PollerConfig {
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    #[must_use]
    pub fn error_backoff(&self) -> Duration {
        Duration::from_secs(self.error_backoff_secs)
    }

    #[must_use]
    pub fn channel_delay(&self) -> Duration {
        Duration::from_millis(self.channel_delay_ms)
    }
}

/// Retention sweep configuration
#[derive(Debug, Clone)]
pub struct RetentionConfig {
    pub hours: u32,
    pub sweep_interval_secs: u64,
}

impl RetentionConfig {
    #[must_use]
    pub fn window(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.hours))
    }

    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

// Default value functions
fn default_app_name() -> String {
    "channel-harvest".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_max_connections() -> u32 {
    5
}

fn default_min_connections() -> u32 {
    1
}

fn default_source_timeout() -> u64 {
    30
}

fn default_poll_interval() -> u64 {
    300 // 5 minutes
}

fn default_error_backoff() -> u64 {
    60
}

fn default_channel_delay() -> u64 {
    1000
}

fn default_group_window() -> u32 {
    15
}

fn default_retention_hours() -> u32 {
    48
}

/// Longest accepted retention window: ten years
const MAX_RETENTION_HOURS: u32 = 24 * 366 * 10;

fn default_sweep_interval() -> u64 {
    3600
}

/// Split a comma-separated channel list, dropping blank entries
fn parse_channel_names(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect()
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or
    /// a value cannot be parsed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(&lookup);

        let env = vars.parsed("APP_ENV", default_env)?;
        let default_format = if env.is_production() {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        };

        let channel_names = parse_channel_names(&vars.required("CHANNEL_NAMES")?);
        if channel_names.is_empty() {
            return Err(ConfigError::InvalidValue(
                "CHANNEL_NAMES",
                "no channel names given".to_string(),
            ));
        }

        let poller = PollerConfig {
            channel_names,
            interval_secs: vars.parsed("POLL_INTERVAL_SECS", default_poll_interval)?,
            error_backoff_secs: vars.parsed("POLL_ERROR_BACKOFF_SECS", default_error_backoff)?,
            channel_delay_ms: vars.parsed("CHANNEL_DELAY_MS", default_channel_delay)?,
            group_window: vars.parsed("GROUP_WINDOW", default_group_window)?,
        };
        if poller.group_window == 0 {
            return Err(ConfigError::InvalidValue("GROUP_WINDOW", "0".to_string()));
        }

        let retention = RetentionConfig {
            hours: vars.parsed("RETENTION_HOURS", default_retention_hours)?,
            sweep_interval_secs: vars.parsed("SWEEP_INTERVAL_SECS", default_sweep_interval)?,
        };
        if retention.hours == 0 || retention.hours > MAX_RETENTION_HOURS {
            return Err(ConfigError::InvalidValue(
                "RETENTION_HOURS",
                retention.hours.to_string(),
            ));
        }

        Ok(Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env,
                log_format: vars.parsed("LOG_FORMAT", || default_format)?,
            },
            database: DatabaseConfig {
                url: vars.required("DATABASE_URL")?,
                max_connections: vars.parsed("DATABASE_MAX_CONNECTIONS", default_max_connections)?,
                min_connections: vars.parsed("DATABASE_MIN_CONNECTIONS", default_min_connections)?,
            },
            source: SourceConfig {
                url: vars.required("SOURCE_URL")?,
                token: lookup("SOURCE_TOKEN").filter(|token| !token.is_empty()),
                timeout_secs: vars.parsed("SOURCE_TIMEOUT_SECS", default_source_timeout)?,
            },
            poller,
            retention,
        })
    }
}

struct Vars<'a, F>(&'a F);

impl<F> Vars<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn required(&self, key: &'static str) -> Result<String, ConfigError> {
        (self.0)(key)
            .filter(|value| !value.trim().is_empty())
            .ok_or(ConfigError::MissingVar(key))
    }

    fn parsed<T, D>(&self, key: &'static str, default: D) -> Result<T, ConfigError>
    where
        T: FromStr,
        D: FnOnce() -> T,
    {
        match (self.0)(key) {
            Some(raw) if !raw.trim().is_empty() => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key, raw)),
            _ => Ok(default()),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
