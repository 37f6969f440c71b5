//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file if present).

use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub player: PlayerConfig,
    pub log: LogSettings,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default)]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
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
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "development" => Ok(Self::Development),
            _ => Err(()),
        }
    }
}

/// Timing and behaviour of the story player
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlayerConfig {
    /// How often progress is sampled while an item plays
    #[serde(default = "default_sample_interval_ms")]
    pub sample_interval_ms: u64,
    /// How long an item must stay on screen before a view is recorded
    #[serde(default = "default_dwell_threshold_ms")]
    pub dwell_threshold_ms: u64,
    /// Whether media starts muted
    #[serde(default)]
    pub start_muted: bool,
    /// Capacity of the host command channel
    #[serde(default = "default_command_buffer")]
    pub command_buffer: usize,
}

impl PlayerConfig {
    /// Sampling period, never shorter than one millisecond
    #[must_use]
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms.max(1))
    }

    /// Command channel capacity, never zero
    #[must_use]
    pub fn command_capacity(&self) -> usize {
        self.command_buffer.max(1)
    }

    #[must_use]
    pub fn dwell_threshold(&self) -> Duration {
        Duration::from_millis(self.dwell_threshold_ms)
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: default_sample_interval_ms(),
            dwell_threshold_ms: default_dwell_threshold_ms(),
            start_muted: false,
            command_buffer: default_command_buffer(),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging settings
#[derive(Debug, Clone, Deserialize, Default)]
pub struct LogSettings {
    #[serde(default)]
    pub format: LogFormat,
}

// Default value functions
fn default_app_name() -> String {
    "journey-player".to_string()
}

fn default_sample_interval_ms() -> u64 {
    50
}

fn default_dwell_threshold_ms() -> u64 {
    1_000
}

fn default_command_buffer() -> usize {
    64
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Every variable is optional; unset ones fall back to defaults.
    ///
    /// # Errors
    /// Returns an error if a variable is set to a value that cannot be parsed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_name = match lookup("APP_ENV") {
            Some(raw) => raw
                .parse::<Environment>()
                .map_err(|()| ConfigError::InvalidValue("APP_ENV", raw))?,
            None => Environment::default(),
        };

        let format = match lookup("LOG_FORMAT") {
            Some(raw) => match raw.to_lowercase().as_str() {
                "json" => LogFormat::Json,
                "pretty" | "text" => LogFormat::Pretty,
                _ => return Err(ConfigError::InvalidValue("LOG_FORMAT", raw)),
            },
            // Structured logs by default outside development
            None if env_name.is_production() => LogFormat::Json,
            None => LogFormat::Pretty,
        };

        let player = PlayerConfig {
            sample_interval_ms: parse_var(&lookup, "JOURNEY_SAMPLE_INTERVAL_MS")?
                .unwrap_or_else(default_sample_interval_ms),
            dwell_threshold_ms: parse_var(&lookup, "JOURNEY_DWELL_THRESHOLD_MS")?
                .unwrap_or_else(default_dwell_threshold_ms),
            start_muted: parse_flag(&lookup, "JOURNEY_START_MUTED")?.unwrap_or(false),
            command_buffer: parse_var(&lookup, "JOURNEY_COMMAND_BUFFER")?
                .unwrap_or_else(default_command_buffer),
        };

        if player.sample_interval_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "JOURNEY_SAMPLE_INTERVAL_MS",
                "must be greater than zero".to_string(),
            ));
        }
        if player.command_buffer == 0 {
            return Err(ConfigError::InvalidValue(
                "JOURNEY_COMMAND_BUFFER",
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env: env_name,
            },
            player,
            log: LogSettings { format },
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app: AppSettings {
                name: default_app_name(),
                env: Environment::default(),
            },
            player: PlayerConfig::default(),
            log: LogSettings::default(),
        }
    }
}

fn parse_var<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key, raw))
        })
        .transpose()
}

fn parse_flag<F>(lookup: &F, key: &'static str) -> Result<Option<bool>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| match raw.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidValue(key, raw)),
        })
        .transpose()
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
