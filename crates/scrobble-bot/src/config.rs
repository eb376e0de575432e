//! Application configuration loaded from environment variables.

use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::time::Duration;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Signal configuration
    pub signal: SignalConfig,

    /// Last.fm API configuration
    pub lastfm: LastfmConfig,

    /// Registration handshake configuration
    #[serde(default)]
    pub registration: RegistrationConfig,

    /// Bot configuration
    #[serde(default)]
    pub bot: BotConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignalConfig {
    /// Signal CLI REST API endpoint
    #[serde(default = "default_signal_service")]
    pub service_url: String,

    /// The bot's registered phone number
    pub phone_number: String,

    /// Poll interval for messages
    #[serde(default = "default_poll_interval", with = "humantime_serde")]
    pub poll_interval: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LastfmConfig {
    /// Last.fm API key
    pub api_key: SecretString,

    /// Shared secret used to sign requests
    pub shared_secret: SecretString,

    /// API root URL
    #[serde(default = "default_lastfm_url")]
    pub base_url: String,

    /// Web page where users authorize the bot
    #[serde(default = "default_auth_url")]
    pub auth_url: String,

    /// Request timeout
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationConfig {
    /// How long to wait for "done" after sending the login link
    #[serde(default = "default_follow_up_timeout", with = "humantime_serde")]
    pub follow_up_timeout: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            follow_up_timeout: default_follow_up_timeout(),
        }
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

// Default value functions
fn default_signal_service() -> String {
    "http://signal-api:8080".into()
}

fn default_poll_interval() -> Duration {
    Duration::from_millis(500)
}

fn default_lastfm_url() -> String {
    lastfm_client::DEFAULT_API_URL.into()
}

fn default_auth_url() -> String {
    lastfm_client::DEFAULT_AUTH_URL.into()
}

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_follow_up_timeout() -> Duration {
    Duration::from_secs(5 * 60)
}

fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    // Keep +1555... phone numbers as strings.
                    .try_parsing(false),
            )
            .build()
            .context("Failed to build configuration")?;

        Self::from_config(config)
    }

    fn from_config(config: config::Config) -> Result<Self> {
        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}
