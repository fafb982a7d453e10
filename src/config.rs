//! Configuration types for ratecast

use serde::Deserialize;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub transport: TransportConfig,
    #[serde(default)]
    pub rates: RatesConfig,
    pub store: StoreConfig,
    #[serde(default)]
    pub broadcast: BroadcastConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Telegram transport configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TransportConfig {
    /// Bot API token; overridden by the TELEGRAM_TOKEN env var when set
    #[serde(default)]
    pub token: String,

    /// Long-poll timeout passed to getUpdates (seconds)
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,
}

/// Rate feed configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RatesConfig {
    /// Daily rates feed URL
    #[serde(default = "default_rates_url")]
    pub url: String,

    /// Currency name to extract from the feed
    #[serde(default = "default_currency")]
    pub currency: String,

    /// HTTP timeout for a single fetch (seconds)
    #[serde(default = "default_rates_timeout")]
    pub timeout_secs: u64,
}

fn default_poll_timeout() -> u64 {
    30
}
fn default_rates_url() -> String {
    "https://www.tcmb.gov.tr/kurlar/today.xml".to_string()
}
fn default_currency() -> String {
    "EURO".to_string()
}
fn default_rates_timeout() -> u64 {
    60
}

impl Default for RatesConfig {
    fn default() -> Self {
        Self {
            url: default_rates_url(),
            currency: default_currency(),
            timeout_secs: default_rates_timeout(),
        }
    }
}

/// Subscriber store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Path of the JSON snapshot file
    pub path: PathBuf,
}

/// Broadcast timer configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BroadcastConfig {
    /// Fixed period between broadcasts (seconds)
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
}

fn default_interval() -> u64 {
    3600
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// TELEGRAM_TOKEN from the environment takes precedence over the file so
    /// the secret can stay out of the config on disk.
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;

        if let Ok(token) = std::env::var("TELEGRAM_TOKEN") {
            if !token.is_empty() {
                config.transport.token = token;
            }
        }

        if config.transport.token.is_empty() {
            anyhow::bail!("transport token missing: set transport.token or TELEGRAM_TOKEN");
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialize() {
        let toml = r#"
            [transport]
            token = "123:abc"
            poll_timeout_secs = 25

            [rates]
            url = "https://example.test/today.xml"
            currency = "EURO"
            timeout_secs = 10

            [store]
            path = "./subscribers.json"

            [broadcast]
            interval_secs = 1800

            [telemetry]
            log_level = "debug"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.transport.token, "123:abc");
        assert_eq!(config.transport.poll_timeout_secs, 25);
        assert_eq!(config.rates.currency, "EURO");
        assert_eq!(config.broadcast.interval_secs, 1800);
        assert_eq!(config.telemetry.log_level, "debug");
    }

    #[test]
    fn test_config_defaults() {
        let toml = r#"
            [transport]
            token = "123:abc"

            [store]
            path = "./subscribers.json"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.transport.poll_timeout_secs, 30);
        assert_eq!(config.rates.url, "https://www.tcmb.gov.tr/kurlar/today.xml");
        assert_eq!(config.rates.currency, "EURO");
        assert_eq!(config.rates.timeout_secs, 60);
        assert_eq!(config.broadcast.interval_secs, 3600);
        assert_eq!(config.telemetry.log_level, "info");
    }

    #[test]
    fn test_env_token_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[transport]\ntoken = \"file-token\"\n\n[store]\npath = \"./subscribers.json\"\n",
        )
        .unwrap();

        std::env::set_var("TELEGRAM_TOKEN", "env-token");
        let config = Config::load(&path).unwrap();
        std::env::remove_var("TELEGRAM_TOKEN");

        assert_eq!(config.transport.token, "env-token");

        // Without the override the file's token is used.
        let config = Config::load(&path).unwrap();
        assert_eq!(config.transport.token, "file-token");
    }

    #[test]
    fn test_config_load_nonexistent() {
        let result = Config::load("/nonexistent/path/config.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_config_clone() {
        let config = RatesConfig::default();
        let cloned = config.clone();
        assert_eq!(config.url, cloned.url);
    }
}
