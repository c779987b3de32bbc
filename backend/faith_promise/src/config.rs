//! Application configuration loaded from environment variables.

use std::str::FromStr;
use std::time::Duration;

use crate::errors::{AppError, Result};

/// Where completed pledges go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    Log,
    Sqlite,
    Webhook,
}

impl FromStr for SinkKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "log" => Ok(Self::Log),
            "sqlite" => Ok(Self::Sqlite),
            "webhook" => Ok(Self::Webhook),
            other => Err(AppError::Config(format!("Invalid SINK: {other}"))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Submission sink to use
    pub sink: SinkKind,
    /// Path to the SQLite database file
    pub database_url: String,
    /// Port for the pledge ledger API
    pub api_port: u16,
    /// Spreadsheet / webhook endpoint (required for the webhook sink)
    pub webhook_url: Option<String>,
    /// Extra attempts after a retryable webhook failure
    pub webhook_max_retries: u32,
    /// How long the success message stays up before the form resets
    pub reset_delay: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup (the environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let sink: SinkKind = var("SINK", "sqlite").parse()?;
        let webhook_url = lookup("WEBHOOK_URL").filter(|u| !u.trim().is_empty());
        if sink == SinkKind::Webhook && webhook_url.is_none() {
            return Err(AppError::Config(
                "WEBHOOK_URL environment variable is required when SINK=webhook".to_string(),
            ));
        }

        Ok(Config {
            sink,
            database_url: var("DATABASE_URL", "sqlite:./faith_promise.db"),
            api_port: var("API_PORT", "3001")
                .parse()
                .map_err(|_| AppError::Config("Invalid API_PORT".to_string()))?,
            webhook_url,
            webhook_max_retries: var("WEBHOOK_MAX_RETRIES", "3")
                .parse()
                .map_err(|_| AppError::Config("Invalid WEBHOOK_MAX_RETRIES".to_string()))?,
            reset_delay: Duration::from_secs(
                var("RESET_DELAY_SECS", "5")
                    .parse()
                    .map_err(|_| AppError::Config("Invalid RESET_DELAY_SECS".to_string()))?,
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults() {
        let config = from_pairs(&[]).unwrap();
        assert_eq!(config.sink, SinkKind::Sqlite);
        assert_eq!(config.database_url, "sqlite:./faith_promise.db");
        assert_eq!(config.api_port, 3001);
        assert_eq!(config.webhook_max_retries, 3);
        assert_eq!(config.reset_delay, Duration::from_secs(5));
    }

    #[test]
    fn webhook_requires_url() {
        assert!(matches!(
            from_pairs(&[("SINK", "webhook")]),
            Err(AppError::Config(_))
        ));
        let config = from_pairs(&[("SINK", "Webhook"), ("WEBHOOK_URL", "https://x.test/hook")])
            .unwrap();
        assert_eq!(config.sink, SinkKind::Webhook);
        assert_eq!(config.webhook_url.as_deref(), Some("https://x.test/hook"));
    }

    #[test]
    fn invalid_values_are_config_errors() {
        for pairs in [
            [("SINK", "spreadsheet")],
            [("API_PORT", "http")],
            [("RESET_DELAY_SECS", "-1")],
            [("WEBHOOK_MAX_RETRIES", "many")],
        ] {
            assert!(matches!(from_pairs(&pairs), Err(AppError::Config(_))));
        }
    }
}
