//! Application configuration model.
//!
//! Loaded from `config.toml` by the infrastructure layer; see
//! `agrifusion_infrastructure::ConfigService`.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{AgriError, Result};

pub const DEFAULT_PREDICT_URL: &str = "http://127.0.0.1:3000/api/predict";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LOG_LEVEL: &str = "info";

pub const ENV_PREDICT_URL: &str = "AGRIFUSION_PREDICT_URL";
pub const ENV_STATUS_URL: &str = "AGRIFUSION_STATUS_URL";
pub const ENV_TIMEOUT_SECS: &str = "AGRIFUSION_TIMEOUT_SECS";
pub const ENV_LOG: &str = "AGRIFUSION_LOG";

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where and how to reach the prediction relay.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    #[serde(default = "default_predict_url")]
    pub predict_url: String,
    /// Health route of the inference backend, if exposed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            predict_url: default_predict_url(),
            status_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl RelayConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The backend health route, or a config error naming where to set it.
    pub fn require_status_url(&self) -> Result<&str> {
        match self.status_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => Ok(url),
            _ => Err(AgriError::config(format!(
                "no status endpoint configured; set relay.status_url in config.toml or {ENV_STATUS_URL}"
            ))),
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_http_url("relay.predict_url", &self.predict_url)?;
        if let Some(status_url) = &self.status_url {
            check_http_url("relay.status_url", status_url)?;
        }
        if self.timeout_secs == 0 {
            return Err(AgriError::config("relay.timeout_secs must be at least 1"));
        }
        Ok(())
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// A `tracing` filter directive, e.g. `info` or `agrifusion_interaction=debug`.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// Applies `AGRIFUSION_*` overrides read through `lookup`.
    ///
    /// `lookup` is normally `std::env::var(..).ok()`; tests pass a map.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_PREDICT_URL) {
            self.relay.predict_url = url;
        }
        if let Some(url) = lookup(ENV_STATUS_URL) {
            self.relay.status_url = if url.trim().is_empty() {
                None
            } else {
                Some(url)
            };
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            self.relay.timeout_secs = raw.trim().parse().map_err(|_| {
                AgriError::config(format!("{ENV_TIMEOUT_SECS} must be a whole number, got '{raw}'"))
            })?;
        }
        if let Some(level) = lookup(ENV_LOG) {
            self.logging.level = level;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.relay.validate()
    }
}

fn check_http_url(name: &str, url: &str) -> Result<()> {
    let trimmed = url.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(())
    } else {
        Err(AgriError::config(format!(
            "{name} must be an http(s) URL, got '{url}'"
        )))
    }
}

fn default_predict_url() -> String {
    DEFAULT_PREDICT_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.relay.predict_url, DEFAULT_PREDICT_URL);
        assert_eq!(config.relay.timeout(), Duration::from_secs(30));
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [relay]
            status_url = "http://127.0.0.1:5001/"
            "#,
        )
        .unwrap();
        assert_eq!(config.relay.predict_url, DEFAULT_PREDICT_URL);
        assert_eq!(
            config.relay.status_url.as_deref(),
            Some("http://127.0.0.1:5001/")
        );
        assert_eq!(config.relay.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (ENV_PREDICT_URL, "https://relay.example/api/predict"),
            (ENV_TIMEOUT_SECS, " 5 "),
            (ENV_LOG, "debug"),
        ]);
        let mut config = AppConfig::default();
        config
            .apply_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.relay.predict_url, "https://relay.example/api/predict");
        assert_eq!(config.relay.timeout_secs, 5);
        assert_eq!(config.logging.level, "debug");
        assert!(config.relay.status_url.is_none());
    }

    #[test]
    fn test_bad_timeout_override() {
        let mut config = AppConfig::default();
        let err = config
            .apply_overrides(|key| (key == ENV_TIMEOUT_SECS).then(|| "soon".to_string()))
            .unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_validation() {
        let mut config = AppConfig::default();
        config.relay.predict_url = "ftp://relay".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.relay.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.relay.status_url = Some("localhost:5001".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_status_url_is_config_error() {
        let relay = RelayConfig::default();
        let err = relay.require_status_url().unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("relay.status_url"));
        assert!(err.to_string().contains(ENV_STATUS_URL));

        let relay = RelayConfig {
            status_url: Some("  ".to_string()),
            ..RelayConfig::default()
        };
        assert!(relay.require_status_url().is_err());

        let relay = RelayConfig {
            status_url: Some("http://127.0.0.1:5001/".to_string()),
            ..RelayConfig::default()
        };
        assert_eq!(relay.require_status_url().unwrap(), "http://127.0.0.1:5001/");
    }
}
