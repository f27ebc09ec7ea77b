//! Loads `config.toml` and layers environment overrides on top.

use agrifusion_core::config::AppConfig;
use agrifusion_core::error::{AgriError, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::paths::AgriPaths;

/// File-backed configuration service.
///
/// Resolution order: built-in defaults, then `config.toml`, then
/// `AGRIFUSION_*` environment variables. Command-line flags are applied by
/// the caller afterwards.
pub struct ConfigService {
    path: PathBuf,
}

impl ConfigService {
    /// Uses the platform config location (`~/.config/agrifusion/config.toml`).
    pub fn default_location() -> Result<Self> {
        let path = AgriPaths::config_file().map_err(|e| AgriError::config(e.to_string()))?;
        Ok(Self { path })
    }

    /// Uses an explicit config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the config file alone.
    ///
    /// A missing or empty file yields the defaults.
    pub fn load_file(&self) -> Result<AppConfig> {
        if !self.path.exists() {
            tracing::debug!(
                "[Config] No config file at {}, using defaults",
                self.path.display()
            );
            return Ok(AppConfig::default());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(AppConfig::default());
        }

        let config: AppConfig = toml::from_str(&content).map_err(|e| {
            AgriError::config(format!(
                "Failed to parse configuration file at {}: {}",
                self.path.display(),
                e
            ))
        })?;

        tracing::debug!("[Config] Loaded {}", self.path.display());
        Ok(config)
    }

    /// Reads the config file and applies overrides from `lookup`.
    pub fn load_with<F>(&self, lookup: F) -> Result<AppConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = self.load_file()?;
        config.apply_overrides(lookup)?;
        Ok(config)
    }

    /// Reads the config file and applies process environment overrides.
    pub fn load(&self) -> Result<AppConfig> {
        self.load_with(|key| std::env::var(key).ok())
    }

    /// Writes a config file holding the defaults, unless one already exists.
    ///
    /// Returns `true` if a file was created.
    pub fn write_default(&self) -> Result<bool> {
        if self.path.exists() {
            return Ok(false);
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(&AppConfig::default())
            .map_err(|e| AgriError::internal(format!("Failed to render default config: {e}")))?;
        fs::write(&self.path, content)?;

        tracing::info!("[Config] Created {}", self.path.display());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agrifusion_core::config::{DEFAULT_PREDICT_URL, ENV_PREDICT_URL};
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::with_path(temp_dir.path().join("config.toml"));

        let config = service.load_with(|_| None).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_empty_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "  \n").unwrap();

        let config = ConfigService::with_path(path).load_file().unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_file_values_then_overrides() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[relay]
predict_url = "http://relay.farm:3000/api/predict"
timeout_secs = 10

[logging]
level = "warn"
"#,
        )
        .unwrap();
        let service = ConfigService::with_path(path);

        let from_file = service.load_with(|_| None).unwrap();
        assert_eq!(from_file.relay.predict_url, "http://relay.farm:3000/api/predict");
        assert_eq!(from_file.relay.timeout_secs, 10);
        assert_eq!(from_file.logging.level, "warn");

        let overridden = service
            .load_with(|key| (key == ENV_PREDICT_URL).then(|| "http://other/api".to_string()))
            .unwrap();
        assert_eq!(overridden.relay.predict_url, "http://other/api");
        assert_eq!(overridden.relay.timeout_secs, 10);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[relay\npredict_url = 1").unwrap();

        let err = ConfigService::with_path(path).load_file().unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_write_default_creates_once() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");
        let service = ConfigService::with_path(&path);

        assert!(service.write_default().unwrap());
        assert!(!service.write_default().unwrap());

        let config = service.load_file().unwrap();
        assert_eq!(config.relay.predict_url, DEFAULT_PREDICT_URL);
    }
}
