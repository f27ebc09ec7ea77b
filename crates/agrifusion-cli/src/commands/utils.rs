use agrifusion_infrastructure::ConfigService;
use anyhow::{Context, Result};
use std::path::Path;

/// Resolves the config file location: an explicit `--config` path, or the
/// platform config directory.
pub fn config_service(path: Option<&Path>) -> Result<ConfigService> {
    match path {
        Some(path) => Ok(ConfigService::with_path(path)),
        None => ConfigService::default_location().context("Failed to locate config directory"),
    }
}
