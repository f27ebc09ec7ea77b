//! Path management for agrifusion configuration files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/agrifusion/        # Config directory (platform default via `dirs`)
//! └── config.toml              # Relay endpoints, timeout, log level
//! ```

use std::path::PathBuf;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// The platform config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Path resolution for agrifusion.
pub struct AgriPaths;

impl AgriPaths {
    const APP_DIR: &'static str = "agrifusion";

    /// Returns the agrifusion configuration directory.
    ///
    /// # Returns
    ///
    /// - `Ok(PathBuf)`: Path to config directory (e.g., `~/.config/agrifusion/`)
    /// - `Err(PathError::ConfigDirNotFound)`: Could not determine directory
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(Self::APP_DIR))
            .ok_or(PathError::ConfigDirNotFound)
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_file_is_inside_config_dir() {
        // Skipped on hosts without a resolvable config directory.
        if let (Ok(dir), Ok(file)) = (AgriPaths::config_dir(), AgriPaths::config_file()) {
            assert!(file.starts_with(&dir));
            assert!(dir.ends_with("agrifusion"));
            assert_eq!(file.file_name().unwrap(), "config.toml");
        }
    }
}
