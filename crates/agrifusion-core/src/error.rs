//! Error types for the AgriFusion client.
//!
//! Pipeline failures (validation and prediction) have their own taxonomies in
//! [`crate::validation`] and [`crate::prediction`]. `AgriError` covers the
//! ambient concerns around them: configuration, file access and
//! serialization.

use thiserror::Error;

/// A shared error type for the non-pipeline parts of the client.
#[derive(Error, Debug)]
pub enum AgriError {
    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON"
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AgriError {
    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this is a config error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for AgriError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for AgriError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for AgriError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, AgriError>`.
pub type Result<T> = std::result::Result<T, AgriError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_conversion_keeps_kind() {
        let err: AgriError =
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing leaf.jpg").into();
        let text = err.to_string();
        assert!(text.contains("missing leaf.jpg"));
        assert!(text.contains("NotFound"));
    }

    #[test]
    fn test_toml_conversion() {
        let parse_err = toml::from_str::<toml::Value>("relay = [").unwrap_err();
        let err: AgriError = parse_err.into();
        assert!(matches!(err, AgriError::Serialization { ref format, .. } if format == "TOML"));
    }

    #[test]
    fn test_config_helper() {
        let err = AgriError::config("relay.timeout_secs must be at least 1");
        assert!(err.is_config());
        assert_eq!(
            err.to_string(),
            "Configuration error: relay.timeout_secs must be at least 1"
        );
    }
}
