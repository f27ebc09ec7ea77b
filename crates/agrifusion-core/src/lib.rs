pub mod config;
pub mod environment;
pub mod error;
pub mod image;
pub mod prediction;
pub mod soil;
pub mod validation;

// Re-export common error type
pub use error::AgriError;
