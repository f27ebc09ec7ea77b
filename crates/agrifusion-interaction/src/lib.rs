//! Network-facing implementations of the prediction service.

pub mod relay_client;

pub use relay_client::RelayPredictionClient;
