//! Prediction service trait.
//!
//! Implemented by the HTTP relay client; the session controller only sees
//! this trait.

use async_trait::async_trait;

use super::outcome::{PredictionFailure, PredictionOutcome, ServiceStatus};
use super::request::PredictionRequest;

/// A remote service that turns a request into a yield prediction.
#[async_trait]
pub trait PredictionService: Send + Sync {
    /// Sends one request. Implementations make exactly one attempt.
    async fn submit(&self, request: &PredictionRequest) -> PredictionOutcome;

    /// Queries the backend's health route.
    async fn status(&self) -> Result<ServiceStatus, PredictionFailure>;
}
