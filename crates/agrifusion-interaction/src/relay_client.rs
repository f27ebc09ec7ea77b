//! RelayPredictionClient - HTTP client for the prediction relay.
//!
//! Posts the assembled request as JSON to the relay endpoint and classifies
//! whatever comes back into a prediction or a [`PredictionFailure`].
//! Configuration is taken from the `[relay]` table of config.toml.

use agrifusion_core::config::RelayConfig;
use agrifusion_core::error::{AgriError, Result};
use agrifusion_core::prediction::{
    PredictionFailure, PredictionOutcome, PredictionRequest, PredictionService, ServiceStatus,
    YieldPrediction,
};
use async_trait::async_trait;
use reqwest::{Client, Response, header::CONTENT_TYPE};
use std::time::Duration;

/// Longest response body kept for diagnostics.
const MAX_DIAGNOSTIC_BODY: usize = 2048;

/// Prediction service backed by the HTTP relay.
#[derive(Clone)]
pub struct RelayPredictionClient {
    client: Client,
    predict_url: String,
    status_url: Option<String>,
    timeout: Duration,
}

impl RelayPredictionClient {
    /// Creates a client for `predict_url` with the given request timeout.
    pub fn new(predict_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| AgriError::internal(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            predict_url: predict_url.into(),
            status_url: None,
            timeout,
        })
    }

    /// Builds a client from the `[relay]` configuration table.
    pub fn from_config(config: &RelayConfig) -> Result<Self> {
        config.validate()?;
        let client = Self::new(config.predict_url.trim(), config.timeout())?;
        Ok(match &config.status_url {
            Some(url) => client.with_status_url(url.trim()),
            None => client,
        })
    }

    /// Sets the backend health route queried by `status`.
    pub fn with_status_url(mut self, url: impl Into<String>) -> Self {
        self.status_url = Some(url.into());
        self
    }

    pub fn predict_url(&self) -> &str {
        &self.predict_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn send_request(&self, request: &PredictionRequest) -> PredictionOutcome {
        let body = request.to_json().map_err(|err| {
            PredictionFailure::transport(format!("Failed to serialize request: {err}"))
        })?;

        tracing::info!(
            "[Relay] POST {} ({} bytes, crop {})",
            self.predict_url,
            body.len(),
            request.soil_data().primary_crop
        );

        let response = self
            .client
            .post(&self.predict_url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|err| self.transport_failure("request", err))?;

        let response = check_status(response).await?;

        let text = response
            .text()
            .await
            .map_err(|err| self.transport_failure("response body", err))?;

        let prediction = YieldPrediction::from_body(&text).inspect_err(|failure| {
            tracing::warn!(
                "[Relay] Undecodable prediction body: {} (body: {})",
                failure,
                truncate_body(&text)
            );
        })?;

        tracing::info!(
            "[Relay] Predicted yield {} kg/ha",
            prediction.predicted_yield_kg_ha
        );
        Ok(prediction)
    }

    fn transport_failure(&self, stage: &str, err: reqwest::Error) -> PredictionFailure {
        let failure = if err.is_timeout() {
            PredictionFailure::timeout(self.timeout)
        } else if err.is_connect() {
            PredictionFailure::transport(format!("connection failed: {err}"))
        } else {
            PredictionFailure::transport(format!("{stage} failed: {err}"))
        };
        tracing::warn!("[Relay] Transport failure during {}: {}", stage, err);
        failure
    }
}

#[async_trait]
impl PredictionService for RelayPredictionClient {
    async fn submit(&self, request: &PredictionRequest) -> PredictionOutcome {
        self.send_request(request).await
    }

    async fn status(&self) -> std::result::Result<ServiceStatus, PredictionFailure> {
        let url = self.status_url.as_deref().ok_or_else(|| {
            PredictionFailure::transport("No status endpoint configured (relay.status_url)")
        })?;

        tracing::debug!("[Relay] GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| self.transport_failure("status request", err))?;

        let response = check_status(response).await?;

        let text = response
            .text()
            .await
            .map_err(|err| self.transport_failure("status body", err))?;

        serde_json::from_str(&text).map_err(|err| PredictionFailure::Decode {
            reason: format!("Failed to parse status response: {err}"),
        })
    }
}

/// Passes success responses through and turns anything else into a
/// [`PredictionFailure::Backend`], keeping the body for diagnostics.
async fn check_status(
    response: Response,
) -> std::result::Result<Response, PredictionFailure> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .ok()
        .filter(|text| !text.trim().is_empty())
        .map(|text| truncate_body(&text).to_string());

    tracing::warn!(
        "[Relay] Backend returned {} (body: {})",
        status,
        body.as_deref().unwrap_or("<empty>")
    );

    Err(PredictionFailure::Backend {
        status: status.as_u16(),
        body,
    })
}

fn truncate_body(text: &str) -> &str {
    if text.len() <= MAX_DIAGNOSTIC_BODY {
        return text;
    }
    let mut end = MAX_DIAGNOSTIC_BODY;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
