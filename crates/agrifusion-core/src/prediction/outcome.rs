//! Results returned by the prediction service.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// The success body returned by the relay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YieldPrediction {
    pub predicted_yield_kg_ha: f64,
}

impl YieldPrediction {
    /// Parses a success body.
    ///
    /// A missing field, a non-numeric value, or a yield that is negative or
    /// not finite is a [`PredictionFailure::Decode`].
    pub fn from_body(body: &str) -> Result<Self, PredictionFailure> {
        let parsed: YieldPrediction =
            serde_json::from_str(body).map_err(|err| PredictionFailure::Decode {
                reason: err.to_string(),
            })?;

        let value = parsed.predicted_yield_kg_ha;
        if !value.is_finite() || value < 0.0 {
            return Err(PredictionFailure::Decode {
                reason: format!("predicted_yield_kg_ha out of range: {value}"),
            });
        }

        Ok(parsed)
    }
}

/// Why a submission did not produce a prediction.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PredictionFailure {
    /// No response reached the client.
    #[error("transport failure: {reason}")]
    Transport { reason: String },

    /// The relay answered with a non-success status.
    #[error("backend failure: HTTP {status}")]
    Backend {
        status: u16,
        /// Response body kept for diagnostics.
        #[serde(skip_serializing_if = "Option::is_none")]
        body: Option<String>,
    },

    /// A success status whose body is not a prediction.
    #[error("decode failure: {reason}")]
    Decode { reason: String },
}

impl PredictionFailure {
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport {
            reason: reason.into(),
        }
    }

    pub fn timeout(limit: Duration) -> Self {
        Self::Transport {
            reason: format!("no response within {}s", limit.as_secs_f64()),
        }
    }

    /// The status code of a backend failure.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            PredictionFailure::Backend { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, PredictionFailure::Transport { .. })
    }

    /// The message shown to the user. Diagnostic detail stays in the logs.
    pub fn user_message(&self) -> &'static str {
        match self {
            PredictionFailure::Transport { .. } => {
                "Could not reach the prediction service. Check your connection and try again."
            }
            PredictionFailure::Backend { .. } => {
                "Something went wrong while analyzing your data. Please try again later."
            }
            PredictionFailure::Decode { .. } => {
                "The prediction service returned an unexpected response."
            }
        }
    }
}

/// The outcome of one submission.
pub type PredictionOutcome = Result<YieldPrediction, PredictionFailure>;

/// Health report from the inference backend's status route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub status: String,
    #[serde(default)]
    pub message: String,
}

impl ServiceStatus {
    pub fn is_online(&self) -> bool {
        self.status.eq_ignore_ascii_case("online")
    }
}
