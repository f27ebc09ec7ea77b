//! Prediction lifecycle state machine.
//!
//! ```text
//!            begin                complete(Ok)
//!   Idle ───────────▶ Submitting ─────────────▶ Succeeded
//!    ▲                  │   ▲                      │
//!    │ reset            │   │ begin                │
//!    │       complete(Err)  └──────────────────────┤
//!    │                  ▼                          │
//!    └────────────── Failed ◀──────────────────────┘
//! ```
//!
//! There is no terminal state. At most one submission is in flight: `begin`
//! while `Submitting` is rejected, and only the ticket issued by `begin` can
//! complete it.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::outcome::{PredictionFailure, PredictionOutcome};

/// What the interface currently shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum PredictionPhase {
    /// Waiting for input.
    Idle,
    /// A request is in flight.
    Submitting,
    /// The last submission produced a yield.
    Succeeded {
        yield_kg_ha: f64,
        completed_at: DateTime<Utc>,
    },
    /// The last submission failed.
    Failed {
        failure: PredictionFailure,
        completed_at: DateTime<Utc>,
    },
}

impl PredictionPhase {
    pub fn is_submitting(&self) -> bool {
        matches!(self, PredictionPhase::Submitting)
    }

    /// One line describing the phase for display.
    pub fn headline(&self) -> String {
        match self {
            PredictionPhase::Idle => "Awaiting data for yield prediction...".to_string(),
            PredictionPhase::Submitting => "Analyzing with Fusion AI...".to_string(),
            PredictionPhase::Succeeded { yield_kg_ha, .. } => {
                format!("Predicted yield: {yield_kg_ha} kg / hectare")
            }
            PredictionPhase::Failed { failure, .. } => failure.user_message().to_string(),
        }
    }
}

/// Input-side conditions for a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitPreconditions {
    /// Every soil field and the crop passed validation.
    pub form_valid: bool,
    /// An image is selected and passed encoding validation.
    pub image_ready: bool,
}

impl SubmitPreconditions {
    pub fn met(&self) -> bool {
        self.form_valid && self.image_ready
    }
}

/// Why `begin` did not start a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SubmitRejection {
    #[error("a prediction is already in progress")]
    AlreadySubmitting,
    #[error("no valid leaf image has been selected")]
    MissingImage,
    #[error("the soil form has invalid values")]
    InvalidForm,
}

/// Proof that a submission was started. Consumed when its outcome is applied.
#[derive(Debug, PartialEq, Eq)]
pub struct SubmissionTicket {
    id: Uuid,
}

impl SubmissionTicket {
    pub fn id(&self) -> Uuid {
        self.id
    }
}

/// The single owner of the prediction lifecycle.
#[derive(Debug, Clone)]
pub struct PredictionStateMachine {
    phase: PredictionPhase,
    in_flight: Option<Uuid>,
    completed: u64,
}

impl Default for PredictionStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl PredictionStateMachine {
    pub fn new() -> Self {
        Self {
            phase: PredictionPhase::Idle,
            in_flight: None,
            completed: 0,
        }
    }

    pub fn phase(&self) -> &PredictionPhase {
        &self.phase
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Number of outcomes applied since the session started.
    pub fn completed_submissions(&self) -> u64 {
        self.completed
    }

    pub fn can_submit(&self, preconditions: SubmitPreconditions) -> bool {
        preconditions.met() && !self.is_submitting()
    }

    /// `Idle | Succeeded | Failed → Submitting`.
    pub fn begin(
        &mut self,
        preconditions: SubmitPreconditions,
    ) -> Result<SubmissionTicket, SubmitRejection> {
        if self.is_submitting() {
            return Err(SubmitRejection::AlreadySubmitting);
        }
        if !preconditions.form_valid {
            return Err(SubmitRejection::InvalidForm);
        }
        if !preconditions.image_ready {
            return Err(SubmitRejection::MissingImage);
        }

        let id = Uuid::new_v4();
        self.in_flight = Some(id);
        self.phase = PredictionPhase::Submitting;
        Ok(SubmissionTicket { id })
    }

    /// `Submitting → Succeeded | Failed`.
    ///
    /// Returns `false` and leaves the state untouched if `ticket` is not the
    /// submission currently in flight.
    pub fn complete(&mut self, ticket: SubmissionTicket, outcome: PredictionOutcome) -> bool {
        if self.in_flight != Some(ticket.id) {
            tracing::warn!(
                "[StateMachine] Ignoring outcome for submission {} (not in flight)",
                ticket.id
            );
            return false;
        }

        let completed_at = Utc::now();
        self.phase = match outcome {
            Ok(prediction) => PredictionPhase::Succeeded {
                yield_kg_ha: prediction.predicted_yield_kg_ha,
                completed_at,
            },
            Err(failure) => PredictionPhase::Failed {
                failure,
                completed_at,
            },
        };
        self.in_flight = None;
        self.completed += 1;
        true
    }

    /// Returns to `Idle`, discarding the last outcome.
    ///
    /// In-flight submissions cannot be cancelled, so this is refused while
    /// `Submitting`.
    pub fn reset(&mut self) -> Result<(), SubmitRejection> {
        if self.is_submitting() {
            return Err(SubmitRejection::AlreadySubmitting);
        }
        self.phase = PredictionPhase::Idle;
        Ok(())
    }
}
