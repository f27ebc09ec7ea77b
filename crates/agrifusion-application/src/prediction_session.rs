//! Prediction session controller.
//!
//! `PredictionSession` is the only owner of the form values, the selected
//! image and the prediction state machine. Callers hand it new values and read
//! back copies; nothing else mutates session state.

use agrifusion_core::environment::EnvironmentalSource;
use agrifusion_core::image::{EncodedImage, ImageAsset, encode_image};
use agrifusion_core::prediction::{
    PredictionFailure, PredictionOutcome, PredictionPhase, PredictionService,
    PredictionStateMachine, ServiceStatus, SubmissionTicket, SubmitPreconditions, SubmitRejection,
    assemble_request,
};
use agrifusion_core::soil::{self, Crop, SoilSample};
use agrifusion_core::validation::{ValidationErrors, ValidationFailure};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;

/// What a call to [`PredictionSession::submit`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitResult {
    /// The request was sent and its outcome applied.
    Completed(PredictionPhase),
    /// The state machine refused to start a submission.
    Rejected(SubmitRejection),
    /// Local validation failed; nothing was sent.
    Invalid(ValidationErrors),
}

struct SessionInner {
    sample: SoilSample,
    image: Option<EncodedImage>,
    machine: PredictionStateMachine,
}

/// Session controller for the prediction pipeline.
///
/// # Concurrency
///
/// The state lock is held only while reading inputs and applying
/// transitions, never across an `.await`, so observers can see `Submitting`
/// while a request is in flight. A `submit` that arrives during that window
/// is rejected without contacting the service.
///
/// A `submit` future dropped before the service answers still completes its
/// submission, as `Failed(Transport)`, so the session never stays in
/// `Submitting`.
pub struct PredictionSession {
    service: Arc<dyn PredictionService>,
    environment: Arc<dyn EnvironmentalSource>,
    timeout: Duration,
    inner: Mutex<SessionInner>,
    phase_tx: watch::Sender<PredictionPhase>,
}

impl PredictionSession {
    /// Creates a session with default form values and no image.
    ///
    /// # Arguments
    ///
    /// * `service` - Where requests are sent
    /// * `environment` - Producer of the environmental series for each request
    /// * `timeout` - Upper bound on a single submission
    pub fn new(
        service: Arc<dyn PredictionService>,
        environment: Arc<dyn EnvironmentalSource>,
        timeout: Duration,
    ) -> Self {
        let machine = PredictionStateMachine::new();
        let (phase_tx, _) = watch::channel(machine.phase().clone());

        Self {
            service,
            environment,
            timeout,
            inner: Mutex::new(SessionInner {
                sample: SoilSample::default(),
                image: None,
                machine,
            }),
            phase_tx,
        }
    }

    /// Receives every phase change from now on.
    pub fn subscribe(&self) -> watch::Receiver<PredictionPhase> {
        self.phase_tx.subscribe()
    }

    pub async fn phase(&self) -> PredictionPhase {
        self.state().machine.phase().clone()
    }

    pub async fn completed_submissions(&self) -> u64 {
        self.state().machine.completed_submissions()
    }

    pub async fn sample(&self) -> SoilSample {
        self.state().sample.clone()
    }

    /// Replaces the form values and reports whether they are acceptable.
    pub async fn update_sample(&self, sample: SoilSample) -> Result<Crop, ValidationErrors> {
        let result = soil::validate(&sample);
        self.state().sample = sample;
        result
    }

    /// Validates and encodes a newly selected image.
    ///
    /// A valid image replaces the previous one. An invalid image is rejected
    /// and the previous selection, if any, is kept.
    pub async fn select_image(&self, asset: ImageAsset) -> Result<(), ValidationFailure> {
        match encode_image(&asset) {
            Ok(encoded) => {
                tracing::info!(
                    "[Session] Selected {} image ({} bytes)",
                    encoded.format().mime_type(),
                    asset.bytes.len()
                );
                self.state().image = Some(encoded);
                Ok(())
            }
            Err(failure) => {
                tracing::info!("[Session] Rejected image: {}", failure);
                Err(failure)
            }
        }
    }

    pub async fn clear_image(&self) {
        self.state().image = None;
    }

    pub async fn has_image(&self) -> bool {
        self.state().image.is_some()
    }

    /// A data URI for showing the selected image.
    pub async fn image_preview(&self) -> Option<String> {
        self.state()
            .image
            .as_ref()
            .map(EncodedImage::preview_data_uri)
    }

    pub async fn can_submit(&self) -> bool {
        let inner = self.state();
        inner.machine.can_submit(preconditions(&inner))
    }

    /// Builds a request from the current inputs, sends it, and applies the
    /// outcome.
    pub async fn submit(&self) -> SubmitResult {
        let (ticket, request) = {
            let mut inner = self.state();

            if inner.machine.is_submitting() {
                tracing::debug!("[Session] Submit ignored, a prediction is in flight");
                return SubmitResult::Rejected(SubmitRejection::AlreadySubmitting);
            }

            let Some(image) = inner.image.as_ref() else {
                return SubmitResult::Rejected(SubmitRejection::MissingImage);
            };

            let series = self.environment.series();
            let request = match assemble_request(&inner.sample, image, &series) {
                Ok(request) => request,
                Err(errors) => {
                    tracing::info!("[Session] Submission blocked: {}", errors);
                    return SubmitResult::Invalid(errors);
                }
            };

            let ready = preconditions(&inner);
            let ticket = match inner.machine.begin(ready) {
                Ok(ticket) => ticket,
                Err(rejection) => return SubmitResult::Rejected(rejection),
            };
            self.publish(&inner.machine);
            (ticket, request)
        };

        let submission_id = ticket.id();
        tracing::info!("[Session] Submission {} started", submission_id);
        let in_flight = InFlight {
            session: self,
            ticket: Some(ticket),
        };

        let outcome = match tokio::time::timeout(self.timeout, self.service.submit(&request)).await
        {
            Ok(outcome) => outcome,
            Err(_) => Err(PredictionFailure::timeout(self.timeout)),
        };

        match &outcome {
            Ok(prediction) => tracing::info!(
                "[Session] Submission {} succeeded: {} kg/ha",
                submission_id,
                prediction.predicted_yield_kg_ha
            ),
            Err(failure) => {
                tracing::warn!("[Session] Submission {} failed: {}", submission_id, failure);
                if let PredictionFailure::Backend {
                    body: Some(body), ..
                } = failure
                {
                    tracing::debug!("[Session] Backend body for {}: {}", submission_id, body);
                }
            }
        }

        SubmitResult::Completed(in_flight.finish(outcome))
    }

    /// Restores default form values, discards the image and returns to
    /// `Idle`. Refused while a submission is in flight.
    pub async fn reset(&self) -> Result<(), SubmitRejection> {
        let mut inner = self.state();
        inner.machine.reset()?;
        inner.sample = SoilSample::default();
        inner.image = None;
        self.publish(&inner.machine);
        Ok(())
    }

    /// Asks the backend whether it is up, bounded by the session timeout.
    pub async fn check_status(&self) -> Result<ServiceStatus, PredictionFailure> {
        match tokio::time::timeout(self.timeout, self.service.status()).await {
            Ok(result) => result,
            Err(_) => Err(PredictionFailure::timeout(self.timeout)),
        }
    }

    fn publish(&self, machine: &PredictionStateMachine) {
        self.phase_tx.send_replace(machine.phase().clone());
    }

    /// Locks session state. Never held across an `.await`; poisoning is
    /// ignored.
    fn state(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn complete(&self, ticket: SubmissionTicket, outcome: PredictionOutcome) -> PredictionPhase {
        let mut inner = self.state();
        inner.machine.complete(ticket, outcome);
        self.publish(&inner.machine);
        inner.machine.phase().clone()
    }
}

/// Owns the ticket of the submission in flight. Dropping it without
/// `finish` completes the submission as abandoned.
struct InFlight<'a> {
    session: &'a PredictionSession,
    ticket: Option<SubmissionTicket>,
}

impl InFlight<'_> {
    fn finish(mut self, outcome: PredictionOutcome) -> PredictionPhase {
        match self.ticket.take() {
            Some(ticket) => self.session.complete(ticket, outcome),
            None => self.session.state().machine.phase().clone(),
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            tracing::warn!(
                "[Session] Submission {} abandoned before a response arrived",
                ticket.id()
            );
            self.session.complete(
                ticket,
                Err(PredictionFailure::transport(
                    "submission abandoned before a response arrived",
                )),
            );
        }
    }
}

fn preconditions(inner: &SessionInner) -> SubmitPreconditions {
    SubmitPreconditions {
        form_valid: soil::validate(&inner.sample).is_ok(),
        image_ready: inner.image.is_some(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agrifusion_core::environment::SyntheticEnvironment;
    use agrifusion_core::prediction::{PredictionOutcome, PredictionRequest, YieldPrediction};
    use agrifusion_core::soil::SoilField;

    struct FixedService(PredictionOutcome);

    #[async_trait::async_trait]
    impl PredictionService for FixedService {
        async fn submit(&self, _request: &PredictionRequest) -> PredictionOutcome {
            self.0.clone()
        }

        async fn status(&self) -> Result<ServiceStatus, PredictionFailure> {
            Ok(ServiceStatus {
                status: "online".to_string(),
                message: String::new(),
            })
        }
    }

    fn session(outcome: PredictionOutcome) -> PredictionSession {
        PredictionSession::new(
            Arc::new(FixedService(outcome)),
            Arc::new(SyntheticEnvironment::default()),
            Duration::from_secs(5),
        )
    }

    fn png() -> ImageAsset {
        ImageAsset::new(vec![0x89, b'P', b'N', b'G'], "image/png")
    }

    #[tokio::test]
    async fn test_update_sample_reports_validation() {
        let session = session(Ok(YieldPrediction {
            predicted_yield_kg_ha: 1.0,
        }));

        let bad = SoilSample::default().with_value(SoilField::Potassium, -2.0);
        assert!(session.update_sample(bad.clone()).await.is_err());
        assert_eq!(session.sample().await, bad);
        assert!(session.update_sample(SoilSample::default()).await.is_ok());
    }

    #[tokio::test]
    async fn test_invalid_image_keeps_previous_selection() {
        let session = session(Ok(YieldPrediction {
            predicted_yield_kg_ha: 1.0,
        }));
        session.select_image(png()).await.unwrap();
        let preview = session.image_preview().await.unwrap();

        let gif = ImageAsset::new(b"GIF89a".to_vec(), "image/gif");
        assert!(session.select_image(gif).await.is_err());
        assert_eq!(session.image_preview().await, Some(preview));
    }

    #[tokio::test]
    async fn test_reset_restores_defaults() {
        let session = session(Ok(YieldPrediction {
            predicted_yield_kg_ha: 42.0,
        }));
        session
            .update_sample(SoilSample::default().with_crop("Arecanut"))
            .await
            .unwrap();
        session.select_image(png()).await.unwrap();
        session.submit().await;

        session.reset().await.unwrap();

        assert_eq!(session.phase().await, PredictionPhase::Idle);
        assert_eq!(session.sample().await, SoilSample::default());
        assert!(!session.has_image().await);
        assert!(!session.can_submit().await);
    }

    #[tokio::test]
    async fn test_clear_image_blocks_submission() {
        let session = session(Ok(YieldPrediction {
            predicted_yield_kg_ha: 42.0,
        }));
        session.select_image(png()).await.unwrap();
        assert!(session.can_submit().await);

        session.clear_image().await;
        assert!(!session.can_submit().await);
        assert_eq!(
            session.submit().await,
            SubmitResult::Rejected(SubmitRejection::MissingImage)
        );
    }

    #[tokio::test]
    async fn test_check_status_passthrough() {
        let session = session(Ok(YieldPrediction {
            predicted_yield_kg_ha: 42.0,
        }));
        assert!(session.check_status().await.unwrap().is_online());
    }
}
