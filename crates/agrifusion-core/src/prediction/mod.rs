//! The prediction request pipeline: request assembly, outcomes, lifecycle.

pub mod outcome;
pub mod request;
pub mod service;
pub mod state;

pub use outcome::{PredictionFailure, PredictionOutcome, ServiceStatus, YieldPrediction};
pub use request::{PredictionRequest, SoilData, assemble_request, build_request};
pub use service::PredictionService;
pub use state::{
    PredictionPhase, PredictionStateMachine, SubmissionTicket, SubmitPreconditions,
    SubmitRejection,
};
