pub mod prediction_session;

pub use prediction_session::{PredictionSession, SubmitResult};
