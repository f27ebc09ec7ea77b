use agrifusion_application::{PredictionSession, SubmitResult};
use agrifusion_core::config::{AppConfig, RelayConfig};
use agrifusion_core::environment::{EnvironmentalSource, SyntheticEnvironment};
use agrifusion_core::prediction::PredictionPhase;
use agrifusion_core::soil::SoilSample;
use agrifusion_core::validation::ValidationFailure;
use agrifusion_infrastructure::{load_image, load_series};
use agrifusion_interaction::RelayPredictionClient;
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

/// Inputs for one prediction. Omitted soil values fall back to the form
/// defaults.
#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Leaf image (PNG or JPEG, at most 10 MiB)
    #[arg(long, value_name = "PATH")]
    pub image: PathBuf,

    /// Primary crop: Banana, Arecanut or Black Pepper
    #[arg(long)]
    pub crop: Option<String>,

    /// Nitrogen (kg/ha)
    #[arg(long, allow_negative_numbers = true)]
    pub nitrogen: Option<f64>,

    /// Phosphorus (kg/ha)
    #[arg(long, allow_negative_numbers = true)]
    pub phosphorus: Option<f64>,

    /// Potassium (kg/ha)
    #[arg(long, allow_negative_numbers = true)]
    pub potassium: Option<f64>,

    /// Organic carbon (%)
    #[arg(long, allow_negative_numbers = true)]
    pub organic_carbon: Option<f64>,

    /// Trichoderma count (CFU/g)
    #[arg(long, allow_negative_numbers = true)]
    pub trichoderma: Option<f64>,

    /// Pseudomonas count (CFU/g)
    #[arg(long, allow_negative_numbers = true)]
    pub pseudomonas: Option<f64>,

    /// JSON file with 168 hourly [temperature, humidity, soil moisture, pH] readings
    #[arg(long, value_name = "PATH")]
    pub environment: Option<PathBuf>,

    /// Relay endpoint, overriding the configuration
    #[arg(long, value_name = "URL")]
    pub predict_url: Option<String>,

    /// Request timeout in seconds, overriding the configuration
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Print the final state as JSON
    #[arg(long)]
    pub json: bool,
}

impl PredictArgs {
    /// The form values after applying any flags over the defaults.
    pub fn sample(&self) -> SoilSample {
        let defaults = SoilSample::default();
        SoilSample {
            crop: self.crop.clone().unwrap_or(defaults.crop),
            nitrogen_kg_ha: self.nitrogen.unwrap_or(defaults.nitrogen_kg_ha),
            phosphorus_kg_ha: self.phosphorus.unwrap_or(defaults.phosphorus_kg_ha),
            potassium_kg_ha: self.potassium.unwrap_or(defaults.potassium_kg_ha),
            organic_carbon_percent: self
                .organic_carbon
                .unwrap_or(defaults.organic_carbon_percent),
            microbe_trichoderma_cfu_g: self
                .trichoderma
                .unwrap_or(defaults.microbe_trichoderma_cfu_g),
            microbe_pseudomonas_cfu_g: self
                .pseudomonas
                .unwrap_or(defaults.microbe_pseudomonas_cfu_g),
        }
    }

    /// The relay settings after applying command-line overrides.
    pub fn relay(&self, base: &RelayConfig) -> RelayConfig {
        let mut relay = base.clone();
        if let Some(url) = &self.predict_url {
            relay.predict_url = url.clone();
        }
        if let Some(secs) = self.timeout_secs {
            relay.timeout_secs = secs;
        }
        relay
    }
}

pub async fn run(args: PredictArgs, config: AppConfig) -> Result<ExitCode> {
    let relay = args.relay(&config.relay);
    let client = RelayPredictionClient::from_config(&relay)?;

    let environment: Arc<dyn EnvironmentalSource> = match &args.environment {
        Some(path) => Arc::new(
            load_series(path)
                .await
                .with_context(|| format!("Failed to read environmental data from {}", path.display()))?,
        ),
        None => Arc::new(SyntheticEnvironment::default()),
    };

    let session = PredictionSession::new(Arc::new(client), environment, relay.timeout());

    let mut failures: Vec<ValidationFailure> = Vec::new();

    if let Err(errors) = session.update_sample(args.sample()).await {
        failures.extend(errors);
    }

    let asset = load_image(&args.image)
        .await
        .with_context(|| format!("Failed to read image {}", args.image.display()))?;
    if let Err(failure) = session.select_image(asset).await {
        failures.push(failure);
    }

    if !failures.is_empty() {
        report_invalid(&failures);
        return Ok(ExitCode::FAILURE);
    }

    println!("{}", PredictionPhase::Submitting.headline());

    match session.submit().await {
        SubmitResult::Completed(phase) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&phase)?);
            } else {
                println!("{}", phase.headline());
            }
            Ok(match phase {
                PredictionPhase::Succeeded { .. } => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            })
        }
        SubmitResult::Rejected(rejection) => {
            eprintln!("{}", rejection);
            Ok(ExitCode::FAILURE)
        }
        SubmitResult::Invalid(errors) => {
            report_invalid(&errors.into_vec());
            Ok(ExitCode::FAILURE)
        }
    }
}

fn report_invalid(failures: &[ValidationFailure]) {
    for failure in failures {
        eprintln!("{}", failure.user_message());
    }
}
