use agrifusion_core::config::AppConfig;
use agrifusion_core::prediction::PredictionService;
use agrifusion_interaction::RelayPredictionClient;
use anyhow::Result;
use std::process::ExitCode;

pub async fn run(config: AppConfig) -> Result<ExitCode> {
    config.relay.require_status_url()?;
    let client = RelayPredictionClient::from_config(&config.relay)?;

    match client.status().await {
        Ok(status) => {
            println!("{}: {}", status.status, status.message);
            Ok(if status.is_online() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Err(failure) => {
            tracing::warn!("[Status] Check failed: {}", failure);
            eprintln!("{}", failure.user_message());
            Ok(ExitCode::FAILURE)
        }
    }
}
