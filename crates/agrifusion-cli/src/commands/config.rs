use agrifusion_core::config::AppConfig;
use agrifusion_infrastructure::ConfigService;
use anyhow::{Context, Result};
use std::process::ExitCode;

pub fn run(service: &ConfigService, config: AppConfig, init: bool) -> Result<ExitCode> {
    if init {
        if service.write_default()? {
            println!("Created {}", service.path().display());
        } else {
            println!("{} already exists, left unchanged", service.path().display());
        }
    }

    println!("# {}", service.path().display());
    let rendered = toml::to_string_pretty(&config).context("Failed to render configuration")?;
    print!("{}", rendered);

    if let Err(err) = config.validate() {
        eprintln!("Configuration is invalid: {}", err);
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
