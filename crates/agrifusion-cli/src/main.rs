use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "agrifusion")]
#[command(about = "AgriFusion - crop yield prediction from soil data and a leaf image", long_about = None)]
struct Cli {
    /// Path to config.toml (defaults to the platform config directory)
    #[arg(long = "config", global = true, value_name = "PATH")]
    config_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit soil data and a leaf image for a yield prediction
    Predict(commands::predict::PredictArgs),
    /// Ask the inference backend whether it is up
    Status,
    /// List the accepted crops
    Crops,
    /// Print the resolved configuration
    Config {
        /// Write a config file with default values if none exists
        #[arg(long)]
        init: bool,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let service = commands::utils::config_service(cli.config_path.as_deref())?;
    let config = service.load().context("Failed to load configuration")?;
    init_logging(&config.logging.level);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    match cli.command {
        Commands::Predict(args) => runtime.block_on(commands::predict::run(args, config)),
        Commands::Status => runtime.block_on(commands::status::run(config)),
        Commands::Crops => commands::crops::run(),
        Commands::Config { init } => commands::config::run(&service, config, init),
    }
}

/// Installs the stderr subscriber. `level` already carries `AGRIFUSION_LOG`
/// when set; an unparseable directive falls back to `info`.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
