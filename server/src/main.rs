use aggregator::{Aggregator, UpstreamConfig};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod api;
mod config;

use config::Config;

/// MapleStory M character viewer backend: aggregates the Nexon Open API's
/// per-section character endpoints into one document per character.
#[derive(Parser)]
struct Cli {
    /// Path to a YAML config file; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(thiserror::Error, Debug)]
enum ServerError {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("NEXON API key missing: set NXOPEN_API_KEY or MAPLE_M_API_KEY")]
    MissingApiKey,
    #[error("upstream client setup failed: {0}")]
    Upstream(#[from] aggregator::UpstreamError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    // The API key is a startup requirement, not a per-request concern.
    let api_key = std::env::var("NXOPEN_API_KEY")
        .or_else(|_| std::env::var("MAPLE_M_API_KEY"))
        .map_err(|_| ServerError::MissingApiKey)?;

    let aggregator = Aggregator::new(UpstreamConfig::new(api_key))?;

    tracing::info!(
        host = %config.listener.host,
        port = config.listener.port,
        "starting character aggregation server"
    );
    api::serve(config.listener, aggregator).await?;

    Ok(())
}
