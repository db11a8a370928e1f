use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use webotron::cli::{run, Cli};

const DEFAULT_LOG_FILTER: &str = "warn,webotron=info,webotron_core=info";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Before parsing, so `.env` values feed the WEBOTRON_* flag fallbacks.
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout carries command output only.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();
    tracing::info!("CLI application startup: tracing initialised, environment loaded");

    let cli = Cli::parse();
    let result = run(cli).await;
    match &result {
        Ok(_) => tracing::info!("CLI completed successfully"),
        Err(e) => tracing::error!(error = %e, "CLI exited with error"),
    }
    result
}
