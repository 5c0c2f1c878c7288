//! triage - Entry point for the batch email classifier

use anyhow::Context;
use std::path::Path;

use triage::config::{Settings, SETTINGS_FILE};
use triage::App;

#[tokio::main]
async fn main() {
    // Initialize logging; stdout carries the result echo
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting triage");

    if let Err(e) = run().await {
        tracing::error!("Application error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let settings = Settings::load_or_default(Path::new(SETTINGS_FILE))
        .context("failed to load settings")?;
    App::new(settings).run().await?;
    Ok(())
}
