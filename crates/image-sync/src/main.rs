use anyhow::{Context, Result};
use clap::Parser;
use image_sync::config::Config;
use image_sync::sync;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "image-sync",
    version,
    about = "Synchronize the slideshow image directory with a remote JSON manifest. \
             Configured via JSON_URL, BASE_URL, IMAGE_DIR, DOWNLOAD_TIMEOUT, \
             DOWNLOAD_RETRIES, and ALLOWED_EXTENSIONS."
)]
struct Args {}

#[tokio::main]
async fn main() {
    let Args {} = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    if let Err(err) = try_main().await {
        error!(error = ?err, "image sync failed");
        std::process::exit(1);
    }
}

async fn try_main() -> Result<()> {
    let config = Config::from_env().context("invalid configuration")?;
    let report = sync::run(&config).await.context("sync run failed")?;
    info!(
        downloaded = report.downloaded,
        abandoned = report.abandoned,
        skipped = report.skipped,
        removed = report.removed,
        remove_failures = report.remove_failures,
        "sync completed"
    );
    Ok(())
}
