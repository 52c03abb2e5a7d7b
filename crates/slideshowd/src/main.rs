use anyhow::{Context, Result};
use clap::Parser;
use slideshowd::config::Config;
use slideshowd::{logging, web};
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(
    name = "slideshowd",
    version,
    about = "Serve the rotating image slideshow. Configured via IMAGE_DIR, \
             ALLOWED_EXTENSIONS, BIND_ADDRESS, and PORT."
)]
struct Args {}

#[tokio::main]
async fn main() {
    let Args {} = Args::parse();
    logging::init();

    if let Err(err) = try_main().await {
        error!(error = ?err, "slideshowd exited with error");
        std::process::exit(1);
    }
}

async fn try_main() -> Result<()> {
    let config = Config::from_env().context("invalid configuration")?;
    std::fs::create_dir_all(&config.image_dir).with_context(|| {
        format!(
            "failed to create image directory at {}",
            config.image_dir.display()
        )
    })?;
    info!(dir = %config.image_dir.display(), "serving images");
    web::serve(config).await
}
