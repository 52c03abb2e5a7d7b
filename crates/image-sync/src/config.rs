use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use inventory::AllowedExtensions;

/// Runtime configuration for a sync run, sourced from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the JSON manifest describing the expected images.
    pub json_url: String,
    /// Base url for manifest entries that only carry a `file_name`.
    pub base_url: Option<String>,
    /// Directory the slideshow serves images from.
    pub image_dir: PathBuf,
    /// Timeout applied to the manifest fetch and to each download attempt.
    pub timeout: Duration,
    /// Maximum attempts per download task.
    pub retries: u32,
    /// Extensions that count as images when scanning the directory.
    pub allowed_extensions: AllowedExtensions,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_source(&|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup. `from_env` is
    /// the only production caller; tests feed in maps.
    pub fn from_source(source: &dyn Fn(&str) -> Option<String>) -> Result<Self> {
        let json_url = source("JSON_URL")
            .filter(|url| !url.trim().is_empty())
            .context("JSON_URL must be set to the manifest url")?;
        let base_url = source("BASE_URL").filter(|url| !url.trim().is_empty());
        let image_dir = source("IMAGE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_image_dir);
        let timeout = match source("DOWNLOAD_TIMEOUT") {
            Some(raw) => Duration::from_millis(
                raw.trim()
                    .parse::<u64>()
                    .context("DOWNLOAD_TIMEOUT must be a number of milliseconds")?,
            ),
            None => default_timeout(),
        };
        let retries = match source("DOWNLOAD_RETRIES") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .context("DOWNLOAD_RETRIES must be a non-negative integer")?,
            None => default_retries(),
        };
        if retries == 0 {
            bail!("DOWNLOAD_RETRIES must allow at least one attempt");
        }
        let allowed_extensions = source("ALLOWED_EXTENSIONS")
            .map(|spec| AllowedExtensions::parse(&spec))
            .unwrap_or_default();

        Ok(Self {
            json_url,
            base_url,
            image_dir,
            timeout,
            retries,
            allowed_extensions,
        })
    }
}

fn default_image_dir() -> PathBuf {
    PathBuf::from("public/images")
}

fn default_timeout() -> Duration {
    Duration::from_millis(30_000)
}

fn default_retries() -> u32 {
    3
}
