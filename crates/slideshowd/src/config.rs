use std::path::PathBuf;

use anyhow::{Context, Result};
use inventory::AllowedExtensions;

/// Server configuration, sourced from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory served under `/images/` and listed by `/api/images`.
    pub image_dir: PathBuf,
    /// Extensions that count as images in the listing.
    pub allowed_extensions: AllowedExtensions,
    pub bind_address: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_source(&|key| std::env::var(key).ok())
    }

    pub fn from_source(source: &dyn Fn(&str) -> Option<String>) -> Result<Self> {
        let image_dir = source("IMAGE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_image_dir);
        let allowed_extensions = source("ALLOWED_EXTENSIONS")
            .map(|spec| AllowedExtensions::parse(&spec))
            .unwrap_or_default();
        let bind_address = source("BIND_ADDRESS").unwrap_or_else(default_bind_address);
        let port = match source("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .context("PORT must be a port number")?,
            None => default_port(),
        };

        Ok(Self {
            image_dir,
            allowed_extensions,
            bind_address,
            port,
        })
    }
}

fn default_image_dir() -> PathBuf {
    PathBuf::from("public/images")
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}
