use std::path::PathBuf;

use thiserror::Error;

/// Error taxonomy for a sync run.
///
/// `Fetch`, `Parse`, `UnsupportedSchema`, and `Inventory` abort the run;
/// everything else is scoped to a single manifest entry or download task and
/// is logged and skipped by the caller.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The shared HTTP client could not be constructed.
    #[error("failed to initialize http client: {0}")]
    Client(#[source] reqwest::Error),

    /// The manifest could not be retrieved.
    #[error("failed to fetch manifest from {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The manifest body was not valid JSON.
    #[error("manifest from {url} is not valid JSON: {source}")]
    Parse {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// The manifest parsed, but no entry list could be located in it.
    #[error("unsupported manifest schema: expected an array or an object with an `images` or `promos` array")]
    UnsupportedSchema,

    /// A single manifest entry had an unrecognized shape.
    #[error("invalid manifest entry: {0}")]
    InvalidEntry(String),

    /// A `file_name` entry was seen but no base url is configured.
    #[error("entry `{file_name}` requires a base url, but none is configured")]
    MissingBaseUrl { file_name: String },

    /// A download attempt exceeded the configured timeout.
    #[error("download of `{filename}` timed out")]
    Timeout { filename: String },

    /// A download attempt failed at the network layer.
    #[error("download of `{filename}` failed: {source}")]
    Download {
        filename: String,
        #[source]
        source: reqwest::Error,
    },

    /// The remote answered a download request with a non-success status.
    #[error("download of `{filename}` failed with http status {status}")]
    DownloadStatus {
        filename: String,
        status: reqwest::StatusCode,
    },

    /// The downloaded body could not be written to disk.
    #[error("failed to write {path}: {source}")]
    DownloadIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The image directory could not be scanned.
    #[error(transparent)]
    Inventory(#[from] inventory::InventoryError),
}
