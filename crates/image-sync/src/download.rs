//! Sequential download executor with bounded retry.

use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::Client;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::error::SyncError;
use crate::sync::DownloadTask;

/// Fixed pause between attempts at the same task.
const RETRY_DELAY: Duration = Duration::from_secs(1);

pub struct Downloader {
    client: Client,
    max_attempts: u32,
}

impl Downloader {
    pub fn new(client: Client, max_attempts: u32) -> Self {
        Self {
            client,
            max_attempts,
        }
    }

    /// Run a task to completion, retrying failed attempts. Returns `true`
    /// once the file is on disk, `false` if every attempt failed; in the
    /// latter case no partial file is left behind and the task will come
    /// around again on the next sync run.
    pub async fn fetch(&self, task: &DownloadTask) -> bool {
        for attempt in 1..=self.max_attempts {
            debug!(filename = %task.filename, attempt, "starting download attempt");
            match self.fetch_once(task).await {
                Ok(()) => {
                    info!(filename = %task.filename, url = %task.url, "downloaded");
                    return true;
                }
                Err(err) => {
                    warn!(
                        filename = %task.filename,
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %err,
                        "download attempt failed"
                    );
                    if attempt < self.max_attempts {
                        sleep(RETRY_DELAY).await;
                    }
                }
            }
        }
        error!(
            filename = %task.filename,
            attempts = self.max_attempts,
            "giving up on download"
        );
        false
    }

    async fn fetch_once(&self, task: &DownloadTask) -> Result<(), SyncError> {
        let result = self.stream_to_disk(task).await;
        if result.is_err() {
            remove_partial(&task.destination).await;
        }
        result
    }

    async fn stream_to_disk(&self, task: &DownloadTask) -> Result<(), SyncError> {
        let response = self
            .client
            .get(&task.url)
            .send()
            .await
            .map_err(|source| classify_network_error(&task.filename, source))?;
        if !response.status().is_success() {
            return Err(SyncError::DownloadStatus {
                filename: task.filename.clone(),
                status: response.status(),
            });
        }

        let mut file = File::create(&task.destination)
            .await
            .map_err(|source| SyncError::DownloadIo {
                path: task.destination.clone(),
                source,
            })?;
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|source| classify_network_error(&task.filename, source))?;
            file.write_all(&chunk)
                .await
                .map_err(|source| SyncError::DownloadIo {
                    path: task.destination.clone(),
                    source,
                })?;
        }
        file.flush().await.map_err(|source| SyncError::DownloadIo {
            path: task.destination.clone(),
            source,
        })?;
        Ok(())
    }
}

fn classify_network_error(filename: &str, source: reqwest::Error) -> SyncError {
    if source.is_timeout() {
        SyncError::Timeout {
            filename: filename.to_string(),
        }
    } else {
        SyncError::Download {
            filename: filename.to_string(),
            source,
        }
    }
}

/// Drop whatever a failed attempt managed to write. Nothing written is fine;
/// any other failure is logged and the retry proceeds regardless.
async fn remove_partial(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!(path = %path.display(), "removed partial download"),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => warn!(path = %path.display(), error = %err, "failed to remove partial download"),
    }
}
