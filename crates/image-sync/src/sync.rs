//! Reconciliation between the manifest's expected set and the directory's
//! present set, and the end-to-end sync run built on top of it.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{info, warn};

use crate::config::Config;
use crate::download::Downloader;
use crate::error::SyncError;
use crate::manifest;

/// One missing image to download into the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    pub url: String,
    pub filename: String,
    pub destination: PathBuf,
}

/// Outcome of diffing expected against present filenames. Deletion is
/// computed against the present-set snapshot taken before any download ran,
/// so a failed download never widens the removal set.
#[derive(Debug, Default)]
pub struct SyncPlan {
    pub to_download: Vec<DownloadTask>,
    pub to_remove: Vec<String>,
    /// Manifest entries that could not be normalized and were skipped.
    pub skipped: usize,
}

/// Counters for the run summary. A run with skips or abandoned downloads
/// still counts as a completed run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub downloaded: usize,
    pub abandoned: usize,
    pub skipped: usize,
    pub removed: usize,
    pub remove_failures: usize,
}

/// Diff manifest entries against the present filename snapshot.
///
/// Entries that fail to normalize are logged and skipped; duplicates of an
/// already-planned filename collapse into one task.
pub fn reconcile(
    entries: &[Value],
    base_url: Option<&str>,
    present: &[String],
    image_dir: &Path,
) -> SyncPlan {
    let present_set: HashSet<&str> = present.iter().map(String::as_str).collect();
    let mut expected = HashSet::new();
    let mut plan = SyncPlan::default();

    for item in entries {
        let entry = match manifest::normalize_entry(item, base_url) {
            Ok(entry) => entry,
            Err(err) => {
                warn!(error = %err, "skipping manifest entry");
                plan.skipped += 1;
                continue;
            }
        };
        let is_new = expected.insert(entry.filename.clone());
        if is_new && !present_set.contains(entry.filename.as_str()) {
            plan.to_download.push(DownloadTask {
                destination: image_dir.join(&entry.filename),
                url: entry.download_url,
                filename: entry.filename,
            });
        }
    }

    plan.to_remove = present
        .iter()
        .filter(|name| !expected.contains(*name))
        .cloned()
        .collect();
    plan
}

/// Run one full sync: fetch, reconcile, download, then delete.
pub async fn run(config: &Config) -> Result<SyncReport, SyncError> {
    info!(url = %config.json_url, "starting image sync");
    if let Some(base) = &config.base_url {
        info!(base_url = %base, "base url for file_name entries");
    }

    let client = reqwest::Client::builder()
        .timeout(config.timeout)
        .build()
        .map_err(SyncError::Client)?;

    let root = manifest::fetch_manifest(&client, &config.json_url).await?;
    let entries = manifest::entry_list(&root)?;
    info!(entries = entries.len(), "manifest parsed");

    let present = inventory::scan_images(&config.image_dir, &config.allowed_extensions)?;
    info!(
        present = present.len(),
        dir = %config.image_dir.display(),
        "scanned image directory"
    );

    let plan = reconcile(entries, config.base_url.as_deref(), &present, &config.image_dir);
    let mut report = SyncReport {
        skipped: plan.skipped,
        ..SyncReport::default()
    };

    if plan.to_download.is_empty() {
        info!("all expected images already present");
    } else {
        info!(count = plan.to_download.len(), "downloading missing images");
        let downloader = Downloader::new(client, config.retries);
        for task in &plan.to_download {
            if downloader.fetch(task).await {
                report.downloaded += 1;
            } else {
                report.abandoned += 1;
            }
        }
    }

    for filename in &plan.to_remove {
        let path = config.image_dir.join(filename);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                info!(filename = %filename, "removed obsolete image");
                report.removed += 1;
            }
            Err(err) => {
                warn!(filename = %filename, error = %err, "failed to remove obsolete image");
                report.remove_failures += 1;
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::reconcile;
    use serde_json::json;
    use std::path::Path;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|name| (*name).to_string()).collect()
    }

    #[test]
    fn missing_files_become_download_tasks() {
        let entries = [json!("http://x/a.jpg"), json!("http://x/b.jpg")];
        let present = names(&["a.jpg"]);
        let plan = reconcile(&entries, None, &present, Path::new("/imgs"));

        assert_eq!(plan.to_download.len(), 1);
        assert_eq!(plan.to_download[0].filename, "b.jpg");
        assert_eq!(plan.to_download[0].url, "http://x/b.jpg");
        assert_eq!(plan.to_download[0].destination, Path::new("/imgs/b.jpg"));
        assert!(plan.to_remove.is_empty());
        assert_eq!(plan.skipped, 0);
    }

    #[test]
    fn present_files_not_in_manifest_are_marked_for_removal() {
        let entries = [json!("http://x/new.jpg")];
        let present = names(&["old.jpg"]);
        let plan = reconcile(&entries, None, &present, Path::new("/imgs"));

        assert_eq!(plan.to_download.len(), 1);
        assert_eq!(plan.to_remove, vec!["old.jpg".to_string()]);
    }

    #[test]
    fn unchanged_directory_produces_empty_plan() {
        let entries = [json!("http://x/a.jpg"), json!("http://x/b.jpg")];
        let present = names(&["a.jpg", "b.jpg"]);
        let plan = reconcile(&entries, None, &present, Path::new("/imgs"));

        assert!(plan.to_download.is_empty());
        assert!(plan.to_remove.is_empty());
    }

    #[test]
    fn duplicate_manifest_filenames_collapse_into_one_task() {
        let entries = [json!("http://x/a.jpg"), json!("http://mirror/a.jpg")];
        let plan = reconcile(&entries, None, &[], Path::new("/imgs"));
        assert_eq!(plan.to_download.len(), 1);
        assert_eq!(plan.to_download[0].url, "http://x/a.jpg");
    }

    #[test]
    fn unresolvable_entries_are_skipped_not_fatal() {
        let entries = [
            json!({ "file_name": "needs-base.jpg" }),
            json!({ "bogus": true }),
            json!("http://x/ok.jpg"),
        ];
        let plan = reconcile(&entries, None, &[], Path::new("/imgs"));

        assert_eq!(plan.skipped, 2);
        assert_eq!(plan.to_download.len(), 1);
        assert_eq!(plan.to_download[0].filename, "ok.jpg");
    }

    #[test]
    fn skipped_entries_do_not_protect_present_files() {
        // A file_name entry skipped for want of a base url contributes
        // nothing to the expected set, so a matching on-disk file is removed.
        let entries = [json!({ "file_name": "kept.jpg" })];
        let present = names(&["kept.jpg"]);
        let plan = reconcile(&entries, None, &present, Path::new("/imgs"));

        assert_eq!(plan.skipped, 1);
        assert_eq!(plan.to_remove, vec!["kept.jpg".to_string()]);
    }
}
