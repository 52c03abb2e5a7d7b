//! Image-directory inventory shared by the sync tool and the slideshow server.
//!
//! The inventory is deliberately flat: the slideshow treats the image
//! directory as a bag of files, so only direct children are listed and
//! subdirectories are ignored.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

const DEFAULT_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

#[derive(Debug, Error)]
pub enum InventoryError {
    /// The image directory exists but could not be created or read.
    #[error("cannot access image directory {path}: {source}")]
    DirectoryAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Lowercased extension allow-list controlling which files count as images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedExtensions(Vec<String>);

impl AllowedExtensions {
    /// Parse a comma-separated list such as `"jpg, PNG, .webp"`.
    ///
    /// Entries are trimmed, lowercased, and stripped of a leading dot; empty
    /// entries are dropped. An input with no usable entries falls back to the
    /// defaults.
    pub fn parse(spec: &str) -> Self {
        let exts: Vec<String> = spec
            .split(',')
            .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        if exts.is_empty() {
            Self::default()
        } else {
            Self(exts)
        }
    }

    /// Return `true` if `filename` carries one of the allowed extensions.
    #[must_use]
    pub fn matches(&self, filename: &str) -> bool {
        Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                let ext = ext.to_ascii_lowercase();
                self.0.iter().any(|allowed| *allowed == ext)
            })
    }
}

impl Default for AllowedExtensions {
    fn default() -> Self {
        Self(DEFAULT_EXTENSIONS.iter().map(|ext| (*ext).to_string()).collect())
    }
}

/// List image filenames directly under `dir`, in directory order.
///
/// A missing directory is created rather than reported as an error, so a
/// fresh deployment starts from an empty inventory. Files whose names are
/// not valid UTF-8 are skipped; they could not be represented in the JSON
/// listing the server hands out.
///
/// # Errors
/// Returns [`InventoryError::DirectoryAccess`] when the directory cannot be
/// created or read.
pub fn scan_images(dir: &Path, exts: &AllowedExtensions) -> Result<Vec<String>, InventoryError> {
    fs::create_dir_all(dir).map_err(|source| InventoryError::DirectoryAccess {
        path: dir.to_path_buf(),
        source,
    })?;

    let entries = fs::read_dir(dir).map_err(|source| InventoryError::DirectoryAccess {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut out = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| InventoryError::DirectoryAccess {
            path: dir.to_path_buf(),
            source,
        })?;
        if !entry.file_type().map(|ty| ty.is_file()).unwrap_or(false) {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if exts.matches(&name) {
            out.push(name);
        }
    }
    Ok(out)
}
