//! Manifest retrieval and entry normalization.
//!
//! The manifest endpoint has grown three shapes over time: a bare array of
//! url strings, an object with an `images` array, and an object with a
//! `promos` array whose entries only carry a `file_name`. All three
//! normalize to [`ImageEntry`].

use std::time::{SystemTime, UNIX_EPOCH};

use reqwest::{Client, Url};
use serde_json::Value;

use crate::error::SyncError;

/// A manifest entry normalized to a concrete download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEntry {
    pub download_url: String,
    pub filename: String,
}

/// Fetch the manifest and parse it as JSON, leaving schema interpretation
/// to [`entry_list`] and [`normalize_entry`].
pub async fn fetch_manifest(client: &Client, url: &str) -> Result<Value, SyncError> {
    let response = client
        .get(url)
        .send()
        .await
        .and_then(|response| response.error_for_status())
        .map_err(|source| SyncError::Fetch {
            url: url.to_string(),
            source,
        })?;
    let body = response.bytes().await.map_err(|source| SyncError::Fetch {
        url: url.to_string(),
        source,
    })?;
    serde_json::from_slice(&body).map_err(|source| SyncError::Parse {
        url: url.to_string(),
        source,
    })
}

/// Locate the entry list inside the parsed manifest.
///
/// Precedence: a root array, then an `images` array field, then a `promos`
/// array field. Anything else is an unsupported schema.
pub fn entry_list(root: &Value) -> Result<&[Value], SyncError> {
    if let Some(list) = root.as_array() {
        return Ok(list);
    }
    for key in ["images", "promos"] {
        if let Some(list) = root.get(key).and_then(Value::as_array) {
            return Ok(list);
        }
    }
    Err(SyncError::UnsupportedSchema)
}

/// Normalize one raw manifest entry to `{download_url, filename}`.
pub fn normalize_entry(item: &Value, base_url: Option<&str>) -> Result<ImageEntry, SyncError> {
    if let Some(url) = item.as_str() {
        return Ok(ImageEntry {
            download_url: url.to_string(),
            filename: filename_from_url(url)?,
        });
    }

    if let Some(object) = item.as_object() {
        if let Some(url) = object.get("url").and_then(Value::as_str) {
            let filename = match object.get("filename").and_then(Value::as_str) {
                Some(name) => name.to_string(),
                None => filename_from_url(url)?,
            };
            return Ok(ImageEntry {
                download_url: url.to_string(),
                filename,
            });
        }
        if let Some(file_name) = object.get("file_name").and_then(Value::as_str) {
            let base = base_url.ok_or_else(|| SyncError::MissingBaseUrl {
                file_name: file_name.to_string(),
            })?;
            return Ok(ImageEntry {
                download_url: join_base_url(base, file_name),
                filename: file_name.to_string(),
            });
        }
    }

    Err(SyncError::InvalidEntry(item.to_string()))
}

/// Join base url and filename with exactly one `/` between them.
fn join_base_url(base: &str, filename: &str) -> String {
    if base.ends_with('/') {
        format!("{base}{filename}")
    } else {
        format!("{base}/{filename}")
    }
}

/// Derive a filename from the url's path basename. An unparseable url makes
/// the entry invalid; an empty basename falls back to a timestamped name so
/// the download still lands somewhere.
fn filename_from_url(raw: &str) -> Result<String, SyncError> {
    let url = Url::parse(raw)
        .map_err(|_| SyncError::InvalidEntry(format!("unparseable url `{raw}`")))?;
    let basename = url.path().rsplit('/').next().unwrap_or_default();
    if basename.is_empty() {
        Ok(fallback_filename())
    } else {
        Ok(basename.to_string())
    }
}

fn fallback_filename() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default();
    format!("image_{millis}.jpg")
}

#[cfg(test)]
mod tests {
    use super::{ImageEntry, entry_list, normalize_entry};
    use crate::error::SyncError;
    use serde_json::{Value, json};

    fn normalize_all(root: &Value, base_url: Option<&str>) -> Vec<ImageEntry> {
        entry_list(root)
            .expect("entry list")
            .iter()
            .map(|item| normalize_entry(item, base_url).expect("normalize"))
            .collect()
    }

    #[test]
    fn equivalent_manifests_normalize_identically() {
        let base = Some("http://cdn.example/storage");
        let as_array = json!(["http://cdn.example/storage/a.jpg"]);
        let as_images = json!({ "images": [{ "url": "http://cdn.example/storage/a.jpg" }] });
        let as_promos = json!({ "promos": [{ "file_name": "a.jpg" }] });

        let expected = vec![ImageEntry {
            download_url: "http://cdn.example/storage/a.jpg".to_string(),
            filename: "a.jpg".to_string(),
        }];
        assert_eq!(normalize_all(&as_array, base), expected);
        assert_eq!(normalize_all(&as_images, base), expected);
        assert_eq!(normalize_all(&as_promos, base), expected);
    }

    #[test]
    fn root_array_takes_precedence_over_named_fields() {
        let root = json!(["http://x/1.jpg"]);
        assert_eq!(entry_list(&root).expect("list").len(), 1);

        let both = json!({
            "images": ["http://x/from-images.jpg"],
            "promos": ["http://x/from-promos.jpg"],
        });
        let list = entry_list(&both).expect("list");
        assert_eq!(list[0], json!("http://x/from-images.jpg"));
    }

    #[test]
    fn non_array_images_field_falls_through_to_promos() {
        let root = json!({ "images": "not-a-list", "promos": ["http://x/p.jpg"] });
        let list = entry_list(&root).expect("list");
        assert_eq!(list[0], json!("http://x/p.jpg"));
    }

    #[test]
    fn unsupported_schema_is_fatal() {
        let root = json!({ "items": [] });
        assert!(matches!(
            entry_list(&root),
            Err(SyncError::UnsupportedSchema)
        ));
    }

    #[test]
    fn string_entry_derives_filename_from_path() {
        let entry = normalize_entry(&json!("https://x.example/a/b/photo.png?v=2"), None)
            .expect("normalize");
        assert_eq!(entry.filename, "photo.png");
        assert_eq!(entry.download_url, "https://x.example/a/b/photo.png?v=2");
    }

    #[test]
    fn string_entry_with_empty_basename_gets_fallback_name() {
        let entry = normalize_entry(&json!("https://x.example/"), None).expect("normalize");
        assert!(entry.filename.starts_with("image_"));
        assert!(entry.filename.ends_with(".jpg"));
    }

    #[test]
    fn unparseable_url_is_an_invalid_entry() {
        assert!(matches!(
            normalize_entry(&json!("not a url"), None),
            Err(SyncError::InvalidEntry(_))
        ));
    }

    #[test]
    fn url_object_prefers_explicit_filename() {
        let entry = normalize_entry(
            &json!({ "url": "http://x/dl/asset-93f2", "filename": "spring-sale.jpg" }),
            None,
        )
        .expect("normalize");
        assert_eq!(entry.filename, "spring-sale.jpg");
        assert_eq!(entry.download_url, "http://x/dl/asset-93f2");
    }

    #[test]
    fn file_name_entry_joins_base_url_without_doubling_slashes() {
        let with_slash = normalize_entry(
            &json!({ "file_name": "a.jpg" }),
            Some("http://x/storage/"),
        )
        .expect("normalize");
        let without_slash =
            normalize_entry(&json!({ "file_name": "a.jpg" }), Some("http://x/storage"))
                .expect("normalize");
        assert_eq!(with_slash.download_url, "http://x/storage/a.jpg");
        assert_eq!(without_slash.download_url, "http://x/storage/a.jpg");
    }

    #[test]
    fn file_name_entry_without_base_url_is_recoverable_error() {
        assert!(matches!(
            normalize_entry(&json!({ "file_name": "a.jpg" }), None),
            Err(SyncError::MissingBaseUrl { file_name }) if file_name == "a.jpg"
        ));
    }

    #[test]
    fn unrecognized_entry_shape_is_invalid() {
        assert!(matches!(
            normalize_entry(&json!({ "href": "http://x/a.jpg" }), None),
            Err(SyncError::InvalidEntry(_))
        ));
        assert!(matches!(
            normalize_entry(&json!(42), None),
            Err(SyncError::InvalidEntry(_))
        ));
    }
}
