use std::path::{Component, Path, PathBuf};

use crate::config::StorageConfig;
use crate::error::{PartscoutError, Result};

/// Uploaded images live under `{media_root}/{namespace}/...`. Stored paths are
/// always relative to the media root and use forward slashes.
#[derive(Debug, Clone)]
pub struct MediaStorage {
    root: PathBuf,
}

impl MediaStorage {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            root: PathBuf::from(&config.media_root),
        }
    }

    /// Writes `bytes` to `{namespace}/{file_name}` and returns that relative path.
    pub async fn save(&self, namespace: &str, file_name: &str, bytes: &[u8]) -> Result<String> {
        if !is_plain_file_name(file_name) {
            return Err(PartscoutError::Validation(format!(
                "Refusing to store file under name '{file_name}'"
            )));
        }

        let dir = self.root.join(namespace);
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(file_name), bytes).await?;

        let relative = format!("{namespace}/{file_name}");
        tracing::debug!(path = %relative, size = bytes.len(), "Stored upload");
        Ok(relative)
    }

    /// Resolves a stored relative path to its location on disk.
    pub fn path(&self, relative: &str) -> PathBuf {
        relative
            .split('/')
            .filter(|segment| !segment.is_empty())
            .fold(self.root.clone(), |path, segment| path.join(segment))
    }
}

/// A single normal path component: no separators, `.` or `..`.
fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains(['/', '\\'])
}

/// Reduces a client-supplied filename to `[A-Za-z0-9._-]`, keeping the
/// extension readable. Falls back to `upload` when nothing usable is left.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.').to_string();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '_' || c == '.') {
        "upload".to_string()
    } else {
        cleaned
    }
}

/// Lowercased extension of a client filename, if it has one.
pub fn file_extension(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
}
