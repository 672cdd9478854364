//! Storage for files uploaded alongside records.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Extensions accepted for pictures and documents
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "pdf"];

/// A directory of uploaded files, addressed by sanitized filename
#[derive(Debug, Clone)]
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Save an upload and return the stored path.
    ///
    /// Files with a disallowed extension, or whose name sanitizes to nothing,
    /// are dropped and `Ok(None)` is returned. An existing file with the same
    /// name is overwritten.
    pub fn save(&self, original_name: &str, bytes: &[u8]) -> Result<Option<String>> {
        if !is_allowed(original_name) {
            tracing::info!("Discarding upload with disallowed type: {:?}", original_name);
            return Ok(None);
        }

        let name = secure_filename(original_name);
        if name.is_empty() {
            tracing::info!("Discarding upload with unusable name: {:?}", original_name);
            return Ok(None);
        }

        std::fs::create_dir_all(&self.root).with_context(|| {
            format!("Failed to create upload directory: {}", self.root.display())
        })?;

        let path = self.root.join(&name);
        std::fs::write(&path, bytes)
            .with_context(|| format!("Failed to write upload: {}", path.display()))?;

        tracing::info!("Stored upload {}", path.display());
        Ok(Some(path.to_string_lossy().into_owned()))
    }
}

/// Whether the filename carries one of [`ALLOWED_EXTENSIONS`]
pub fn is_allowed(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .is_some_and(|(_, ext)| ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Reduce a client-supplied filename to a safe, flat name.
///
/// Non-ASCII characters are dropped, path separators become word breaks,
/// whitespace runs become `_`, anything outside `[A-Za-z0-9_.-]` is removed
/// and leading/trailing dots and underscores are stripped. The result never
/// contains a path separator and never starts with `.`.
pub fn secure_filename(filename: &str) -> String {
    let ascii: String = filename
        .chars()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");

    let cleaned: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(*c, '_' | '.' | '-'))
        .collect();

    cleaned.trim_matches(|c| c == '.' || c == '_').to_string()
}
