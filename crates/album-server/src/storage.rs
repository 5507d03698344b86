//! Upload directory access.
//!
//! Every name that reaches the filesystem is a bare file name: client supplied
//! names are reduced to their last path component on upload, and anything
//! with a separator or a dot-only name is refused on lookup.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, ServerError};

/// Flat directory of uploaded images.
#[derive(Debug, Clone)]
pub struct PhotoStore {
    dir: PathBuf,
}

impl PhotoStore {
    /// Create a store rooted at `dir`. Nothing is touched on disk yet.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The upload directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the upload directory if it does not exist.
    pub async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            ServerError::Storage(format!("Failed to create {}: {}", self.dir.display(), e))
        })
    }

    /// Names of the stored images, sorted.
    pub async fn list(&self) -> Result<Vec<String>> {
        let mut entries = tokio::fs::read_dir(&self.dir).await.map_err(|e| {
            ServerError::Storage(format!("Failed to read {}: {}", self.dir.display(), e))
        })?;

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ServerError::Storage(e.to_string()))?
        {
            let is_file = entry
                .file_type()
                .await
                .map(|t| t.is_file())
                .unwrap_or(false);
            let file_name = entry.file_name();
            if is_file && let Some(name) = file_name.to_str() {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Write an upload, returning the name it was stored under.
    ///
    /// An existing file of the same name is replaced.
    pub async fn save(&self, file_name: &str, data: &[u8]) -> Result<String> {
        let name = sanitize_file_name(file_name)
            .ok_or_else(|| ServerError::BadRequest(format!("Invalid file name: {:?}", file_name)))?;
        let path = self.dir.join(&name);

        tokio::fs::write(&path, data)
            .await
            .map_err(|e| ServerError::Storage(format!("Failed to write {}: {}", name, e)))?;

        debug!(name = %name, bytes = data.len(), "Stored upload");
        Ok(name)
    }

    /// Path of a stored image.
    ///
    /// Names that are not bare file names are a bad request; names that are
    /// well-formed but not stored are not found.
    pub async fn path_for(&self, name: &str) -> Result<PathBuf> {
        if !is_bare_file_name(name) {
            return Err(ServerError::BadRequest(format!("Invalid image id: {:?}", name)));
        }

        let path = self.dir.join(name);
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(path),
            _ => Err(ServerError::NotFound(format!("Image not found: {}", name))),
        }
    }
}

/// Reduce a client supplied file name to its last path component.
///
/// Both `/` and `\` count as separators. Returns `None` when nothing usable
/// is left.
pub fn sanitize_file_name(name: &str) -> Option<String> {
    let last = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = last.chars().filter(|c| !c.is_control()).collect();
    let cleaned = cleaned.trim();
    is_bare_file_name(cleaned).then(|| cleaned.to_string())
}

fn is_bare_file_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains(['/', '\\', '\0'])
        && !name.chars().all(|c| c == '.')
}
