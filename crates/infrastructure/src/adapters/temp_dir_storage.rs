//! Temporary directory storage adapter.
//!
//! Files live under `<system temp>/netexport-<pid>/<uuid>/<filename>`.

use std::path::{Path, PathBuf};

use netexport_application::ports::{StorageError, TemporaryStorage};
use tokio::fs;
use uuid::Uuid;

/// Temporary storage rooted in a process-scoped directory.
#[derive(Debug, Clone)]
pub struct TempDirStorage {
    root: PathBuf,
}

impl Default for TempDirStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl TempDirStorage {
    /// Creates storage under the system temporary directory.
    #[must_use]
    pub fn new() -> Self {
        Self::with_root(std::env::temp_dir().join(format!("netexport-{}", std::process::id())))
    }

    /// Creates storage under `root`.
    #[must_use]
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the storage root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl TemporaryStorage for TempDirStorage {
    async fn allocate(&self, filename: &str) -> Result<PathBuf, StorageError> {
        let name = sanitize_filename(filename)?;
        let dir = self.root.join(Uuid::now_v7().to_string());
        fs::create_dir_all(&dir).await?;
        Ok(dir.join(name))
    }

    async fn save(&self, contents: &[u8], filename: &str) -> Result<PathBuf, StorageError> {
        let path = self.allocate(filename).await?;
        fs::write(&path, contents).await?;
        tracing::debug!(path = %path.display(), bytes = contents.len(), "Wrote temporary file");
        Ok(path)
    }
}

/// Reduces `filename` to a single safe path component.
fn sanitize_filename(filename: &str) -> Result<String, StorageError> {
    let name: String = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .chars()
        .filter(|c| !c.is_control())
        .collect();
    let name = name.trim();

    if name.is_empty() || name == "." || name == ".." {
        return Err(StorageError::InvalidFilename(filename.to_string()));
    }
    Ok(name.to_string())
}
