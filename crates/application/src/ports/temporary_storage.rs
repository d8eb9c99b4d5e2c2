//! Temporary storage port.

use std::future::Future;
use std::path::PathBuf;

/// Error type for temporary storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The filename cannot be used as a single path component.
    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Process-scoped scratch space for exported artifacts.
///
/// Every call gets a fresh location, so two exports with the same
/// filename never overwrite each other.
pub trait TemporaryStorage: Send + Sync {
    /// Reserves a path for `filename` without writing to it.
    ///
    /// # Errors
    ///
    /// Returns an error if the location cannot be prepared.
    fn allocate(
        &self,
        filename: &str,
    ) -> impl Future<Output = Result<PathBuf, StorageError>> + Send;

    /// Writes `contents` under `filename` and returns its path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    fn save(
        &self,
        contents: &[u8],
        filename: &str,
    ) -> impl Future<Output = Result<PathBuf, StorageError>> + Send;
}
