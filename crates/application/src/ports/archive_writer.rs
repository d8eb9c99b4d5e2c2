//! Archive writer port.

use std::future::Future;
use std::path::Path;

/// One file inside an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Entry name, relative to the archive root.
    pub name: String,
    /// Entry contents.
    pub contents: Vec<u8>,
    /// Whether the entry should be marked executable.
    pub executable: bool,
}

impl ArchiveEntry {
    /// Creates a regular file entry.
    #[must_use]
    pub fn new(name: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
            executable: false,
        }
    }

    /// Marks the entry executable.
    #[must_use]
    pub const fn executable(mut self) -> Self {
        self.executable = true;
        self
    }
}

/// Error type for archive operations.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// Two entries share a name.
    #[error("Duplicate archive entry: {0}")]
    DuplicateEntry(String),

    /// The archive container could not be encoded.
    #[error("Archive encoding failed: {0}")]
    Encoding(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Writes a set of entries into a single archive file.
///
/// Implementations either produce the complete archive at `destination`
/// or report an error; they never leave a truncated archive behind.
pub trait ArchiveWriter: Send + Sync {
    /// Writes all entries to `destination`.
    ///
    /// # Errors
    ///
    /// Returns an error if the archive cannot be created.
    fn write_archive(
        &self,
        destination: &Path,
        entries: &[ArchiveEntry],
    ) -> impl Future<Output = Result<(), ArchiveError>> + Send;
}
