//! Save export use case.

use std::path::PathBuf;

use netexport_domain::{ExportPayload, ExportResult};

use crate::ports::{StorageError, TemporaryStorage};

/// Use case for materializing an export result on disk.
pub struct SaveExport<S: TemporaryStorage> {
    storage: S,
}

impl<S: TemporaryStorage> SaveExport<S> {
    /// Creates a new `SaveExport` use case.
    #[must_use]
    pub const fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Returns the underlying storage.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Writes a text payload under its suggested filename.
    ///
    /// Archive payloads are already on disk and are returned as is.
    ///
    /// # Errors
    ///
    /// Returns an error if the text payload cannot be written.
    pub async fn execute(&self, result: &ExportResult) -> Result<PathBuf, StorageError> {
        match &result.payload {
            ExportPayload::Text(content) => {
                self.save_text(content, &result.suggested_filename).await
            }
            ExportPayload::Archive(path) => Ok(path.clone()),
        }
    }

    /// Writes `content` to a fresh temporary file named `filename`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub async fn save_text(&self, content: &str, filename: &str) -> Result<PathBuf, StorageError> {
        self.storage.save(content.as_bytes(), filename).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::path::Path;
    use std::sync::Mutex;

    use netexport_domain::ExportFormat;
    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Default)]
    struct MemoryStorage {
        saved: Mutex<Vec<(String, Vec<u8>)>>,
        fail: bool,
    }

    impl TemporaryStorage for MemoryStorage {
        async fn allocate(&self, filename: &str) -> Result<PathBuf, StorageError> {
            Ok(Path::new("/scratch").join(filename))
        }

        async fn save(&self, contents: &[u8], filename: &str) -> Result<PathBuf, StorageError> {
            if self.fail {
                return Err(StorageError::Io(std::io::Error::other("disk full")));
            }
            self.saved
                .lock()
                .expect("lock")
                .push((filename.to_string(), contents.to_vec()));
            Ok(Path::new("/scratch").join(filename))
        }
    }

    #[tokio::test]
    async fn text_payload_is_written_with_suggested_filename() {
        let use_case = SaveExport::new(MemoryStorage::default());
        let result = ExportResult::text(
            "GET / HTTP/1.1\n".to_string(),
            ExportFormat::RequestOnly,
            1,
        );

        let path = use_case.execute(&result).await.unwrap();

        assert_eq!(path, Path::new("/scratch/request.txt"));
        let saved = use_case.storage().saved.lock().unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].0, "request.txt");
        assert_eq!(saved[0].1, b"GET / HTTP/1.1\n".to_vec());
    }

    #[tokio::test]
    async fn archive_payload_passes_through() {
        let use_case = SaveExport::new(MemoryStorage::default());
        let result = ExportResult::new(
            ExportPayload::Archive(PathBuf::from("/tmp/curl_commands.zip")),
            ExportFormat::CurlZip,
            3,
        );

        let path = use_case.execute(&result).await.unwrap();

        assert_eq!(path, PathBuf::from("/tmp/curl_commands.zip"));
        assert!(use_case.storage().saved.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn storage_failure_is_reported() {
        let use_case = SaveExport::new(MemoryStorage {
            fail: true,
            ..MemoryStorage::default()
        });

        let result = use_case.save_text("{}", "openapi.json").await;

        assert!(matches!(result, Err(StorageError::Io(_))));
    }
}
