//! Export infrastructure.
//!
//! This module provides exporters for every [`ExportFormat`] and the
//! [`NetworkExporter`] facade that filters, dispatches and saves.

mod curl;
mod har;
mod openapi;
mod postman;
pub mod text;

pub use curl::{ALL_COMMANDS_ENTRY, CurlExporter, shell_quote};
pub use har::{
    HAR_VERSION, Har, HarContent, HarCookie, HarCreator, HarEntry, HarExporter, HarHeader,
    HarLog, HarParam, HarPostData, HarQueryParam, HarRequest, HarResponse, HarTimings,
};
pub use openapi::{OPENAPI_VERSION, OpenApiExporter};
pub use postman::{
    POSTMAN_SCHEMA, PostmanBody, PostmanCollection, PostmanExporter, PostmanHeader, PostmanItem,
    PostmanRequest, PostmanResponse, PostmanUrl,
};

use std::path::PathBuf;

use netexport_application::{
    ArchiveError, ArchiveWriter, SaveExport, StorageError, TemporaryStorage,
};
use netexport_domain::{ExportFilter, ExportFormat, ExportOptions, ExportResult, HttpTransaction};
use thiserror::Error;
use tracing::{debug, warn};

use crate::serialization::SerializationError;

/// Export error type.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),

    /// The archive could not be written.
    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),

    /// No temporary location could be allocated.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Filters, exports and saves captured transactions.
///
/// Each call works on the snapshot it is given; nothing is cached
/// between calls.
pub struct NetworkExporter<A: ArchiveWriter, S: TemporaryStorage> {
    filter: ExportFilter,
    options: ExportOptions,
    archive_writer: A,
    save: SaveExport<S>,
}

impl<A: ArchiveWriter, S: TemporaryStorage> NetworkExporter<A, S> {
    /// Creates a new exporter.
    #[must_use]
    pub const fn new(
        filter: ExportFilter,
        options: ExportOptions,
        archive_writer: A,
        storage: S,
    ) -> Self {
        Self {
            filter,
            options,
            archive_writer,
            save: SaveExport::new(storage),
        }
    }

    /// Exports `transactions` in `format`.
    ///
    /// The filter is applied to every export except a text export of a
    /// single transaction. The suggested filename follows the number of
    /// transactions passed in, not the number that survive the filter.
    /// Returns `None` if the export could not be produced; the cause is
    /// logged.
    pub async fn export(
        &self,
        transactions: &[HttpTransaction],
        format: ExportFormat,
    ) -> Option<ExportResult> {
        let selected: Vec<&HttpTransaction> = if format.is_text() && transactions.len() == 1 {
            transactions.iter().collect()
        } else {
            self.filter.apply(transactions)
        };
        debug!(
            ?format,
            total = transactions.len(),
            selected = selected.len(),
            "Exporting transactions"
        );

        let is_multiple = transactions.len() > 1;
        let selected = selected.iter().copied();
        let count = selected.len();
        let result = match format {
            ExportFormat::RequestOnly => Ok(ExportResult::text(
                text::request_string_for_transactions(selected),
                format,
                count,
            )),
            ExportFormat::ResponseOnly => Ok(ExportResult::text(
                text::response_string_for_transactions(selected),
                format,
                count,
            )),
            ExportFormat::Raw => Ok(ExportResult::text(
                text::raw_string_for_transactions(selected),
                format,
                count,
            )),
            ExportFormat::Har => HarExporter::export(selected, &self.options),
            ExportFormat::Postman => PostmanExporter::export(selected, &self.options),
            ExportFormat::Swagger => OpenApiExporter::export(selected, &self.options),
            ExportFormat::CurlZip => {
                CurlExporter::export(
                    selected,
                    is_multiple,
                    &self.archive_writer,
                    self.save.storage(),
                )
                .await
            }
        };

        match result {
            Ok(mut result) => {
                result.suggested_filename = format.suggested_filename(is_multiple).to_string();
                for warning in &result.warnings {
                    debug!(warning = %warning.message, source = ?warning.source, "Export warning");
                }
                Some(result)
            }
            Err(e) => {
                warn!(?format, error = %e, "Export failed");
                None
            }
        }
    }

    /// Exports `transactions` and writes the result to a temporary file.
    ///
    /// Returns the file location, or `None` if either step failed.
    pub async fn export_to_file(
        &self,
        transactions: &[HttpTransaction],
        format: ExportFormat,
    ) -> Option<PathBuf> {
        let result = self.export(transactions, format).await?;
        match self.save.execute(&result).await {
            Ok(path) => {
                debug!(path = %path.display(), "Export saved");
                Some(path)
            }
            Err(e) => {
                warn!(?format, error = %e, "Failed to save export");
                None
            }
        }
    }

    /// Writes `content` to a temporary file named `filename`.
    ///
    /// Returns `None` if the write failed.
    pub async fn save_to_temporary_file(&self, content: &str, filename: &str) -> Option<PathBuf> {
        self.save
            .save_text(content, filename)
            .await
            .inspect_err(|e| warn!(filename, error = %e, "Failed to write temporary file"))
            .ok()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::path::Path;
    use std::sync::Mutex;

    use chrono::{TimeZone, Utc};
    use netexport_application::ArchiveEntry;
    use netexport_domain::{ExportPayload, FilterSettings};
    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Default)]
    struct RecordingArchive {
        calls: Mutex<Vec<Vec<String>>>,
        fail: bool,
    }

    impl ArchiveWriter for RecordingArchive {
        async fn write_archive(
            &self,
            _destination: &Path,
            entries: &[ArchiveEntry],
        ) -> Result<(), ArchiveError> {
            self.calls
                .lock()
                .expect("lock")
                .push(entries.iter().map(|e| e.name.clone()).collect());
            if self.fail {
                return Err(ArchiveError::Encoding("full".to_string()));
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct MemoryStorage {
        saved: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    impl TemporaryStorage for MemoryStorage {
        async fn allocate(&self, filename: &str) -> Result<PathBuf, StorageError> {
            if self.fail {
                return Err(StorageError::InvalidFilename(filename.to_string()));
            }
            Ok(Path::new("/scratch").join(filename))
        }

        async fn save(&self, contents: &[u8], filename: &str) -> Result<PathBuf, StorageError> {
            if self.fail {
                return Err(StorageError::Io(std::io::Error::other("read-only")));
            }
            self.saved.lock().expect("lock").push((
                filename.to_string(),
                String::from_utf8_lossy(contents).into_owned(),
            ));
            Ok(Path::new("/scratch").join(filename))
        }
    }

    fn tx(url: &str) -> HttpTransaction {
        HttpTransaction::new("GET", url, Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
            .with_response(200)
    }

    fn image() -> HttpTransaction {
        tx("https://cdn.example.com/logo.png").with_response_mime_type("image/png")
    }

    fn exporter(
        archive: RecordingArchive,
        storage: MemoryStorage,
    ) -> NetworkExporter<RecordingArchive, MemoryStorage> {
        let filter = ExportFilter::new(&FilterSettings {
            exclude_images: true,
            ..FilterSettings::default()
        })
        .unwrap();
        NetworkExporter::new(filter, ExportOptions::default(), archive, storage)
    }

    #[tokio::test]
    async fn single_text_export_is_not_filtered() {
        let exporter = exporter(RecordingArchive::default(), MemoryStorage::default());

        let result = exporter
            .export(&[image()], ExportFormat::RequestOnly)
            .await
            .unwrap();

        assert_eq!(result.transaction_count, 1);
        assert_eq!(result.suggested_filename, "request.txt");
        assert!(result.payload.as_text().unwrap().contains("logo.png"));
    }

    #[tokio::test]
    async fn multi_transaction_export_is_filtered() {
        let exporter = exporter(RecordingArchive::default(), MemoryStorage::default());
        let transactions = vec![
            tx("https://api.example.com/a"),
            image(),
            tx("https://api.example.com/b"),
        ];

        let result = exporter.export(&transactions, ExportFormat::Raw).await.unwrap();

        assert_eq!(result.transaction_count, 2);
        assert_eq!(result.suggested_filename, "transactions.txt");
        assert!(!result.payload.as_text().unwrap().contains("logo.png"));
    }

    #[tokio::test]
    async fn filename_follows_selection_not_survivors() {
        let exporter = exporter(RecordingArchive::default(), MemoryStorage::default());
        let transactions = vec![tx("https://api.example.com/a"), image()];

        let har = exporter.export(&transactions, ExportFormat::Har).await.unwrap();
        assert_eq!(har.transaction_count, 1);
        assert_eq!(har.suggested_filename, "transactions.har");

        let curl = exporter
            .export(&transactions, ExportFormat::CurlZip)
            .await
            .unwrap();
        assert_eq!(curl.transaction_count, 1);
        assert_eq!(curl.suggested_filename, "curl_commands.zip");
        assert_eq!(
            curl.payload,
            ExportPayload::Archive(PathBuf::from("/scratch/curl_commands.zip"))
        );
    }

    #[tokio::test]
    async fn single_structured_export_is_filtered() {
        let exporter = exporter(RecordingArchive::default(), MemoryStorage::default());

        let result = exporter.export(&[image()], ExportFormat::Har).await.unwrap();

        assert_eq!(result.transaction_count, 0);
        let value: serde_json::Value =
            serde_json::from_str(result.payload.as_text().unwrap()).unwrap();
        assert_eq!(value["log"]["entries"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn curl_export_writes_archive_once() {
        let exporter = exporter(RecordingArchive::default(), MemoryStorage::default());
        let transactions = vec![tx("https://api.example.com/a"), tx("https://api.example.com/b")];

        let result = exporter
            .export(&transactions, ExportFormat::CurlZip)
            .await
            .unwrap();

        assert_eq!(
            result.payload,
            ExportPayload::Archive(PathBuf::from("/scratch/curl_commands.zip"))
        );
        let calls = exporter.archive_writer.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0],
            vec![
                "001_GET_api.example.com_a.sh",
                "002_GET_api.example.com_b.sh",
                ALL_COMMANDS_ENTRY,
            ]
        );
    }

    #[tokio::test]
    async fn curl_export_failure_is_absent() {
        let archive = RecordingArchive {
            fail: true,
            ..RecordingArchive::default()
        };
        let exporter = exporter(archive, MemoryStorage::default());

        let result = exporter
            .export(&[tx("https://api.example.com/a")], ExportFormat::CurlZip)
            .await;

        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn export_to_file_uses_suggested_filename() {
        let exporter = exporter(RecordingArchive::default(), MemoryStorage::default());
        let transactions = vec![tx("https://api.example.com/a"), tx("https://api.example.com/b")];

        let path = exporter
            .export_to_file(&transactions, ExportFormat::Postman)
            .await
            .unwrap();

        assert_eq!(path, Path::new("/scratch/postman_collection.json"));
        let saved = exporter.save.storage().saved.lock().unwrap();
        assert!(saved[0].1.contains("\"item\""));
    }

    #[tokio::test]
    async fn storage_failures_are_absent() {
        let storage = MemoryStorage {
            fail: true,
            ..MemoryStorage::default()
        };
        let exporter = exporter(RecordingArchive::default(), storage);

        assert_eq!(exporter.save_to_temporary_file("x", "notes.txt").await, None);
        assert_eq!(
            exporter
                .export_to_file(&[tx("https://api.example.com/a")], ExportFormat::Har)
                .await,
            None
        );
    }
}
