//! Zip archive adapter.

use std::collections::HashSet;
use std::io::{Cursor, Write};
use std::path::Path;

use netexport_application::ports::{ArchiveEntry, ArchiveError, ArchiveWriter};
use tokio::fs;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const EXECUTABLE_MODE: u32 = 0o755;
const REGULAR_MODE: u32 = 0o644;

/// Writes archives in zip format with deflate compression.
///
/// The archive is assembled in memory and written in one go.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipArchiveWriter;

impl ZipArchiveWriter {
    /// Creates a new `ZipArchiveWriter`.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Encodes `entries` into zip bytes.
    ///
    /// # Errors
    ///
    /// Returns an error on duplicate entry names or if encoding fails.
    pub fn encode(entries: &[ArchiveEntry]) -> Result<Vec<u8>, ArchiveError> {
        let mut seen = HashSet::new();
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

        for entry in entries {
            if !seen.insert(entry.name.as_str()) {
                return Err(ArchiveError::DuplicateEntry(entry.name.clone()));
            }

            let mode = if entry.executable {
                EXECUTABLE_MODE
            } else {
                REGULAR_MODE
            };
            let options = SimpleFileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .unix_permissions(mode);

            zip.start_file(entry.name.as_str(), options)
                .map_err(|e| ArchiveError::Encoding(e.to_string()))?;
            zip.write_all(&entry.contents)?;
        }

        let cursor = zip
            .finish()
            .map_err(|e| ArchiveError::Encoding(e.to_string()))?;
        Ok(cursor.into_inner())
    }
}

impl ArchiveWriter for ZipArchiveWriter {
    async fn write_archive(
        &self,
        destination: &Path,
        entries: &[ArchiveEntry],
    ) -> Result<(), ArchiveError> {
        let bytes = Self::encode(entries)?;

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).await?;
        }

        if let Err(e) = fs::write(destination, &bytes).await {
            // Never leave a truncated archive behind.
            let _ = fs::remove_file(destination).await;
            return Err(ArchiveError::Io(e));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Read;

    use pretty_assertions::assert_eq;
    use zip::ZipArchive;

    use super::*;

    fn read_entry(bytes: &[u8], name: &str) -> (String, Option<u32>) {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mode = file.unix_mode();
        let mut contents = String::new();
        file.read_to_string(&mut contents).unwrap();
        (contents, mode)
    }

    #[test]
    fn test_encode_entries() {
        let bytes = ZipArchiveWriter::encode(&[
            ArchiveEntry::new("001_GET.sh", "#!/bin/sh\ncurl -X GET 'https://a'\n").executable(),
            ArchiveEntry::new("notes.txt", "hello"),
        ])
        .unwrap();

        let archive = ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        assert_eq!(archive.len(), 2);

        let (script, mode) = read_entry(&bytes, "001_GET.sh");
        assert!(script.starts_with("#!/bin/sh\n"));
        assert_eq!(mode.map(|m| m & 0o777), Some(0o755));

        let (notes, mode) = read_entry(&bytes, "notes.txt");
        assert_eq!(notes, "hello");
        assert_eq!(mode.map(|m| m & 0o777), Some(0o644));
    }

    #[test]
    fn test_duplicate_entry_is_rejected() {
        let result = ZipArchiveWriter::encode(&[
            ArchiveEntry::new("a.sh", "1"),
            ArchiveEntry::new("a.sh", "2"),
        ]);
        assert!(matches!(result, Err(ArchiveError::DuplicateEntry(name)) if name == "a.sh"));
    }

    #[tokio::test]
    async fn test_write_archive_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("nested").join("out.zip");

        ZipArchiveWriter::new()
            .write_archive(&destination, &[ArchiveEntry::new("a.txt", "a")])
            .await
            .unwrap();

        let bytes = std::fs::read(&destination).unwrap();
        assert_eq!(read_entry(&bytes, "a.txt").0, "a");
    }

    #[tokio::test]
    async fn test_failed_encode_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("out.zip");

        let result = ZipArchiveWriter::new()
            .write_archive(
                &destination,
                &[ArchiveEntry::new("a", "1"), ArchiveEntry::new("a", "2")],
            )
            .await;

        assert!(result.is_err());
        assert!(!destination.exists());
    }
}
