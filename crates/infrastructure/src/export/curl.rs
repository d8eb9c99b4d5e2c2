//! curl command exporter.
//!
//! Renders each transaction as one POSIX shell command and bundles the
//! commands into an archive through the [`ArchiveWriter`] port.

use std::path::PathBuf;

use netexport_application::{ArchiveEntry, ArchiveWriter, TemporaryStorage};
use netexport_domain::{ExportFormat, ExportPayload, ExportResult, HttpTransaction};

use super::ExportError;
use crate::http::{DecodedBody, decode_body};

/// Name of the archive entry holding every command in order.
pub const ALL_COMMANDS_ENTRY: &str = "all_commands.sh";

const SHEBANG: &str = "#!/bin/sh";
const MAX_PATH_CHARS: usize = 60;

/// curl command exporter.
pub struct CurlExporter;

impl CurlExporter {
    /// Render one transaction as a curl command line.
    ///
    /// A body is passed with `--data-raw` only when its captured bytes are
    /// UTF-8 text, so the shell sends exactly those bytes. Other bodies are
    /// left out and a trailing comment records their size.
    #[must_use]
    pub fn command(transaction: &HttpTransaction) -> String {
        let mut parts = vec![
            "curl".to_string(),
            "-X".to_string(),
            shell_word(&transaction.method.to_ascii_uppercase()),
            shell_quote(&transaction.url),
        ];
        for header in &transaction.request_headers {
            parts.push("-H".to_string());
            parts.push(shell_quote(&format!("{}: {}", header.name, header.value)));
        }

        let payload = transaction.request_payload();
        let mut trailer = None;
        match decode_body(payload, transaction.request_content_type()) {
            DecodedBody::Empty => {}
            DecodedBody::Text(_) => match payload.map(std::str::from_utf8) {
                Some(Ok(raw)) => {
                    parts.push("--data-raw".to_string());
                    parts.push(shell_quote(raw));
                }
                Some(Err(_)) | None => {
                    let len = payload.map_or(0, <[u8]>::len);
                    trailer = Some(format!("# non-UTF-8 request body omitted ({len} bytes)"));
                }
            },
            DecodedBody::Binary { len } => {
                trailer = Some(format!("# binary request body omitted ({len} bytes)"));
            }
        }

        let mut command = parts.join(" ");
        if let Some(trailer) = trailer {
            command.push(' ');
            command.push_str(&trailer);
        }
        command
    }

    /// Build the archive entries: one script per transaction, then
    /// [`ALL_COMMANDS_ENTRY`].
    pub fn entries<'a, I>(transactions: I) -> Vec<ArchiveEntry>
    where
        I: IntoIterator<Item = &'a HttpTransaction>,
    {
        let mut entries = Vec::new();
        let mut all = format!("{SHEBANG}\n");

        for (index, transaction) in transactions.into_iter().enumerate() {
            let command = Self::command(transaction);
            all.push('\n');
            all.push_str(&command);
            all.push('\n');

            entries.push(
                ArchiveEntry::new(
                    entry_name(index + 1, transaction),
                    format!("{SHEBANG}\n{command}\n"),
                )
                .executable(),
            );
        }

        entries.push(ArchiveEntry::new(ALL_COMMANDS_ENTRY, all).executable());
        entries
    }

    /// Write the commands to an archive in temporary storage.
    ///
    /// The archive writer is invoked exactly once with every entry.
    /// `is_multiple` picks the archive name and reflects what the caller
    /// selected, before any filtering.
    ///
    /// # Errors
    ///
    /// Returns an error if no destination can be allocated or the archive
    /// cannot be written. No partial archive is reported in either case.
    pub async fn export<'a, I, A, S>(
        transactions: I,
        is_multiple: bool,
        archive_writer: &A,
        storage: &S,
    ) -> Result<ExportResult, ExportError>
    where
        I: IntoIterator<Item = &'a HttpTransaction>,
        A: ArchiveWriter,
        S: TemporaryStorage,
    {
        let entries = Self::entries(transactions);
        let count = entries.len() - 1;
        let filename = ExportFormat::CurlZip.suggested_filename(is_multiple);

        let destination: PathBuf = storage.allocate(filename).await?;
        archive_writer.write_archive(&destination, &entries).await?;

        let mut result = ExportResult::new(
            ExportPayload::Archive(destination),
            ExportFormat::CurlZip,
            count,
        );
        result.suggested_filename = filename.to_string();
        Ok(result)
    }
}

/// Quotes `value` for a POSIX shell.
#[must_use]
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Leaves plain words bare and quotes anything a shell could reinterpret.
fn shell_word(value: &str) -> String {
    let plain = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if plain {
        value.to_string()
    } else {
        shell_quote(value)
    }
}

/// `NNN_<method>_<host>_<path>.sh`, restricted to `[A-Za-z0-9._-]`.
fn entry_name(index: usize, transaction: &HttpTransaction) -> String {
    let path: String = transaction
        .path()
        .split('/')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("_");
    let path: String = path.chars().take(MAX_PATH_CHARS).collect();

    let mut parts = vec![
        format!("{index:03}"),
        transaction.method.to_ascii_uppercase(),
    ];
    parts.extend(transaction.host());
    parts.push(path);

    let stem = parts
        .iter()
        .map(|p| sanitize(p))
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("_");
    format!("{stem}.sh")
}

fn sanitize(part: &str) -> String {
    part.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
