//! Export format types.
//!
//! This module provides the closed set of export formats, the options
//! that tune structured output, and the result handed back to callers.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// Request line, headers and body as plain text.
    RequestOnly,
    /// Status line, headers and body as plain text.
    ResponseOnly,
    /// Request and response as plain text.
    Raw,
    /// HTTP Archive (HAR) 1.2.
    Har,
    /// Postman Collection v2.1.
    Postman,
    /// `OpenAPI` 3.0 document.
    Swagger,
    /// One curl command per transaction, bundled in a zip archive.
    CurlZip,
}

impl ExportFormat {
    /// Get all available formats.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::RequestOnly,
            Self::ResponseOnly,
            Self::Raw,
            Self::Har,
            Self::Postman,
            Self::Swagger,
            Self::CurlZip,
        ]
    }

    /// Get the file extension for this format.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::RequestOnly | Self::ResponseOnly | Self::Raw => "txt",
            Self::Har => "har",
            Self::Postman | Self::Swagger => "json",
            Self::CurlZip => "zip",
        }
    }

    /// Get the MIME type for this format.
    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::RequestOnly | Self::ResponseOnly | Self::Raw => "text/plain",
            Self::Har | Self::Postman | Self::Swagger => "application/json",
            Self::CurlZip => "application/zip",
        }
    }

    /// Get the display name for this format.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::RequestOnly => "Request",
            Self::ResponseOnly => "Response",
            Self::Raw => "Raw",
            Self::Har => "HTTP Archive (HAR)",
            Self::Postman => "Postman Collection",
            Self::Swagger => "OpenAPI 3.0",
            Self::CurlZip => "cURL Commands (ZIP)",
        }
    }

    /// Returns true for the plain text formats.
    #[must_use]
    pub const fn is_text(self) -> bool {
        matches!(self, Self::RequestOnly | Self::ResponseOnly | Self::Raw)
    }

    /// Get the suggested filename for an export of one or many transactions.
    #[must_use]
    pub const fn suggested_filename(self, is_multiple: bool) -> &'static str {
        match (self, is_multiple) {
            (Self::RequestOnly, false) => "request.txt",
            (Self::RequestOnly, true) => "requests.txt",
            (Self::ResponseOnly, false) => "response.txt",
            (Self::ResponseOnly, true) => "responses.txt",
            (Self::Raw, false) => "transaction.txt",
            (Self::Raw, true) => "transactions.txt",
            (Self::Har, false) => "transaction.har",
            (Self::Har, true) => "transactions.har",
            (Self::Postman, _) => "postman_collection.json",
            (Self::Swagger, _) => "openapi.json",
            (Self::CurlZip, false) => "curl_command.zip",
            (Self::CurlZip, true) => "curl_commands.zip",
        }
    }
}

/// Export options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportOptions {
    /// Whether to pretty print JSON output.
    #[serde(default = "default_true")]
    pub pretty_print: bool,
    /// HAR specific: creator name written to `log.creator`.
    #[serde(default = "default_creator_name")]
    pub creator_name: String,
    /// Postman specific: collection name.
    #[serde(default = "default_collection_name")]
    pub collection_name: String,
    /// `OpenAPI` specific: API title. Defaults to the server host.
    #[serde(default)]
    pub api_title: Option<String>,
    /// `OpenAPI` specific: API version.
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// `OpenAPI` specific: API description.
    #[serde(default)]
    pub api_description: Option<String>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            pretty_print: true,
            creator_name: default_creator_name(),
            collection_name: default_collection_name(),
            api_title: None,
            api_version: default_api_version(),
            api_description: None,
        }
    }
}

const fn default_true() -> bool {
    true
}

fn default_creator_name() -> String {
    "netexport".to_string()
}

fn default_collection_name() -> String {
    "Network Export".to_string()
}

fn default_api_version() -> String {
    "1.0.0".to_string()
}

impl ExportOptions {
    /// Set `OpenAPI` metadata.
    #[must_use]
    pub fn with_api_info(
        mut self,
        title: impl Into<String>,
        version: impl Into<String>,
        description: Option<String>,
    ) -> Self {
        self.api_title = Some(title.into());
        self.api_version = version.into();
        self.api_description = description;
        self
    }

    /// Set the Postman collection name.
    #[must_use]
    pub fn with_collection_name(mut self, name: impl Into<String>) -> Self {
        self.collection_name = name.into();
        self
    }
}

/// The exported artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportPayload {
    /// In-memory text or JSON.
    Text(String),
    /// Locator of a materialized archive.
    Archive(PathBuf),
}

impl ExportPayload {
    /// Returns the text content, if this is an in-memory payload.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Archive(_) => None,
        }
    }
}

/// Result of an export operation.
///
/// Built fresh for every call; never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportResult {
    /// The exported content.
    pub payload: ExportPayload,
    /// The format used.
    pub format: ExportFormat,
    /// Number of transactions exported.
    pub transaction_count: usize,
    /// Filename to offer when saving or sharing.
    pub suggested_filename: String,
    /// Warnings generated during export.
    pub warnings: Vec<ExportWarning>,
}

impl ExportResult {
    /// Create a new export result.
    #[must_use]
    pub fn new(payload: ExportPayload, format: ExportFormat, transaction_count: usize) -> Self {
        Self {
            payload,
            format,
            transaction_count,
            suggested_filename: format.suggested_filename(transaction_count > 1).to_string(),
            warnings: Vec::new(),
        }
    }

    /// Create a new in-memory text result.
    #[must_use]
    pub fn text(content: String, format: ExportFormat, transaction_count: usize) -> Self {
        Self::new(ExportPayload::Text(content), format, transaction_count)
    }

    /// Add a warning.
    pub fn add_warning(&mut self, warning: ExportWarning) {
        self.warnings.push(warning);
    }

    /// Check if there were any warnings.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Warning generated during export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportWarning {
    /// Warning message.
    pub message: String,
    /// The transaction that generated the warning.
    pub source: Option<String>,
    /// Warning severity.
    pub severity: WarningSeverity,
}

impl ExportWarning {
    /// Create a new warning.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
            severity: WarningSeverity::Warning,
        }
    }

    /// Set the source.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Set as info severity.
    #[must_use]
    pub const fn as_info(mut self) -> Self {
        self.severity = WarningSeverity::Info;
        self
    }
}

/// Warning severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WarningSeverity {
    /// Informational.
    Info,
    /// Warning (part of the input was left out).
    #[default]
    Warning,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_format_all() {
        let formats = ExportFormat::all();
        assert_eq!(formats.len(), 7);
        assert!(formats.contains(&ExportFormat::Swagger));
        assert!(formats.contains(&ExportFormat::CurlZip));
    }

    #[test]
    fn test_export_format_extension() {
        assert_eq!(ExportFormat::Raw.extension(), "txt");
        assert_eq!(ExportFormat::Har.extension(), "har");
        assert_eq!(ExportFormat::Postman.extension(), "json");
        assert_eq!(ExportFormat::CurlZip.extension(), "zip");
    }

    #[test]
    fn test_suggested_filename_matches_extension() {
        for format in ExportFormat::all() {
            for multiple in [false, true] {
                let name = format.suggested_filename(multiple);
                assert!(
                    name.ends_with(&format!(".{}", format.extension())),
                    "{name} should end with {}",
                    format.extension()
                );
            }
        }
    }

    #[test]
    fn test_suggested_filename_cardinality() {
        assert_eq!(ExportFormat::RequestOnly.suggested_filename(false), "request.txt");
        assert_eq!(ExportFormat::RequestOnly.suggested_filename(true), "requests.txt");
        assert_eq!(ExportFormat::Har.suggested_filename(true), "transactions.har");
        assert_eq!(ExportFormat::CurlZip.suggested_filename(false), "curl_command.zip");
    }

    #[test]
    fn test_export_options_defaults() {
        let options = ExportOptions::default();
        assert!(options.pretty_print);
        assert_eq!(options.api_version, "1.0.0");
        assert_eq!(options.api_title, None);
    }

    #[test]
    fn test_export_options_deserialize_partial() {
        let options: ExportOptions =
            serde_json::from_str(r#"{"collection_name":"Checkout"}"#).unwrap_or_default();
        assert_eq!(options.collection_name, "Checkout");
        assert!(options.pretty_print);
        assert_eq!(options.creator_name, "netexport");
    }

    #[test]
    fn test_export_options_with_api_info() {
        let options = ExportOptions::default().with_api_info(
            "My API",
            "2.0.0",
            Some("Description".to_string()),
        );

        assert_eq!(options.api_title, Some("My API".to_string()));
        assert_eq!(options.api_version, "2.0.0");
        assert_eq!(options.api_description, Some("Description".to_string()));
    }

    #[test]
    fn test_export_result() {
        let mut result = ExportResult::text("content".to_string(), ExportFormat::Har, 5);
        assert_eq!(result.transaction_count, 5);
        assert_eq!(result.suggested_filename, "transactions.har");
        assert_eq!(result.payload.as_text(), Some("content"));
        assert!(!result.has_warnings());

        result.add_warning(ExportWarning::new("Test warning"));
        assert!(result.has_warnings());
    }

    #[test]
    fn test_export_warning() {
        let warning = ExportWarning::new("Skipped host")
            .with_source("GET https://cdn.example.com/a.js")
            .as_info();

        assert_eq!(warning.message, "Skipped host");
        assert_eq!(
            warning.source,
            Some("GET https://cdn.example.com/a.js".to_string())
        );
        assert_eq!(warning.severity, WarningSeverity::Info);
    }
}
