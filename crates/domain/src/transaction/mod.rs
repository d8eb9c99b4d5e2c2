//! Captured HTTP transaction model
//!
//! A transaction is one request/response exchange recorded by the host's
//! capture layer. Exporters only ever read it.

mod header;
mod status;

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use url::Url;

pub use header::{Header, Headers};
pub use status::StatusCode;

/// Transport-level failure recorded for a transaction.
///
/// Distinct from a non-2xx status: the exchange never produced a
/// response at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionError {
    /// Platform error code, if one was reported.
    pub code: Option<i64>,
    /// Human readable description.
    pub message: String,
}

impl TransactionError {
    /// Creates a new transport error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    /// Sets the platform error code.
    #[must_use]
    pub const fn with_code(mut self, code: i64) -> Self {
        self.code = Some(code);
        self
    }
}

impl fmt::Display for TransactionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{} (code {code})", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// One captured HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpTransaction {
    /// Absolute request URL.
    pub url: String,
    /// HTTP verb as captured.
    pub method: String,
    /// Request headers in capture order.
    pub request_headers: Headers,
    /// Request payload, if any was sent.
    pub request_body: Option<Vec<u8>>,
    /// Request media type reported by the capture layer.
    pub request_mime_type: Option<String>,
    /// Response status code; `None` while in flight or after a failure.
    pub status_code: Option<u16>,
    /// Response reason phrase as received.
    pub status_text: Option<String>,
    /// Response headers in capture order.
    pub response_headers: Headers,
    /// Response payload, if any was received.
    pub response_body: Option<Vec<u8>>,
    /// Response media type reported by the capture layer.
    pub response_mime_type: Option<String>,
    /// When the request started.
    pub start_time: DateTime<Utc>,
    /// Total time until the response completed.
    pub duration: Option<Duration>,
    /// Transport failure, if the exchange failed.
    pub error: Option<TransactionError>,
}

impl HttpTransaction {
    /// Creates a request-only transaction with no response recorded yet.
    #[must_use]
    pub fn new(
        method: impl Into<String>,
        url: impl Into<String>,
        start_time: DateTime<Utc>,
    ) -> Self {
        Self {
            url: url.into(),
            method: method.into(),
            request_headers: Headers::new(),
            request_body: None,
            request_mime_type: None,
            status_code: None,
            status_text: None,
            response_headers: Headers::new(),
            response_body: None,
            response_mime_type: None,
            start_time,
            duration: None,
            error: None,
        }
    }

    /// Appends a request header.
    #[must_use]
    pub fn with_request_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.request_headers.add(Header::new(name, value));
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn with_request_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.request_body = Some(body.into());
        self
    }

    /// Sets the request media type.
    #[must_use]
    pub fn with_request_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.request_mime_type = Some(mime_type.into());
        self
    }

    /// Records a response status.
    #[must_use]
    pub const fn with_response(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    /// Sets the response reason phrase.
    #[must_use]
    pub fn with_status_text(mut self, status_text: impl Into<String>) -> Self {
        self.status_text = Some(status_text.into());
        self
    }

    /// Appends a response header.
    #[must_use]
    pub fn with_response_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.response_headers.add(Header::new(name, value));
        self
    }

    /// Sets the response body.
    #[must_use]
    pub fn with_response_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.response_body = Some(body.into());
        self
    }

    /// Sets the response media type.
    #[must_use]
    pub fn with_response_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.response_mime_type = Some(mime_type.into());
        self
    }

    /// Sets the total duration.
    #[must_use]
    pub const fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Records a transport failure.
    #[must_use]
    pub fn with_error(mut self, error: TransactionError) -> Self {
        self.error = Some(error);
        self
    }

    /// Returns true if a response status was recorded.
    #[must_use]
    pub const fn has_response(&self) -> bool {
        self.status_code.is_some()
    }

    /// Returns the response status, if any.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        self.status_code.map(StatusCode::new)
    }

    /// Returns the captured reason phrase, falling back to the canonical one.
    #[must_use]
    pub fn reason_phrase(&self) -> &str {
        match (&self.status_text, self.status()) {
            (Some(text), _) if !text.is_empty() => text,
            (_, Some(status)) => status.reason_phrase(),
            _ => "",
        }
    }

    /// Parses the request URL.
    #[must_use]
    pub fn parsed_url(&self) -> Option<Url> {
        Url::parse(&self.url).ok()
    }

    /// Returns the request host, if the URL has one.
    #[must_use]
    pub fn host(&self) -> Option<String> {
        self.parsed_url()
            .and_then(|url| url.host_str().map(str::to_owned))
    }

    /// Returns the URL path without the query string.
    ///
    /// Unparseable URLs yield the text before any `?`.
    #[must_use]
    pub fn path(&self) -> String {
        self.parsed_url().map_or_else(
            || {
                self.url
                    .split(['?', '#'])
                    .next()
                    .unwrap_or_default()
                    .to_string()
            },
            |url| url.path().to_string(),
        )
    }

    /// Returns the decoded query parameters in URL order.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.parsed_url().map_or_else(Vec::new, |url| {
            url.query_pairs()
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect()
        })
    }

    /// Returns the request media type, preferring the captured mime type.
    #[must_use]
    pub fn request_content_type(&self) -> Option<&str> {
        self.request_mime_type
            .as_deref()
            .or_else(|| self.request_headers.get("Content-Type"))
    }

    /// Returns the response media type, preferring the captured mime type.
    #[must_use]
    pub fn response_content_type(&self) -> Option<&str> {
        self.response_mime_type
            .as_deref()
            .or_else(|| self.response_headers.get("Content-Type"))
    }

    /// Returns the request body if it is present and non-empty.
    #[must_use]
    pub fn request_payload(&self) -> Option<&[u8]> {
        self.request_body.as_deref().filter(|b| !b.is_empty())
    }

    /// Returns the response body if it is present and non-empty.
    #[must_use]
    pub fn response_payload(&self) -> Option<&[u8]> {
        self.response_body.as_deref().filter(|b| !b.is_empty())
    }
}
