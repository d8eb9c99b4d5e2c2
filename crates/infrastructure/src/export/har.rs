//! HTTP Archive (HAR) format exporter.
//!
//! Exports captured transactions to HAR 1.2. A transaction without a
//! response still produces a `response` object with zeroed fields.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::SecondsFormat;
use netexport_domain::{ExportFormat, ExportOptions, ExportResult, Headers, HttpTransaction};
use serde::{Deserialize, Serialize};

use super::ExportError;
use super::text::HTTP_VERSION;
use crate::http::{DecodedBody, MediaKind, decode_body, kind_of};
use crate::serialization::to_json;

/// HAR format version written to `log.version`.
pub const HAR_VERSION: &str = "1.2";

/// HAR format exporter.
pub struct HarExporter;

impl HarExporter {
    /// Export transactions to a HAR JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be serialized.
    pub fn export<'a, I>(
        transactions: I,
        options: &ExportOptions,
    ) -> Result<ExportResult, ExportError>
    where
        I: IntoIterator<Item = &'a HttpTransaction>,
    {
        let har = Self::document(transactions, options);
        let count = har.log.entries.len();
        let content = to_json(&har, options.pretty_print)?;
        Ok(ExportResult::text(content, ExportFormat::Har, count))
    }

    /// Build the HAR document without serializing it.
    pub fn document<'a, I>(transactions: I, options: &ExportOptions) -> Har
    where
        I: IntoIterator<Item = &'a HttpTransaction>,
    {
        Har {
            log: HarLog {
                version: HAR_VERSION.to_string(),
                creator: HarCreator {
                    name: options.creator_name.clone(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                },
                entries: transactions.into_iter().map(Self::entry).collect(),
            },
        }
    }

    /// Build the HAR entry for a single transaction.
    #[must_use]
    pub fn entry(transaction: &HttpTransaction) -> HarEntry {
        let time = transaction
            .duration
            .map_or(0.0, |d| d.as_secs_f64() * 1000.0);

        HarEntry {
            started_date_time: transaction
                .start_time
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            time,
            request: Self::build_request(transaction),
            response: Self::build_response(transaction),
            cache: HarCache {},
            // Only the total is known; it is attributed to receive.
            timings: HarTimings {
                send: 0.0,
                wait: 0.0,
                receive: time,
            },
        }
    }

    fn build_request(transaction: &HttpTransaction) -> HarRequest {
        let query_string = transaction
            .query_pairs()
            .into_iter()
            .map(|(name, value)| HarQueryParam { name, value })
            .collect();

        let payload = transaction.request_payload();

        HarRequest {
            method: transaction.method.clone(),
            url: transaction.url.clone(),
            http_version: HTTP_VERSION.to_string(),
            cookies: request_cookies(&transaction.request_headers),
            headers: har_headers(&transaction.request_headers),
            query_string,
            post_data: payload.map(|bytes| Self::build_post_data(transaction, bytes)),
            headers_size: -1,
            body_size: payload.map_or(0, |b| i64::try_from(b.len()).unwrap_or(i64::MAX)),
        }
    }

    fn build_post_data(transaction: &HttpTransaction, bytes: &[u8]) -> HarPostData {
        let content_type = transaction.request_content_type();
        let decoded = decode_body(Some(bytes), content_type);

        let params = if kind_of(content_type) == MediaKind::FormUrlEncoded {
            serde_urlencoded::from_bytes::<Vec<(String, String)>>(bytes)
                .unwrap_or_default()
                .into_iter()
                .map(|(name, value)| HarParam { name, value })
                .collect()
        } else {
            Vec::new()
        };

        HarPostData {
            mime_type: content_type.unwrap_or_default().to_string(),
            text: decoded.text_or_placeholder().into_owned(),
            params,
        }
    }

    fn build_response(transaction: &HttpTransaction) -> HarResponse {
        let error = transaction.error.as_ref().map(ToString::to_string);

        let Some(status) = transaction.status_code else {
            return HarResponse::empty(error);
        };

        let payload = transaction.response_payload();
        let content_type = transaction.response_content_type();
        let size = payload.map_or(0, |b| i64::try_from(b.len()).unwrap_or(i64::MAX));

        let (text, encoding) = match decode_body(payload, content_type) {
            DecodedBody::Empty => (None, None),
            DecodedBody::Text(text) => (Some(text), None),
            DecodedBody::Binary { .. } => (
                payload.map(|bytes| BASE64.encode(bytes)),
                Some("base64".to_string()),
            ),
        };

        HarResponse {
            status: i64::from(status),
            status_text: transaction.reason_phrase().to_string(),
            http_version: HTTP_VERSION.to_string(),
            cookies: response_cookies(&transaction.response_headers),
            headers: har_headers(&transaction.response_headers),
            content: HarContent {
                size,
                mime_type: content_type.unwrap_or_default().to_string(),
                text,
                encoding,
            },
            redirect_url: transaction
                .response_headers
                .get("Location")
                .unwrap_or_default()
                .to_string(),
            headers_size: -1,
            body_size: size,
            error,
        }
    }
}

fn har_headers(headers: &Headers) -> Vec<HarHeader> {
    headers
        .iter()
        .map(|h| HarHeader {
            name: h.name.clone(),
            value: h.value.clone(),
        })
        .collect()
}

fn request_cookies(headers: &Headers) -> Vec<HarCookie> {
    headers
        .get_all("Cookie")
        .flat_map(|value| value.split(';'))
        .filter_map(parse_cookie_pair)
        .collect()
}

fn response_cookies(headers: &Headers) -> Vec<HarCookie> {
    headers
        .get_all("Set-Cookie")
        .filter_map(|value| value.split(';').next())
        .filter_map(parse_cookie_pair)
        .collect()
}

fn parse_cookie_pair(pair: &str) -> Option<HarCookie> {
    let (name, value) = pair.trim().split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some(HarCookie {
        name: name.to_string(),
        value: value.trim().to_string(),
    })
}

// HAR format structs

/// HAR document root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Har {
    /// The log object.
    pub log: HarLog,
}

/// HAR `log` object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarLog {
    /// Format version.
    pub version: String,
    /// Exporting application.
    pub creator: HarCreator,
    /// One entry per exported transaction.
    pub entries: Vec<HarEntry>,
}

/// HAR `creator` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarCreator {
    /// Application name.
    pub name: String,
    /// Application version.
    pub version: String,
}

/// One exported transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarEntry {
    /// ISO-8601 start time.
    pub started_date_time: String,
    /// Total time in milliseconds.
    pub time: f64,
    /// Request details.
    pub request: HarRequest,
    /// Response details; zeroed when no response was recorded.
    pub response: HarResponse,
    /// Cache details (always empty).
    pub cache: HarCache,
    /// Phase timings.
    pub timings: HarTimings,
}

/// HAR `request` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarRequest {
    /// HTTP method.
    pub method: String,
    /// Absolute URL.
    pub url: String,
    /// HTTP version.
    pub http_version: String,
    /// Cookies sent.
    pub cookies: Vec<HarCookie>,
    /// Request headers in capture order.
    pub headers: Vec<HarHeader>,
    /// Decoded query parameters.
    pub query_string: Vec<HarQueryParam>,
    /// Request body, when one was sent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_data: Option<HarPostData>,
    /// Header size (unknown).
    pub headers_size: i64,
    /// Body size in bytes.
    pub body_size: i64,
}

/// HAR `response` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarResponse {
    /// Status code, 0 when no response was recorded.
    pub status: i64,
    /// Reason phrase.
    pub status_text: String,
    /// HTTP version.
    pub http_version: String,
    /// Cookies set by the response.
    pub cookies: Vec<HarCookie>,
    /// Response headers in capture order.
    pub headers: Vec<HarHeader>,
    /// Response body.
    pub content: HarContent,
    /// `Location` header value.
    #[serde(rename = "redirectURL")]
    pub redirect_url: String,
    /// Header size (unknown).
    pub headers_size: i64,
    /// Body size in bytes, -1 when unknown.
    pub body_size: i64,
    /// Transport error description.
    #[serde(rename = "_error", default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HarResponse {
    fn empty(error: Option<String>) -> Self {
        Self {
            status: 0,
            status_text: String::new(),
            http_version: String::new(),
            cookies: Vec::new(),
            headers: Vec::new(),
            content: HarContent {
                size: 0,
                mime_type: String::new(),
                text: None,
                encoding: None,
            },
            redirect_url: String::new(),
            headers_size: -1,
            body_size: -1,
            error,
        }
    }
}

/// Name/value header pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarHeader {
    /// Header name.
    pub name: String,
    /// Header value.
    pub value: String,
}

/// Name/value cookie pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarCookie {
    /// Cookie name.
    pub name: String,
    /// Cookie value.
    pub value: String,
}

/// Name/value query parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarQueryParam {
    /// Parameter name.
    pub name: String,
    /// Parameter value.
    pub value: String,
}

/// HAR `postData` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarPostData {
    /// Request media type.
    pub mime_type: String,
    /// Decoded body or placeholder.
    pub text: String,
    /// Form fields for url-encoded bodies.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<HarParam>,
}

/// Form field of a url-encoded body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarParam {
    /// Field name.
    pub name: String,
    /// Field value.
    pub value: String,
}

/// HAR `content` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarContent {
    /// Body size in bytes.
    pub size: i64,
    /// Response media type.
    pub mime_type: String,
    /// Body text, base64 when `encoding` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Encoding applied to `text`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
}

/// HAR `cache` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarCache {}

/// HAR `timings` object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarTimings {
    /// Time sending the request.
    pub send: f64,
    /// Time waiting for the first byte.
    pub wait: f64,
    /// Time receiving the response.
    pub receive: f64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use std::time::Duration;

    use chrono::{TimeZone, Utc};
    use netexport_domain::TransactionError;
    use pretty_assertions::assert_eq;

    use super::*;

    fn get_users() -> HttpTransaction {
        HttpTransaction::new(
            "GET",
            "https://api.example.com/users?page=2&sort=name",
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        )
        .with_request_header("Accept", "application/json")
        .with_request_header("Cookie", "session=abc; theme=dark")
        .with_response(200)
        .with_response_header("Content-Type", "application/json")
        .with_response_header("Set-Cookie", "seen=1; Path=/; HttpOnly")
        .with_response_body(br#"{"id":1}"#.to_vec())
        .with_duration(Duration::from_millis(150))
    }

    #[test]
    fn test_entry_core_fields() {
        let entry = HarExporter::entry(&get_users());

        assert_eq!(entry.started_date_time, "2024-05-01T12:00:00.000Z");
        assert_eq!(entry.time, 150.0);
        assert_eq!(entry.request.method, "GET");
        assert_eq!(entry.request.url, "https://api.example.com/users?page=2&sort=name");
        assert_eq!(entry.response.status, 200);
        assert_eq!(entry.response.status_text, "OK");
        assert_eq!(entry.response.content.text.as_deref(), Some(r#"{"id":1}"#));
        assert_eq!(entry.response.content.size, 8);
        assert_eq!(entry.timings.receive, 150.0);
        assert_eq!(entry.timings.send, 0.0);
    }

    #[test]
    fn test_query_string_and_cookies() {
        let entry = HarExporter::entry(&get_users());

        let query: Vec<_> = entry
            .request
            .query_string
            .iter()
            .map(|q| (q.name.as_str(), q.value.as_str()))
            .collect();
        assert_eq!(query, vec![("page", "2"), ("sort", "name")]);

        let cookies: Vec<_> = entry.request.cookies.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(cookies, vec!["session", "theme"]);
        assert_eq!(entry.response.cookies[0].name, "seen");
        assert_eq!(entry.response.cookies[0].value, "1");
    }

    #[test]
    fn test_form_post_data() {
        let tx = HttpTransaction::new(
            "POST",
            "https://api.example.com/login",
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        )
        .with_request_header("Content-Type", "application/x-www-form-urlencoded")
        .with_request_body(b"user=ada&pass=a%26b".to_vec());

        let post = HarExporter::entry(&tx).request.post_data.unwrap();
        assert_eq!(post.mime_type, "application/x-www-form-urlencoded");
        assert_eq!(post.text, "user=ada&pass=a%26b");
        assert_eq!(
            post.params,
            vec![
                HarParam {
                    name: "user".into(),
                    value: "ada".into(),
                },
                HarParam {
                    name: "pass".into(),
                    value: "a&b".into(),
                },
            ]
        );
    }

    #[test]
    fn test_pending_transaction_keeps_response_object() {
        let tx = HttpTransaction::new(
            "GET",
            "https://api.example.com/slow",
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        )
        .with_error(TransactionError::new("timed out"));

        let value = serde_json::to_value(HarExporter::entry(&tx)).unwrap();

        assert_eq!(value["response"]["status"], 0);
        assert_eq!(value["response"]["bodySize"], -1);
        assert_eq!(value["response"]["content"]["size"], 0);
        assert_eq!(value["response"]["_error"], "timed out");
        assert!(value["request"].get("postData").is_none());
        assert_eq!(value["time"], 0.0);
    }

    #[test]
    fn test_binary_response_is_base64() {
        let tx = get_users()
            .with_response_mime_type("image/png")
            .with_response_body(vec![0x89, 0x50, 0x4E, 0x47]);

        let content = HarExporter::entry(&tx).response.content;
        assert_eq!(content.encoding.as_deref(), Some("base64"));
        assert_eq!(content.text.as_deref(), Some("iVBORw=="));
    }

    #[test]
    fn test_export_document() {
        let transactions = vec![get_users()];
        let result = HarExporter::export(&transactions, &ExportOptions::default()).unwrap();

        assert_eq!(result.format, ExportFormat::Har);
        assert_eq!(result.transaction_count, 1);

        let value: serde_json::Value =
            serde_json::from_str(result.payload.as_text().unwrap()).unwrap();
        assert_eq!(value["log"]["version"], "1.2");
        assert_eq!(value["log"]["creator"]["name"], "netexport");
        assert_eq!(value["log"]["entries"][0]["request"]["method"], "GET");
        assert!(value["log"]["entries"][0]["cache"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_export_empty_list() {
        let transactions: Vec<HttpTransaction> = Vec::new();
        let result = HarExporter::export(&transactions, &ExportOptions::default()).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(result.payload.as_text().unwrap()).unwrap();
        assert_eq!(value["log"]["entries"], serde_json::json!([]));
    }
}
