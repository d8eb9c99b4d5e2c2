//! Postman Collection v2.1 exporter.
//!
//! Every transaction becomes one request item. A recorded response is
//! attached as a saved example.

use netexport_domain::{ExportFormat, ExportOptions, ExportResult, Headers, HttpTransaction};
use serde::{Deserialize, Serialize};
use url::Url;

use super::ExportError;
use crate::http::{MediaKind, decode_body, essence, kind_of};
use crate::serialization::to_json;

/// Schema URL written to `info.schema`.
pub const POSTMAN_SCHEMA: &str =
    "https://schema.getpostman.com/json/collection/v2.1.0/collection.json";

const MAX_NAME_CHARS: usize = 120;
const UNTITLED: &str = "Untitled request";

/// Postman Collection v2.1 exporter.
pub struct PostmanExporter;

impl PostmanExporter {
    /// Export transactions to a Postman collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be serialized.
    pub fn export<'a, I>(
        transactions: I,
        options: &ExportOptions,
    ) -> Result<ExportResult, ExportError>
    where
        I: IntoIterator<Item = &'a HttpTransaction>,
    {
        let collection = Self::collection(transactions, options);
        let count = collection.item.len();
        let content = to_json(&collection, options.pretty_print)?;
        Ok(ExportResult::text(content, ExportFormat::Postman, count))
    }

    /// Build the collection without serializing it.
    pub fn collection<'a, I>(transactions: I, options: &ExportOptions) -> PostmanCollection
    where
        I: IntoIterator<Item = &'a HttpTransaction>,
    {
        PostmanCollection {
            info: PostmanInfo {
                name: options.collection_name.clone(),
                schema: POSTMAN_SCHEMA.to_string(),
            },
            item: transactions.into_iter().map(Self::item).collect(),
        }
    }

    /// Build the request item for one transaction.
    #[must_use]
    pub fn item(transaction: &HttpTransaction) -> PostmanItem {
        let name = item_name(transaction);
        let request = PostmanRequest {
            method: transaction.method.to_ascii_uppercase(),
            header: postman_headers(&transaction.request_headers),
            body: request_body(transaction),
            url: postman_url(&transaction.url),
        };

        let response = transaction
            .status_code
            .map(|code| {
                let content_type = transaction.response_content_type();
                PostmanResponse {
                    name: name.clone(),
                    status: transaction.reason_phrase().to_string(),
                    code,
                    header: postman_headers(&transaction.response_headers),
                    body: decode_body(transaction.response_payload(), content_type)
                        .text_or_placeholder()
                        .into_owned(),
                    preview_language: preview_language(content_type).to_string(),
                }
            })
            .into_iter()
            .collect();

        PostmanItem {
            name,
            request,
            response,
        }
    }
}

fn item_name(transaction: &HttpTransaction) -> String {
    let name = format!("{} {}", transaction.method.to_ascii_uppercase(), transaction.path());
    let name = name.trim();
    if name.is_empty() {
        return UNTITLED.to_string();
    }
    if name.chars().count() > MAX_NAME_CHARS {
        let truncated: String = name.chars().take(MAX_NAME_CHARS - 3).collect();
        return format!("{truncated}...");
    }
    name.to_string()
}

fn postman_headers(headers: &Headers) -> Vec<PostmanHeader> {
    headers
        .iter()
        .map(|h| PostmanHeader {
            key: h.name.clone(),
            value: h.value.clone(),
        })
        .collect()
}

fn postman_url(raw: &str) -> PostmanUrl {
    let Ok(url) = Url::parse(raw) else {
        return PostmanUrl {
            raw: raw.to_string(),
            ..PostmanUrl::default()
        };
    };

    PostmanUrl {
        raw: raw.to_string(),
        protocol: Some(url.scheme().to_string()),
        host: url
            .host_str()
            .map(|host| host.split('.').map(str::to_string).collect())
            .unwrap_or_default(),
        port: url.port().map(|p| p.to_string()),
        path: url
            .path_segments()
            .map(|segments| {
                segments
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
        query: url
            .query_pairs()
            .map(|(key, value)| PostmanQueryParam {
                key: key.into_owned(),
                value: value.into_owned(),
            })
            .collect(),
    }
}

fn request_body(transaction: &HttpTransaction) -> Option<PostmanBody> {
    let bytes = transaction.request_payload()?;
    let content_type = transaction.request_content_type();
    let kind = kind_of(content_type);

    if kind == MediaKind::FormUrlEncoded {
        let fields = serde_urlencoded::from_bytes::<Vec<(String, String)>>(bytes).ok()?;
        return Some(PostmanBody {
            mode: "urlencoded".to_string(),
            raw: None,
            urlencoded: Some(
                fields
                    .into_iter()
                    .map(|(key, value)| PostmanQueryParam { key, value })
                    .collect(),
            ),
            options: None,
        });
    }

    let language = match kind {
        MediaKind::Json => "json",
        MediaKind::Xml => "xml",
        MediaKind::Text => "text",
        MediaKind::FormUrlEncoded
        | MediaKind::Multipart
        | MediaKind::Binary
        | MediaKind::Unknown => return None,
    };
    let text = decode_body(Some(bytes), content_type).as_text()?.to_string();

    Some(PostmanBody {
        mode: "raw".to_string(),
        raw: Some(text),
        urlencoded: None,
        options: Some(PostmanBodyOptions {
            raw: PostmanRawOptions {
                language: language.to_string(),
            },
        }),
    })
}

fn preview_language(content_type: Option<&str>) -> &'static str {
    match kind_of(content_type) {
        MediaKind::Json => "json",
        MediaKind::Xml => "xml",
        MediaKind::Text if content_type.and_then(essence).as_deref() == Some("text/html") => {
            "html"
        }
        _ => "text",
    }
}

// Postman collection structs

/// Collection root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostmanCollection {
    /// Collection metadata.
    pub info: PostmanInfo,
    /// One item per exported transaction.
    pub item: Vec<PostmanItem>,
}

/// Collection metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostmanInfo {
    /// Collection name.
    pub name: String,
    /// Collection schema URL.
    pub schema: String,
}

/// A request item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostmanItem {
    /// Display name, `METHOD path`.
    pub name: String,
    /// The request.
    pub request: PostmanRequest,
    /// Saved example responses.
    #[serde(default)]
    pub response: Vec<PostmanResponse>,
}

/// A request definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostmanRequest {
    /// HTTP method.
    pub method: String,
    /// Request headers.
    #[serde(default)]
    pub header: Vec<PostmanHeader>,
    /// Request body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<PostmanBody>,
    /// Request URL.
    pub url: PostmanUrl,
}

/// Key/value header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostmanHeader {
    /// Header name.
    pub key: String,
    /// Header value.
    pub value: String,
}

/// Structured URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostmanUrl {
    /// The URL as captured.
    pub raw: String,
    /// Scheme without `://`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    /// Host labels.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub host: Vec<String>,
    /// Explicit port.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
    /// Path segments.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<String>,
    /// Query parameters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub query: Vec<PostmanQueryParam>,
}

/// Key/value pair used for query and form fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostmanQueryParam {
    /// Field name.
    pub key: String,
    /// Field value.
    pub value: String,
}

/// Request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostmanBody {
    /// Body mode: `raw` or `urlencoded`.
    pub mode: String,
    /// Raw body text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    /// Form fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urlencoded: Option<Vec<PostmanQueryParam>>,
    /// Raw mode options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<PostmanBodyOptions>,
}

/// Body options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostmanBodyOptions {
    /// Raw mode options.
    pub raw: PostmanRawOptions,
}

/// Raw body options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostmanRawOptions {
    /// Editor language: `json`, `xml` or `text`.
    pub language: String,
}

/// Saved example response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostmanResponse {
    /// Example name.
    pub name: String,
    /// Reason phrase.
    pub status: String,
    /// Status code.
    pub code: u16,
    /// Response headers.
    #[serde(default)]
    pub header: Vec<PostmanHeader>,
    /// Response body text.
    pub body: String,
    /// Preview language hint.
    #[serde(rename = "_postman_previewlanguage")]
    pub preview_language: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    use super::*;

    fn tx(method: &str, url: &str) -> HttpTransaction {
        HttpTransaction::new(method, url, Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
    }

    #[test]
    fn test_item_url_and_name() {
        let item =
            PostmanExporter::item(&tx("get", "https://api.example.com:8443/v1/users?page=2"));

        assert_eq!(item.name, "GET /v1/users");
        assert_eq!(item.request.method, "GET");
        assert_eq!(item.request.url.raw, "https://api.example.com:8443/v1/users?page=2");
        assert_eq!(item.request.url.protocol.as_deref(), Some("https"));
        assert_eq!(item.request.url.host, vec!["api", "example", "com"]);
        assert_eq!(item.request.url.port.as_deref(), Some("8443"));
        assert_eq!(item.request.url.path, vec!["v1", "users"]);
        assert_eq!(item.request.url.query[0].key, "page");
        assert!(item.response.is_empty());
    }

    #[test]
    fn test_unparseable_url_keeps_raw() {
        let item = PostmanExporter::item(&tx("GET", "not a url"));
        assert_eq!(item.request.url.raw, "not a url");
        assert!(item.request.url.host.is_empty());
    }

    #[test]
    fn test_long_name_is_truncated() {
        let long = format!("https://example.com/{}", "a".repeat(300));
        let item = PostmanExporter::item(&tx("GET", &long));
        assert_eq!(item.name.chars().count(), MAX_NAME_CHARS);
        assert!(item.name.ends_with("..."));
    }

    #[test]
    fn test_json_body_is_raw_mode() {
        let item = PostmanExporter::item(
            &tx("POST", "https://api.example.com/users")
                .with_request_header("Content-Type", "application/json")
                .with_request_body(br#"{"name":"ada"}"#.to_vec()),
        );

        let body = item.request.body.unwrap();
        assert_eq!(body.mode, "raw");
        assert_eq!(body.raw.as_deref(), Some(r#"{"name":"ada"}"#));
        assert_eq!(body.options.unwrap().raw.language, "json");
    }

    #[test]
    fn test_form_body_is_urlencoded_mode() {
        let item = PostmanExporter::item(
            &tx("POST", "https://api.example.com/login")
                .with_request_mime_type("application/x-www-form-urlencoded")
                .with_request_body(b"user=ada&remember=1".to_vec()),
        );

        let body = item.request.body.unwrap();
        assert_eq!(body.mode, "urlencoded");
        let fields = body.urlencoded.unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[1].key, "remember");
    }

    #[test]
    fn test_binary_body_is_omitted() {
        let item = PostmanExporter::item(
            &tx("PUT", "https://api.example.com/avatar")
                .with_request_mime_type("image/png")
                .with_request_body(vec![0x89, 0x50]),
        );
        assert_eq!(item.request.body, None);
    }

    #[test]
    fn test_body_without_known_type_is_omitted() {
        let untyped = PostmanExporter::item(
            &tx("POST", "https://api.example.com/events").with_request_body(b"ping".to_vec()),
        );
        assert_eq!(untyped.request.body, None);

        let vendor = PostmanExporter::item(
            &tx("POST", "https://api.example.com/events")
                .with_request_mime_type("application/vnd.custom")
                .with_request_body(b"ping".to_vec()),
        );
        assert_eq!(vendor.request.body, None);
    }

    #[test]
    fn test_response_example() {
        let item = PostmanExporter::item(
            &tx("GET", "https://api.example.com/users")
                .with_response(200)
                .with_response_header("Content-Type", "application/json")
                .with_response_body(br#"[]"#.to_vec()),
        );

        assert_eq!(item.response.len(), 1);
        let response = &item.response[0];
        assert_eq!(response.code, 200);
        assert_eq!(response.status, "OK");
        assert_eq!(response.body, "[]");
        assert_eq!(response.preview_language, "json");
    }

    #[test]
    fn test_export_empty_collection() {
        let transactions: Vec<HttpTransaction> = Vec::new();
        let options = ExportOptions::default().with_collection_name("Checkout");
        let result = PostmanExporter::export(&transactions, &options).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(result.payload.as_text().unwrap()).unwrap();
        assert_eq!(value["info"]["name"], "Checkout");
        assert_eq!(value["info"]["schema"], POSTMAN_SCHEMA);
        assert_eq!(value["item"], serde_json::json!([]));
        assert_eq!(result.suggested_filename, "postman_collection.json");
    }
}
