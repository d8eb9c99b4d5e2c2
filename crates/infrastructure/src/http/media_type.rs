//! Media type classification.

use mime::Mime;

/// Coarse classification of a media type, used to pick body handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// `application/json` and `+json` suffixes.
    Json,
    /// `application/xml`, `text/xml` and `+xml` suffixes.
    Xml,
    /// `application/x-www-form-urlencoded`.
    FormUrlEncoded,
    /// `multipart/*`.
    Multipart,
    /// Other `text/*` and script types.
    Text,
    /// Images, audio, video, fonts and opaque application payloads.
    Binary,
    /// Anything else, including a missing or unparseable type.
    Unknown,
}

/// Parses a `Content-Type` value.
fn parse(content_type: &str) -> Option<Mime> {
    content_type.trim().parse::<Mime>().ok()
}

/// Returns the media type without parameters, lowercased.
#[must_use]
pub fn essence(content_type: &str) -> Option<String> {
    parse(content_type).map(|m| m.essence_str().to_ascii_lowercase())
}

/// Classifies a `Content-Type` value.
#[must_use]
pub fn kind_of(content_type: Option<&str>) -> MediaKind {
    let Some(essence) = content_type.and_then(essence) else {
        return MediaKind::Unknown;
    };
    let Some((top, sub)) = essence.split_once('/') else {
        return MediaKind::Unknown;
    };

    let suffix = sub.rsplit_once('+').map(|(_, s)| s);
    match (top, sub, suffix) {
        (_, _, Some("json")) | ("application", "json", _) => MediaKind::Json,
        (_, _, Some("xml")) | ("application" | "text", "xml", _) => MediaKind::Xml,
        ("application", "x-www-form-urlencoded", _) => MediaKind::FormUrlEncoded,
        ("multipart", _, _) => MediaKind::Multipart,
        ("text", _, _) | ("application", "javascript", _) => MediaKind::Text,
        ("image" | "audio" | "video" | "font", _, _) => MediaKind::Binary,
        ("application", sub, _) if is_opaque_application(sub) => MediaKind::Binary,
        _ => MediaKind::Unknown,
    }
}

fn is_opaque_application(subtype: &str) -> bool {
    matches!(
        subtype,
        "octet-stream"
            | "pdf"
            | "zip"
            | "gzip"
            | "x-protobuf"
            | "protobuf"
            | "grpc"
            | "x-tar"
            | "wasm"
    )
}
