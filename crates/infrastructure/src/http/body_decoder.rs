//! Best-effort body decoding.
//!
//! Decoding never fails: bytes that cannot be read as text become a
//! [`DecodedBody::Binary`] and render as a byte-count placeholder.

use std::borrow::Cow;

use encoding_rs::{Encoding, UTF_8};

use super::media_type::{MediaKind, kind_of};

/// Outcome of decoding a captured payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedBody {
    /// No payload, or a zero-length one.
    Empty,
    /// Payload decoded to text.
    Text(String),
    /// Payload that is not text.
    Binary {
        /// Payload length in bytes.
        len: usize,
    },
}

impl DecodedBody {
    /// Returns the decoded text, if any.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Empty | Self::Binary { .. } => None,
        }
    }

    /// Returns true if there was no payload.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Returns the text, or a placeholder describing the payload.
    #[must_use]
    pub fn text_or_placeholder(&self) -> Cow<'_, str> {
        match self {
            Self::Empty => Cow::Borrowed(""),
            Self::Text(text) => Cow::Borrowed(text),
            Self::Binary { len } => Cow::Owned(placeholder(*len)),
        }
    }
}

fn placeholder(len: usize) -> String {
    if len == 1 {
        "<binary body: 1 byte>".to_string()
    } else {
        format!("<binary body: {len} bytes>")
    }
}

/// Decodes `bytes` using the charset hints in `content_type`.
///
/// Order: BOM, `charset` parameter, then strict UTF-8. Known binary media
/// types are not decoded at all.
#[must_use]
pub fn decode_body(bytes: Option<&[u8]>, content_type: Option<&str>) -> DecodedBody {
    let Some(bytes) = bytes.filter(|b| !b.is_empty()) else {
        return DecodedBody::Empty;
    };

    if kind_of(content_type) == MediaKind::Binary {
        return DecodedBody::Binary { len: bytes.len() };
    }

    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        return decode_with(bytes, bom_len, encoding);
    }

    let declared = content_type
        .and_then(charset_label)
        .and_then(|label| Encoding::for_label(label.as_bytes()));

    decode_with(bytes, 0, declared.unwrap_or(UTF_8))
}

fn charset_label(content_type: &str) -> Option<String> {
    let mime = content_type.trim().parse::<mime::Mime>().ok()?;
    mime.get_param(mime::CHARSET).map(|v| v.as_str().to_string())
}

fn decode_with(bytes: &[u8], skip: usize, encoding: &'static Encoding) -> DecodedBody {
    let (text, had_errors) = encoding.decode_without_bom_handling(&bytes[skip..]);
    if had_errors || text.contains('\0') {
        return DecodedBody::Binary { len: bytes.len() };
    }
    DecodedBody::Text(text.into_owned())
}
