//! HTTP payload utilities.
//!
//! This module provides:
//! - Best-effort body decoding with a placeholder for binary payloads
//! - Media type classification shared by the exporters

mod body_decoder;
mod media_type;

pub use body_decoder::{DecodedBody, decode_body};
pub use media_type::{MediaKind, essence, kind_of};
