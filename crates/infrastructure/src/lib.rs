//! Netexport Infrastructure - Exporters and adapters
//!
//! This crate provides the format exporters, the [`NetworkExporter`]
//! facade and concrete implementations of the ports defined in the
//! application layer.

pub mod adapters;
pub mod export;
pub mod http;
pub mod persistence;
pub mod serialization;

pub use adapters::{TempDirStorage, ZipArchiveWriter};
pub use export::{
    CurlExporter, ExportError, HarExporter, NetworkExporter, OpenApiExporter, PostmanExporter,
};
pub use http::{DecodedBody, MediaKind, decode_body};
pub use persistence::{SettingsError, SettingsRepository};
pub use serialization::{
    SerializationError, from_json_bytes, to_json, to_json_stable, to_json_stable_bytes,
};
