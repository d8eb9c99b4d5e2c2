//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the export engine and the services
//! it consumes. Each port is a trait implemented by an adapter in the
//! infrastructure layer.

mod archive_writer;
mod temporary_storage;

pub use archive_writer::{ArchiveEntry, ArchiveError, ArchiveWriter};
pub use temporary_storage::{StorageError, TemporaryStorage};
