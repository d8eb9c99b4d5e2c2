//! Netexport Application - Ports and use cases
//!
//! This crate defines the collaborator interfaces the export engine relies
//! on and the use case that materializes an export result.

pub mod ports;
pub mod use_cases;

pub use ports::{ArchiveEntry, ArchiveError, ArchiveWriter, StorageError, TemporaryStorage};
pub use use_cases::SaveExport;
