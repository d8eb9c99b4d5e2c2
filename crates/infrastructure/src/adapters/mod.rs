//! Adapter implementations of the application ports.

mod temp_dir_storage;
mod zip_archive_writer;

pub use temp_dir_storage::TempDirStorage;
pub use zip_archive_writer::ZipArchiveWriter;
