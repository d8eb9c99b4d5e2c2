//! Netexport Domain - Core types
//!
//! This crate defines the captured transaction model, the export format
//! table and the filter policy. All types here are pure Rust with no I/O
//! dependencies.

pub mod error;
pub mod export;
pub mod filter;
pub mod settings;
pub mod transaction;

pub use error::{DomainError, DomainResult};
pub use export::{
    ExportFormat, ExportOptions, ExportPayload, ExportResult, ExportWarning, WarningSeverity,
};
pub use filter::{ExclusionReason, ExportFilter};
pub use settings::{ExportSettings, FilterSettings};
pub use transaction::{Header, Headers, HttpTransaction, StatusCode, TransactionError};
