//! Deterministic JSON serialization for exported documents and settings.
//!
//! Output is stable across calls:
//! - Object keys follow struct field order or `BTreeMap` ordering
//! - 2-space indentation when pretty printing
//! - Trailing newline on pretty output

mod json;

pub use json::*;
