//! Application use cases.

mod save_export;

pub use save_export::*;
