//! Core types: contacts, output formatting, tracing

pub mod contact;
pub mod format;
pub mod tracing;

pub use contact::{Contact, ContactField};
pub use format::{ContactFormatter, FormatOptions, JsonContact, JsonOutput, ellipsis};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
