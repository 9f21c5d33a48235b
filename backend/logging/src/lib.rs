//! Structured logging for Draftschema.
//!
//! Sets up the global `tracing` subscriber and scrubs provider credentials
//! from strings before they are logged.

pub mod logger;
pub mod redact;

pub use logger::init_logger;
pub use redact::redact_sensitive_data;
