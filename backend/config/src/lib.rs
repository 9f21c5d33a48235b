//! `draftschema-config`: runtime configuration for the inference proxy.
//!
//! Provides:
//! - Typed `Config` read once from environment variables
//! - `.env` loading for local development
//! - Startup validation report
//! - Config redaction for safe logging

pub mod defaults;
pub mod redact;
pub mod schema;
pub mod validation;

pub use redact::{mask, redact};
pub use schema::{Config, LogFormat};
pub use validation::{validate, ConfigValidationError, ValidationReport};

/// Load a `.env` file from the working directory, if one exists.
///
/// Variables already present in the process environment win.
pub fn load_dotenv() -> Option<std::path::PathBuf> {
    dotenvy::dotenv().ok()
}

/// Validate `config` and log every warning and error found.
pub fn check(config: &Config) -> ValidationReport {
    let report = validate(config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }
    report
}
