//! CLI Doctor Command
//!
//! Checks the environment configuration without starting the server.

use anyhow::Result;
use draftschema_config::{validate, Config};

/// Print the validation report. Returns whether the config is usable.
pub fn run(config: &Config) -> Result<bool> {
    println!("\n🔍 Running Draftschema Doctor...\n");

    println!("Configuration:");
    println!("{}\n", serde_json::to_string_pretty(&config.redacted())?);

    let report = validate(config);
    for error in &report.errors {
        println!("  🔴 {}: {}", error.path, error.message);
    }
    for warning in &report.warnings {
        println!("  🟡 {}: {}", warning.path, warning.message);
    }
    if report.errors.is_empty() && report.warnings.is_empty() {
        println!("  🟢 {} provider is configured", config.provider);
    }

    println!();
    if report.is_valid() {
        println!("✅ Configuration is valid.");
    } else {
        println!("❌ Some checks failed! Please fix the errors above.");
    }

    Ok(report.is_valid())
}
