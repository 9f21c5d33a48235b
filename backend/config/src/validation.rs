//! Config validation: startup checks with user-friendly messages.

use thiserror::Error;

use crate::defaults::KNOWN_PROVIDERS;
use crate::schema::Config;

/// A config validation error with variable name and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &Config) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_provider(config, &mut report);
    validate_server(config, &mut report);
    validate_urls(config, &mut report);
    report
}

/// The provider must be known. A missing credential is only a warning: the
/// service still starts and answers `/infer-schema` with a configuration error.
fn validate_provider(config: &Config, report: &mut ValidationReport) {
    if !KNOWN_PROVIDERS.contains(&config.provider.as_str()) {
        report.error(
            "DRAFTSCHEMA_PROVIDER",
            format!(
                "Unknown provider '{}'. Use one of: {}",
                config.provider,
                KNOWN_PROVIDERS.join(", ")
            ),
        );
        return;
    }

    if config.selected_api_key().is_none() {
        let var = match config.provider.as_str() {
            "gemini" => "GEMINI_API_KEY",
            _ => "OPENAI_API_KEY",
        };
        report.warn(var, "Not set; inference requests will fail until it is configured");
    }
}

fn validate_server(config: &Config, report: &mut ValidationReport) {
    if config.port == 0 {
        report.warn("PORT", "Port 0 binds an ephemeral port");
    } else if config.port < 1024 {
        report.warn(
            "PORT",
            format!("Port {} requires elevated privileges; consider using a port >= 1024", config.port),
        );
    }
    if config.bind_address.trim().is_empty() {
        report.error("DRAFTSCHEMA_BIND", "Bind address cannot be empty");
    }
}

fn validate_urls(config: &Config, report: &mut ValidationReport) {
    for (var, url) in [
        ("OPENAI_BASE_URL", &config.openai_base_url),
        ("GEMINI_BASE_URL", &config.gemini_base_url),
    ] {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            report.error(var, format!("'{url}' is not an http(s) URL"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_only_warns_about_key() {
        let report = validate(&Config::default());
        assert!(report.is_valid(), "errors: {:?}", report.errors);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].path, "OPENAI_API_KEY");
    }

    #[test]
    fn unknown_provider_is_error() {
        let config = Config {
            provider: "anthropic".into(),
            ..Config::default()
        };
        let report = validate(&config);
        assert!(!report.is_valid());
        assert!(report.errors[0].message.contains("openai, gemini"));
    }

    #[test]
    fn gemini_without_key_warns_about_gemini_var() {
        let config = Config {
            provider: "gemini".into(),
            openai_api_key: Some("sk-present".into()),
            ..Config::default()
        };
        let report = validate(&config);
        assert_eq!(report.warnings[0].path, "GEMINI_API_KEY");
    }

    #[test]
    fn non_http_base_url_is_error() {
        let config = Config {
            openai_api_key: Some("sk".into()),
            gemini_base_url: "ftp://example.com".into(),
            ..Config::default()
        };
        let report = validate(&config);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].path, "GEMINI_BASE_URL");
    }

    #[test]
    fn privileged_port_warns() {
        let config = Config {
            port: 80,
            openai_api_key: Some("sk".into()),
            ..Config::default()
        };
        let report = validate(&config);
        assert!(report.is_valid());
        assert_eq!(report.warnings[0].path, "PORT");
    }
}
