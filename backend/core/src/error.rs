use serde_json::Value;
use thiserror::Error;

/// Every way a single inference request can fail.
///
/// Each variant carries enough to render the `{ "error", "raw" }` body the
/// HTTP layer returns, and [`ProxyError::status_code`] decides the status.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Missing {var}")]
    MissingCredential { var: &'static str },

    /// The provider answered with a non-success status.
    ///
    /// `status` is the code the proxy should answer with: providers that
    /// mirror upstream failures set it to the upstream code, the others
    /// leave it at 500.
    #[error("{provider} returned {upstream_status}: {message}")]
    Upstream {
        provider: String,
        upstream_status: u16,
        status: u16,
        message: String,
        raw: Value,
    },

    #[error("{provider} request failed: {message}")]
    Transport { provider: String, message: String },

    #[error("No {field}")]
    MissingOutput {
        provider: String,
        field: &'static str,
        raw: Value,
    },

    #[error("provider output does not match the schema: {message}")]
    InvalidOutput { message: String, raw: Value },

    #[error("{0}")]
    Unsupported(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ProxyError {
    /// HTTP status the proxy answers with for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            ProxyError::Upstream { status, .. } => *status,
            ProxyError::Unsupported(_) => 404,
            ProxyError::MissingCredential { .. }
            | ProxyError::Transport { .. }
            | ProxyError::MissingOutput { .. }
            | ProxyError::InvalidOutput { .. }
            | ProxyError::Internal(_) => 500,
        }
    }

    /// Provider payload attached for diagnostics, if any.
    pub fn raw(&self) -> Option<&Value> {
        match self {
            ProxyError::Upstream { raw, .. }
            | ProxyError::MissingOutput { raw, .. }
            | ProxyError::InvalidOutput { raw, .. } => Some(raw),
            _ => None,
        }
    }

    /// The JSON body sent back to the caller.
    pub fn to_body(&self) -> Value {
        let mut body = serde_json::json!({ "error": self.to_string() });
        if let Some(raw) = self.raw() {
            body["raw"] = raw.clone();
        }
        body
    }
}

/// Parse an upstream body as JSON, falling back to the plain string.
pub fn raw_payload(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_credential_is_internal_error() {
        let err = ProxyError::MissingCredential {
            var: "OPENAI_API_KEY",
        };
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.to_body(), json!({ "error": "Missing OPENAI_API_KEY" }));
    }

    #[test]
    fn upstream_error_uses_chosen_status_and_attaches_raw() {
        let err = ProxyError::Upstream {
            provider: "gemini".into(),
            upstream_status: 429,
            status: 429,
            message: "Too Many Requests".into(),
            raw: json!({ "error": { "code": 429 } }),
        };
        assert_eq!(err.status_code(), 429);
        let body = err.to_body();
        assert_eq!(body["raw"]["error"]["code"], 429);
        assert!(body["error"].as_str().unwrap().contains("gemini returned 429"));
    }

    #[test]
    fn missing_output_names_the_field() {
        let err = ProxyError::MissingOutput {
            provider: "openai".into(),
            field: "output_text",
            raw: json!({ "id": "resp_1" }),
        };
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.to_body()["error"], "No output_text");
        assert_eq!(err.to_body()["raw"]["id"], "resp_1");
    }

    #[test]
    fn internal_error_has_no_raw() {
        let err = ProxyError::from(anyhow::anyhow!("boom"));
        assert_eq!(err.status_code(), 500);
        assert!(err.to_body().get("raw").is_none());
        assert_eq!(err.to_body()["error"], "boom");
    }

    #[test]
    fn raw_payload_falls_back_to_string() {
        assert_eq!(raw_payload(r#"{"a":1}"#), json!({ "a": 1 }));
        assert_eq!(raw_payload("bad gateway"), json!("bad gateway"));
    }
}
