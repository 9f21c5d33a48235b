//! Config redaction: produce safe-to-log config snapshots by masking secrets.

use serde_json::Value;

use crate::schema::Config;

/// Keys whose values are credentials.
static SENSITIVE_KEYS: &[&str] = &[
    "apiKey",
    "api_key",
    "openai_api_key",
    "gemini_api_key",
    "token",
    "secret",
    "password",
];

fn is_sensitive_key(key: &str) -> bool {
    SENSITIVE_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key))
}

/// Mask a secret, keeping the first four characters as a hint.
pub fn mask(secret: &str) -> String {
    if secret.chars().count() > 8 {
        format!("{}***", secret.chars().take(4).collect::<String>())
    } else {
        "***".to_string()
    }
}

/// Redact a JSON value, replacing every sensitive string with a masked hint.
pub fn redact(value: &Value) -> Value {
    redact_recursive(value, "")
}

fn redact_recursive(value: &Value, key: &str) -> Value {
    match value {
        Value::String(s) if is_sensitive_key(key) && !s.is_empty() => Value::String(mask(s)),
        Value::Array(arr) => Value::Array(arr.iter().map(|v| redact_recursive(v, key)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), redact_recursive(v, k)))
                .collect(),
        ),
        other => other.clone(),
    }
}

impl Config {
    /// Config as JSON with credentials masked, for startup logging.
    pub fn redacted(&self) -> Value {
        serde_json::to_value(self)
            .map(|v| redact(&v))
            .unwrap_or(Value::Null)
    }
}
