use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Caller-supplied JSON describing UI screens.
///
/// No shape is enforced; the document is only serialized into the provider
/// prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DesignDocument(pub Value);

impl DesignDocument {
    /// Compact JSON text embedded in provider requests.
    pub fn to_json_string(&self) -> String {
        self.0.to_string()
    }
}

impl From<Value> for DesignDocument {
    fn from(value: Value) -> Self {
        Self(value)
    }
}
