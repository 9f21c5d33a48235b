use async_trait::async_trait;

use crate::design::DesignDocument;
use crate::error::ProxyError;

/// An upstream response forwarded to the caller as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamReply {
    pub status: u16,
    pub body: String,
}

/// Trait for LLM providers that turn a design into schema JSON text.
#[async_trait]
pub trait SchemaProvider: Send + Sync {
    /// Provider name (e.g., "openai", "gemini").
    fn name(&self) -> &str;

    /// Ask the provider for a schema and return its raw output text.
    async fn generate(&self, design: &DesignDocument) -> Result<String, ProxyError>;

    /// Fetch the provider's model catalog.
    async fn list_models(&self) -> Result<UpstreamReply, ProxyError> {
        Err(ProxyError::Unsupported(format!(
            "model listing is not supported by the {} provider",
            self.name()
        )))
    }
}
