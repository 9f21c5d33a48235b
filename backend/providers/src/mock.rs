use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use draftschema_core::{DesignDocument, ProxyError, SchemaProvider, UpstreamReply};

type Responder = dyn Fn() -> Result<String, ProxyError> + Send + Sync;

/// A mock provider that returns canned output and counts calls.
pub struct MockProvider {
    name: String,
    responder: Arc<Responder>,
    catalog: Option<UpstreamReply>,
    calls: Arc<AtomicUsize>,
}

impl MockProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            responder: Arc::new(|| {
                Ok::<_, ProxyError>(r#"{"tables":[],"relationships":[],"notes":[]}"#.to_string())
            }),
            catalog: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        let response = response.into();
        self.responder = Arc::new(move || Ok::<_, ProxyError>(response.clone()));
        self
    }

    /// Fail every call with the error built by `make_error`.
    pub fn with_error<F>(mut self, make_error: F) -> Self
    where
        F: Fn() -> ProxyError + Send + Sync + 'static,
    {
        self.responder = Arc::new(move || Err::<String, _>(make_error()));
        self
    }

    pub fn with_catalog(mut self, status: u16, body: impl Into<String>) -> Self {
        self.catalog = Some(UpstreamReply {
            status,
            body: body.into(),
        });
        self
    }

    /// Shared counter of `generate` calls.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl SchemaProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, _design: &DesignDocument) -> Result<String, ProxyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.responder)()
    }

    async fn list_models(&self) -> Result<UpstreamReply, ProxyError> {
        self.catalog.clone().ok_or_else(|| {
            ProxyError::Unsupported(format!(
                "model listing is not supported by the {} provider",
                self.name
            ))
        })
    }
}
