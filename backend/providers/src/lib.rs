//! Schema providers and the registry the service selects one from.

pub mod gemini;
pub mod mock;
pub mod openai;
mod upstream;

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use tracing::info;

use draftschema_config::Config;
use draftschema_core::SchemaProvider;

pub use gemini::GeminiProvider;
pub use mock::MockProvider;
pub use openai::OpenAiProvider;

/// Registry of schema providers, looked up by name.
pub struct ProviderRegistry {
    providers: BTreeMap<String, Arc<dyn SchemaProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self {
            providers: BTreeMap::new(),
        }
    }

    /// Register every built-in provider with the settings from `config`.
    ///
    /// Providers are registered even without a credential; the missing key is
    /// reported per request.
    pub fn from_config(config: &Config) -> Self {
        let mut registry = Self::new();

        let openai = OpenAiProvider::new(config.openai_api_key.clone())
            .with_base_url(&config.openai_base_url)
            .with_model(&config.openai_model);
        registry.register("openai", Arc::new(openai));

        let gemini = GeminiProvider::new(config.gemini_api_key.clone())
            .with_base_url(&config.gemini_base_url)
            .with_model(&config.gemini_model);
        registry.register("gemini", Arc::new(gemini));

        registry
    }

    /// Register a provider by name.
    pub fn register(&mut self, name: impl Into<String>, provider: Arc<dyn SchemaProvider>) {
        self.providers.insert(name.into(), provider);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn SchemaProvider>> {
        self.providers.get(name).cloned()
    }

    /// Pick the provider the service will use; unknown names are an error.
    pub fn select(&self, name: &str) -> Result<Arc<dyn SchemaProvider>> {
        let provider = self.get(name).ok_or_else(|| {
            anyhow!(
                "unknown provider '{}', expected one of: {}",
                name,
                self.list().join(", ")
            )
        })?;
        info!(provider = %name, "Selected schema provider");
        Ok(provider)
    }

    /// Get all registered provider names, sorted.
    pub fn list(&self) -> Vec<String> {
        self.providers.keys().cloned().collect()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
