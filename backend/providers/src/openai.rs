use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use draftschema_core::prompt::{SYSTEM_INSTRUCTION, TASK_INSTRUCTION};
use draftschema_core::{schema, DesignDocument, ProxyError, SchemaProvider};

use crate::upstream::{read_body, transport, upstream_failure};

pub use draftschema_config::defaults::{
    DEFAULT_OPENAI_BASE_URL as DEFAULT_BASE_URL, DEFAULT_OPENAI_MODEL as DEFAULT_MODEL,
};
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// OpenAI Responses API provider with structured (JSON schema) output.
pub struct OpenAiProvider {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl OpenAiProvider {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn build_request(&self, design: &DesignDocument) -> ResponsesRequest {
        ResponsesRequest {
            model: self.model.clone(),
            input: vec![
                InputMessage::new("system", SYSTEM_INSTRUCTION),
                InputMessage::new("user", TASK_INSTRUCTION),
                InputMessage::new("user", design.to_json_string()),
            ],
            text: TextConfig {
                format: TextFormat {
                    kind: "json_schema",
                    name: schema::SCHEMA_NAME,
                    strict: true,
                    schema: schema::json_schema(),
                },
            },
        }
    }
}

#[derive(Serialize)]
struct ResponsesRequest {
    model: String,
    input: Vec<InputMessage>,
    text: TextConfig,
}

#[derive(Serialize)]
struct InputMessage {
    role: &'static str,
    content: String,
}

impl InputMessage {
    fn new(role: &'static str, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[derive(Serialize)]
struct TextConfig {
    format: TextFormat,
}

#[derive(Serialize)]
struct TextFormat {
    #[serde(rename = "type")]
    kind: &'static str,
    name: &'static str,
    strict: bool,
    schema: Value,
}

/// Pull the assembled output text out of a Responses API envelope.
///
/// Prefers the `output_text` convenience field and falls back to joining the
/// `output_text` content parts of the `output` items. Items or parts of any
/// other shape are skipped.
fn extract_output_text(raw: &Value) -> Option<String> {
    if let Some(text) = raw
        .get("output_text")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
    {
        return Some(text.to_string());
    }

    let joined: String = raw
        .get("output")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|item| item.get("content").and_then(Value::as_array))
        .flatten()
        .filter(|part| part.get("type").and_then(Value::as_str) == Some("output_text"))
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();

    (!joined.is_empty()).then_some(joined)
}

#[async_trait]
impl SchemaProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(&self, design: &DesignDocument) -> Result<String, ProxyError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProxyError::MissingCredential { var: API_KEY_VAR })?;

        let start = Instant::now();
        let body = self.build_request(design);

        debug!(model = %self.model, "Sending request to OpenAI");

        let response = self
            .client
            .post(format!("{}/v1/responses", self.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport(self.name(), e))?;

        let (status, text) = read_body(self.name(), response).await?;
        if !status.is_success() {
            return Err(upstream_failure(self.name(), status, &text, false));
        }

        let raw = draftschema_core::error::raw_payload(&text);
        let output = extract_output_text(&raw).ok_or_else(|| ProxyError::MissingOutput {
            provider: self.name().to_string(),
            field: "output_text",
            raw,
        })?;

        info!(
            model = %self.model,
            latency_ms = start.elapsed().as_millis() as u64,
            bytes = output.len(),
            "OpenAI responded"
        );

        Ok(output)
    }
}
