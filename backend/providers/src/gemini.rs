use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use draftschema_core::prompt::single_prompt;
use draftschema_core::{DesignDocument, ProxyError, SchemaProvider, UpstreamReply};

use crate::upstream::{read_body, transport, upstream_failure};

pub use draftschema_config::defaults::{
    DEFAULT_GEMINI_BASE_URL as DEFAULT_BASE_URL, DEFAULT_GEMINI_MODEL as DEFAULT_MODEL,
};
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";
pub const API_KEY_HEADER: &str = "x-goog-api-key";

/// Google Gemini provider. Output shape is steered by the prompt only, with a
/// JSON mime-type hint.
pub struct GeminiProvider {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl GeminiProvider {
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

    /// Accepts both `gemini-2.0-flash` and the catalog form `models/gemini-2.0-flash`.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        let model = model.into();
        self.model = model
            .strip_prefix("models/")
            .map(str::to_string)
            .unwrap_or(model);
        self
    }

    fn api_key(&self) -> Result<&str, ProxyError> {
        self.api_key
            .as_deref()
            .ok_or(ProxyError::MissingCredential { var: API_KEY_VAR })
    }

    fn build_request(&self, design: &DesignDocument) -> GenerateRequest {
        GenerateRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(single_prompt(design)),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
            },
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: Option<String>,
}

/// Text of the first part of the first candidate, if non-empty.
fn extract_text(raw: &Value) -> Option<String> {
    raw.pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl SchemaProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, design: &DesignDocument) -> Result<String, ProxyError> {
        let api_key = self.api_key()?;
        let start = Instant::now();
        let body = self.build_request(design);

        debug!(model = %self.model, "Sending request to Gemini");

        let response = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, self.model
            ))
            .header(API_KEY_HEADER, api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport(self.name(), e))?;

        let (status, text) = read_body(self.name(), response).await?;
        if !status.is_success() {
            return Err(upstream_failure(self.name(), status, &text, true));
        }

        let raw = draftschema_core::error::raw_payload(&text);
        let output = extract_text(&raw).ok_or_else(|| ProxyError::MissingOutput {
            provider: self.name().to_string(),
            field: "text in candidates[0].content.parts[0]",
            raw,
        })?;

        info!(
            model = %self.model,
            latency_ms = start.elapsed().as_millis() as u64,
            bytes = output.len(),
            "Gemini responded"
        );

        Ok(output)
    }

    async fn list_models(&self) -> Result<UpstreamReply, ProxyError> {
        let api_key = self.api_key()?;

        let response = self
            .client
            .get(format!("{}/v1beta/models", self.base_url))
            .header(API_KEY_HEADER, api_key)
            .send()
            .await
            .map_err(|e| transport(self.name(), e))?;

        let (status, body) = read_body(self.name(), response).await?;
        debug!(status = status.as_u16(), "Gemini model catalog fetched");

        Ok(UpstreamReply {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_asks_for_json_mime_type() {
        let provider = GeminiProvider::new(Some("key".into()));
        let design = DesignDocument::from(json!({"screens": [{"name": "Login"}]}));
        let body = serde_json::to_value(provider.build_request(&design)).unwrap();

        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        let contents = body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 1);
        let prompt = contents[0]["parts"][0]["text"].as_str().unwrap();
        assert!(prompt.contains(r#"{"screens":[{"name":"Login"}]}"#));
    }

    #[test]
    fn extracts_first_candidate_text() {
        let raw = json!({
            "candidates": [
                { "content": { "role": "model", "parts": [{ "text": "{\"tables\":[]}" }, { "text": "ignored" }] } },
                { "content": { "parts": [{ "text": "second" }] } }
            ]
        });
        assert_eq!(extract_text(&raw).as_deref(), Some("{\"tables\":[]}"));
    }

    #[test]
    fn malformed_later_candidates_are_ignored() {
        let raw = json!({
            "candidates": [
                { "content": { "parts": [{ "text": "{\"tables\":[]}" }, { "inlineData": 7 }] } },
                { "content": "not an object" },
                42
            ]
        });
        assert_eq!(extract_text(&raw).as_deref(), Some("{\"tables\":[]}"));
    }

    #[test]
    fn missing_candidates_or_parts_is_none() {
        assert!(extract_text(&json!({})).is_none());
        assert!(extract_text(&json!({ "candidates": [] })).is_none());
        assert!(extract_text(&json!({ "candidates": [{ "finishReason": "SAFETY" }] })).is_none());
        assert!(extract_text(&json!({ "candidates": [{ "content": { "parts": [] } }] })).is_none());
        assert!(extract_text(&json!({ "candidates": [{ "content": { "parts": [{ "text": "" }] } }] })).is_none());
        assert!(extract_text(&json!({ "candidates": null })).is_none());
    }

    #[test]
    fn model_prefix_is_stripped() {
        let provider = GeminiProvider::new(None).with_model("models/gemini-1.5-pro");
        assert_eq!(provider.model, "gemini-1.5-pro");
    }

    #[tokio::test]
    async fn list_models_requires_key() {
        let provider = GeminiProvider::new(None).with_base_url("http://127.0.0.1:9");
        let err = provider.list_models().await.unwrap_err();
        assert_eq!(err.to_string(), "Missing GEMINI_API_KEY");
    }
}
