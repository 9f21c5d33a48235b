//! The Schema Inference Result shape.
//!
//! The proxy never builds one of these itself. The types exist so the strict
//! JSON schema sent to OpenAI, the example in the Gemini prompt, and the
//! opt-in output check all come from one definition.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::ProxyError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaInferenceResult {
    pub tables: Vec<Table>,
    pub relationships: Vec<Relationship>,
    pub notes: Vec<Note>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Table {
    pub name: String,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Relationship {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Note {
    pub severity: String,
    pub message: String,
}

/// Name the schema is registered under in OpenAI's `text.format`.
pub const SCHEMA_NAME: &str = "db_schema";

fn strict_object(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "additionalProperties": false,
        "properties": properties,
        "required": required,
    })
}

fn array_of(items: Value) -> Value {
    json!({ "type": "array", "items": items })
}

/// Strict JSON schema: every object closed, every field required.
pub fn json_schema() -> Value {
    let string = json!({ "type": "string" });

    let table = strict_object(
        json!({ "name": string, "columns": array_of(string.clone()) }),
        &["name", "columns"],
    );
    let relationship = strict_object(
        json!({ "from": string, "to": string, "type": string }),
        &["from", "to", "type"],
    );
    let note = strict_object(
        json!({ "severity": string, "message": string }),
        &["severity", "message"],
    );

    strict_object(
        json!({
            "tables": array_of(table),
            "relationships": array_of(relationship),
            "notes": array_of(note),
        }),
        &["tables", "relationships", "notes"],
    )
}

/// Sample result shown to prompt-steered providers.
pub fn example() -> SchemaInferenceResult {
    SchemaInferenceResult {
        tables: vec![Table {
            name: "users".into(),
            columns: vec!["id".into(), "email".into(), "password_hash".into()],
        }],
        relationships: vec![Relationship {
            from: "orders.user_id".into(),
            to: "users.id".into(),
            kind: "many-to-one".into(),
        }],
        notes: vec![Note {
            severity: "info".into(),
            message: "Passwords should be stored hashed.".into(),
        }],
    }
}

/// Check provider text against the result shape.
///
/// Only used when output validation is switched on; the default path forwards
/// provider text untouched.
pub fn validate(text: &str) -> Result<SchemaInferenceResult, ProxyError> {
    serde_json::from_str(text).map_err(|e| ProxyError::InvalidOutput {
        message: e.to_string(),
        raw: Value::String(text.to_string()),
    })
}
