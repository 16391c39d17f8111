//! Wire types for the registry's tool test endpoints.
//!
//! This module provides types for:
//! - The common reply envelope returned by both endpoints
//! - The body submitted when saving a verified test record

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Reply envelope shared by `POST /api/tools/{id}/test` and
/// `POST /api/tools/{id}/test/save`.
///
/// Every field is optional: the registry omits what it does not set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryReply {
    /// Primary success flag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,

    /// Alternate success marker (`"success"` means success)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Value>,

    /// Human-readable message
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub message: Option<String>,

    /// Error text used by failure replies
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub error: Option<String>,

    /// Detail payload of the tool invocation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RegistryReply {
    /// Decode a reply body. Anything but a JSON object is rejected.
    pub fn from_body(body: Value) -> Result<Self, String> {
        match body {
            Value::Object(_) => serde_json::from_value(body).map_err(|e| e.to_string()),
            Value::Array(_) => Err("expected a JSON object, got an array".to_string()),
            other => Err(format!("expected a JSON object, got {}", other)),
        }
    }

    /// Whether the reply reports application-level success.
    pub fn is_success(&self) -> bool {
        self.success == Some(true)
            || matches!(&self.status, Some(Value::String(status)) if status == "success")
    }

    /// Best message for a failed reply: `message`, then `error`.
    pub fn failure_message(&self) -> Option<String> {
        non_empty(&self.message).or_else(|| non_empty(&self.error))
    }

    /// `message` if non-empty.
    pub fn success_message(&self) -> Option<String> {
        non_empty(&self.message)
    }
}

/// Accepts any JSON for a text field; non-strings are shown as JSON.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text),
        Some(other) => Some(other.to_string()),
    })
}

fn non_empty(text: &Option<String>) -> Option<String> {
    text.as_ref().filter(|t| !t.is_empty()).cloned()
}

/// Body of the record save request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRecordRequest {
    /// Exact parameters the verified test ran with
    pub test_parameters: Value,

    /// Detail payload the verified test returned
    pub test_result: Value,
}
