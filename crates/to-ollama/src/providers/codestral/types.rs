//! Codestral FIM and Ollama generate wire types.
//!
//! Notes:
//! - `stop` may be a single string or a list; it is accepted via an
//!   `#[serde(untagged)]` enum and always forwarded to Ollama as a list.
//! - Optional fields are skipped on serialization so that nothing the client
//!   omitted reaches Ollama as `null`.
//! - Unknown fields are ignored on both sides.

use serde::{Deserialize, Serialize};

pub const TEXT_COMPLETION: &str = "text_completion";

/// Request body for `POST /v1/fim/completions`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FimRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<StopSequences>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub random_seed: Option<i64>,
}

/// Either a single stop string or an ordered list of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StopSequences {
    One(String),
    Many(Vec<String>),
}

impl StopSequences {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            StopSequences::One(s) => vec![s],
            StopSequences::Many(v) => v,
        }
    }
}

/// Request body for Ollama's `POST /api/generate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    pub stream: bool,
    pub options: GenerateOptions,
}

/// Sampling options. Only the fields the client supplied are present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerateOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_predict: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
}

/// Ollama `/api/generate` response.
///
/// The same shape arrives once for non-streaming calls and once per NDJSON
/// line for streaming calls (`done` is false on all but the final line).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_eval_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eval_count: Option<u64>,
}

/// Response body for `POST /v1/fim/completions` (non-streaming).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FimResponse {
    pub id: String,
    pub object: String,
    pub model: String,
    pub created: i64,
    pub choices: Vec<FimChoice>,
    pub usage: Usage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FimChoice {
    pub index: u32,
    pub text: String,
    /// Always serialized; `null` on intermediate stream frames.
    pub finish_reason: Option<String>,
}

/// Token usage info.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

/// One `data:` frame of a streaming FIM response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FimChunk {
    pub id: String,
    pub object: String,
    pub model: String,
    pub created: i64,
    pub choices: Vec<FimChoice>,
}

/// Response body for `GET /v1/models`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelList {
    pub object: String,
    pub data: Vec<ModelCard>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelCard {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub owned_by: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fim_request_accepts_single_or_list_stop() {
        let single: FimRequest =
            serde_json::from_value(json!({"prompt": "x", "stop": "\n\n"})).unwrap();
        assert_eq!(single.stop, Some(StopSequences::One("\n\n".to_string())));

        let list: FimRequest =
            serde_json::from_value(json!({"prompt": "x", "stop": ["a", "b"]})).unwrap();
        assert_eq!(
            list.stop,
            Some(StopSequences::Many(vec!["a".to_string(), "b".to_string()]))
        );
    }

    #[test]
    fn fim_request_ignores_unknown_fields() {
        let req: FimRequest = serde_json::from_value(json!({
            "prompt": "def f():",
            "min_tokens": 3,
            "tool_choice": "auto"
        }))
        .unwrap();
        assert_eq!(req.prompt, "def f():");
        assert!(req.model.is_none());
    }

    #[test]
    fn fim_request_requires_prompt() {
        let err = serde_json::from_value::<FimRequest>(json!({"suffix": "x"})).unwrap_err();
        assert!(err.to_string().contains("prompt"));
    }

    #[test]
    fn generate_response_ignores_ollama_extras() {
        let resp: GenerateResponse = serde_json::from_value(json!({
            "model": "codestral:latest",
            "created_at": "2024-06-01T12:00:00Z",
            "response": "",
            "done": true,
            "context": [1, 2, 3],
            "total_duration": 123456
        }))
        .unwrap();
        assert!(resp.done);
        assert_eq!(resp.done_reason, None);
    }

    #[test]
    fn intermediate_choice_serializes_null_finish_reason() {
        let choice = FimChoice {
            index: 0,
            text: "x".to_string(),
            finish_reason: None,
        };
        let v = serde_json::to_value(choice).unwrap();
        assert!(v["finish_reason"].is_null());
        assert!(v.as_object().unwrap().contains_key("finish_reason"));
    }
}
