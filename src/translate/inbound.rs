//! OpenAI-style request bodies as received from callers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A chat message.
///
/// Nothing here is interpreted; a message missing `role` is the upstream's
/// problem to reject. Content may be a string or an array of parts, and any
/// other fields (`name`, `tool_calls`, `tool_call_id`, ...) are kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of `POST /v1/chat/completions`. Fields not listed here are dropped.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundChatRequest {
    pub model: Option<String>,
    pub messages: Option<Vec<ChatMessage>>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub stream: Option<bool>,
    pub top_p: Option<f64>,
    pub frequency_penalty: Option<f64>,
    pub presence_penalty: Option<f64>,
    /// A single stop string or an array of them.
    pub stop: Option<Value>,
    pub reasoning_display: Option<bool>,
    pub thinking_mode: Option<bool>,
    pub reasoning_effort: Option<Value>,
}

/// Body of the legacy `POST /v1/completions` endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LegacyCompletionRequest {
    pub prompt: Option<String>,
    pub model: Option<String>,
    /// Everything else, forwarded verbatim.
    #[serde(flatten)]
    pub passthrough: Map<String, Value>,
}
