//! Request bodies sent to the upstream `/chat/completions` endpoint.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::RequestDefaults;
use crate::translate::inbound::{ChatMessage, InboundChatRequest, LegacyCompletionRequest};

/// Upstream chat request with every required field filled in.
///
/// Optional sampling fields are serialized only when the caller supplied
/// them; nothing is ever sent as an explicit `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundChatRequest {
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<ChatMessage>>,
    pub temperature: f64,
    pub max_tokens: u32,
    pub stream: bool,
    pub reasoning_display: bool,
    pub thinking_mode: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning_effort: Option<Value>,
}

impl OutboundChatRequest {
    /// Apply `defaults` to an inbound chat request.
    pub fn from_inbound(inbound: InboundChatRequest, defaults: &RequestDefaults) -> Self {
        Self {
            model: non_empty(inbound.model).unwrap_or_else(|| defaults.model.clone()),
            messages: inbound.messages,
            temperature: inbound.temperature.unwrap_or(defaults.temperature),
            // Zero means "unset" to callers that send a falsy placeholder.
            max_tokens: inbound
                .max_tokens
                .filter(|&n| n > 0)
                .unwrap_or(defaults.max_tokens),
            stream: inbound.stream.unwrap_or(false),
            reasoning_display: inbound.reasoning_display.unwrap_or(false),
            thinking_mode: inbound.thinking_mode.unwrap_or(false),
            top_p: inbound.top_p,
            frequency_penalty: inbound.frequency_penalty,
            presence_penalty: inbound.presence_penalty,
            stop: inbound.stop,
            reasoning_effort: inbound.reasoning_effort,
        }
    }
}

/// Upstream chat request built from a legacy text completion.
///
/// `passthrough` is flattened onto the object; the typed fields always win
/// because conflicting keys are removed before serialization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
    #[serde(flatten)]
    pub passthrough: Map<String, Value>,
}

impl OutboundCompletionRequest {
    const TYPED_FIELDS: [&'static str; 3] = ["model", "messages", "stream"];

    /// Wrap the prompt as a single user turn. The relay never streams legacy
    /// completions, so `stream` is pinned to false.
    pub fn from_legacy(legacy: LegacyCompletionRequest, defaults: &RequestDefaults) -> Self {
        let mut passthrough = legacy.passthrough;
        for key in Self::TYPED_FIELDS {
            passthrough.remove(key);
        }

        let message = ChatMessage {
            role: Some("user".to_string()),
            content: legacy.prompt.map(Value::String),
            extra: Map::new(),
        };

        Self {
            model: non_empty(legacy.model).unwrap_or_else(|| defaults.model.clone()),
            messages: vec![message],
            stream: false,
            passthrough,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn chat(body: Value) -> Value {
        let inbound: InboundChatRequest = serde_json::from_value(body).unwrap();
        serde_json::to_value(OutboundChatRequest::from_inbound(
            inbound,
            &RequestDefaults::default(),
        ))
        .unwrap()
    }

    fn legacy(body: Value) -> Value {
        let inbound: LegacyCompletionRequest = serde_json::from_value(body).unwrap();
        serde_json::to_value(OutboundCompletionRequest::from_legacy(
            inbound,
            &RequestDefaults::default(),
        ))
        .unwrap()
    }

    #[test]
    fn bare_request_gets_every_default() {
        let out = chat(json!({"messages": [{"role": "user", "content": "hello"}]}));
        assert_eq!(
            out,
            json!({
                "model": "meta/llama-3.1-405b-instruct",
                "messages": [{"role": "user", "content": "hello"}],
                "temperature": 0.7,
                "max_tokens": 1024,
                "stream": false,
                "reasoning_display": false,
                "thinking_mode": false
            })
        );
    }

    #[test]
    fn zero_temperature_is_forwarded() {
        let out = chat(json!({"messages": [], "temperature": 0}));
        assert_eq!(out["temperature"], json!(0.0));
    }

    #[test]
    fn explicit_values_win_over_defaults() {
        let out = chat(json!({
            "model": "nvidia/nemotron",
            "messages": [],
            "temperature": 1.3,
            "max_tokens": 77,
            "stream": true,
            "reasoning_display": true,
            "thinking_mode": true
        }));
        assert_eq!(out["model"], "nvidia/nemotron");
        assert_eq!(out["temperature"], json!(1.3));
        assert_eq!(out["max_tokens"], 77);
        assert_eq!(out["stream"], true);
        assert_eq!(out["reasoning_display"], true);
        assert_eq!(out["thinking_mode"], true);
    }

    #[test]
    fn zero_max_tokens_falls_back_to_default() {
        let out = chat(json!({"messages": [], "max_tokens": 0}));
        assert_eq!(out["max_tokens"], 1024);
    }

    #[test]
    fn optional_fields_present_only_when_supplied() {
        const OPTIONAL: [&str; 5] = [
            "top_p",
            "frequency_penalty",
            "presence_penalty",
            "stop",
            "reasoning_effort",
        ];

        let absent = chat(json!({"messages": []}));
        for key in OPTIONAL {
            assert!(absent.get(key).is_none(), "{key} should be absent");
        }

        let present = chat(json!({
            "messages": [],
            "top_p": 0.9,
            "frequency_penalty": 0.0,
            "presence_penalty": -0.5,
            "stop": ["\n\n", "END"],
            "reasoning_effort": "high"
        }));
        assert_eq!(present["top_p"], json!(0.9));
        assert_eq!(present["frequency_penalty"], json!(0.0));
        assert_eq!(present["presence_penalty"], json!(-0.5));
        assert_eq!(present["stop"], json!(["\n\n", "END"]));
        assert_eq!(present["reasoning_effort"], "high");
    }

    #[test]
    fn unknown_chat_fields_are_dropped() {
        let out = chat(json!({"messages": [], "logit_bias": {"50256": -100}}));
        assert!(out.get("logit_bias").is_none());
    }

    #[test]
    fn empty_model_uses_default() {
        let out = chat(json!({"model": "", "messages": []}));
        assert_eq!(out["model"], "meta/llama-3.1-405b-instruct");
    }

    #[test]
    fn missing_messages_are_not_sent_as_null() {
        let out = chat(json!({}));
        assert!(out.get("messages").is_none());
    }

    #[test]
    fn legacy_prompt_becomes_single_user_message() {
        let out = legacy(json!({"prompt": "hi", "model": "x"}));
        assert_eq!(
            out,
            json!({
                "model": "x",
                "messages": [{"role": "user", "content": "hi"}],
                "stream": false
            })
        );
    }

    #[test]
    fn legacy_passthrough_is_merged_without_overriding_typed_fields() {
        let out = legacy(json!({
            "prompt": "hi",
            "max_tokens": 16,
            "stop": "\n",
            "messages": [{"role": "system", "content": "ignored"}],
            "stream": true
        }));
        assert_eq!(out["model"], "meta/llama-3.1-405b-instruct");
        assert_eq!(out["messages"], json!([{"role": "user", "content": "hi"}]));
        assert_eq!(out["stream"], false);
        assert_eq!(out["max_tokens"], 16);
        assert_eq!(out["stop"], "\n");
        assert!(out.get("temperature").is_none());
    }

    #[test]
    fn legacy_without_prompt_sends_message_without_content() {
        let out = legacy(json!({"model": "x"}));
        assert_eq!(out["messages"], json!([{"role": "user"}]));
    }
}
