//! Request and response types for the Claude Messages API
use serde::{Deserialize, Serialize};

use crate::domain::ports::{ChatMessage, ChatRequest};

/// Message request to send to Claude API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRequest {
    /// Model identifier
    pub model: String,

    /// Array of messages in the conversation
    pub messages: Vec<Message>,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// System prompt (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Temperature for sampling (0.0-1.0, optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Enable streaming (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

impl MessageRequest {
    /// Translate a provider-neutral request, falling back to `default_max_tokens`
    pub fn from_chat(model: &str, default_max_tokens: u32, request: ChatRequest) -> Self {
        let system = (!request.system.is_empty()).then_some(request.system);
        Self {
            model: model.to_string(),
            messages: request.messages.into_iter().map(Message::from).collect(),
            max_tokens: request.max_tokens.unwrap_or(default_max_tokens),
            system,
            temperature: Some(request.temperature),
            stream: None,
        }
    }

    #[must_use]
    pub fn streaming(mut self) -> Self {
        self.stream = Some(true);
        self
    }
}

/// A single message in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// "user" or "assistant"
    pub role: String,
    pub content: String,
}

impl From<ChatMessage> for Message {
    fn from(message: ChatMessage) -> Self {
        Self {
            role: message.role.as_str().to_string(),
            content: message.content,
        }
    }
}

/// Content block in a response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    /// Any block type the tutor does not consume (tool use, thinking, ...)
    #[serde(other)]
    Other,
}

/// Response from Claude API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Unique message ID
    pub id: String,

    /// Array of content blocks in the response
    pub content: Vec<ContentBlock>,

    /// Model that generated the response
    pub model: String,

    /// Reason for stopping generation
    #[serde(default)]
    pub stop_reason: Option<StopReason>,

    /// Token usage statistics
    #[serde(default)]
    pub usage: Usage,
}

impl MessageResponse {
    /// Concatenated text of all text blocks
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                ContentBlock::Other => None,
            })
            .collect()
    }
}

/// Reason why message generation stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EndTurn,
    MaxTokens,
    StopSequence,
    ToolUse,
    #[serde(other)]
    Other,
}

/// Token usage statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::Role;

    #[test]
    fn test_message_request_serialization() {
        let chat = ChatRequest::new(
            "be brief",
            vec![ChatMessage::new(Role::User, "Hello")],
            0.7,
        );
        let request = MessageRequest::from_chat("claude-test", 1024, chat);

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "claude-test");
        assert_eq!(json["max_tokens"], 1024);
        assert_eq!(json["system"], "be brief");
        assert_eq!(json["messages"][0]["role"], "user");
        assert!(json.get("stream").is_none());
    }

    #[test]
    fn test_explicit_max_tokens_wins() {
        let chat = ChatRequest::new("", vec![], 0.3).with_max_tokens(10);
        let request = MessageRequest::from_chat("m", 1024, chat).streaming();
        assert_eq!(request.max_tokens, 10);
        assert!(request.system.is_none());
        assert_eq!(request.stream, Some(true));
    }

    #[test]
    fn test_response_text_skips_other_blocks() {
        let body = r#"{
            "id": "msg_1",
            "type": "message",
            "role": "assistant",
            "model": "claude-test",
            "content": [
                {"type": "thinking", "thinking": "hmm"},
                {"type": "text", "text": "CORR"},
                {"type": "text", "text": "ECT"}
            ],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 5, "output_tokens": 2}
        }"#;
        let response: MessageResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.text(), "CORRECT");
        assert_eq!(response.stop_reason, Some(StopReason::EndTurn));
    }
}
