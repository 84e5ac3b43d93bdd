//! Chat-completion port.
//!
//! The dialogue policy and the judge reach the language model only through
//! [`ChatGateway`]. Implementations own transport concerns such as retries,
//! pacing and authentication; callers see a single request and a single
//! outcome.
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;
use thiserror::Error;

use crate::domain::models::Role;

/// Errors surfaced by a chat-completion provider
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Provider rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Provider rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Stream interrupted: {0}")]
    Stream(String),

    #[error("Gateway misconfigured: {0}")]
    Configuration(String),
}

/// A single role-tagged message sent to the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }
}

/// Provider-neutral chat-completion request
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    /// System instruction
    pub system: String,
    /// Ordered conversation turns
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    /// Provider default when `None`
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    pub fn new(system: impl Into<String>, messages: Vec<ChatMessage>, temperature: f32) -> Self {
        Self {
            system: system.into(),
            messages,
            temperature,
            max_tokens: None,
        }
    }

    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Incremental response text; the concatenation of all items is the full reply
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, GatewayError>> + Send>>;

/// Chat-completion capability
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Return the complete response text
    async fn complete(&self, request: ChatRequest) -> Result<String, GatewayError>;

    /// Return the response as a stream of text fragments
    async fn stream(&self, request: ChatRequest) -> Result<TextStream, GatewayError>;
}
