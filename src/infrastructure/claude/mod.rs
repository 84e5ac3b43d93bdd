//! Anthropic Messages API adapter for the `ChatGateway` port

pub mod client;
pub mod errors;
pub mod retry;
pub mod streaming;
pub mod types;

pub use client::{ClaudeClientConfig, ClaudeGateway};
pub use errors::ClaudeApiError;
pub use retry::RetryPolicy;
