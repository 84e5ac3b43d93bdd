use async_trait::async_trait;
use futures::StreamExt;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::{header, Client as ReqwestClient, Response};
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use super::errors::ClaudeApiError;
use super::retry::RetryPolicy;
use super::streaming::{text_fragments, SseEventStream};
use super::types::{MessageRequest, MessageResponse};
use crate::domain::models::AnthropicConfig;
use crate::domain::ports::{ChatGateway, ChatRequest, GatewayError, TextStream};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Configuration for the Claude HTTP client
#[derive(Debug, Clone)]
pub struct ClaudeClientConfig {
    /// Anthropic API key
    pub api_key: String,

    /// Base URL for the Claude API
    pub base_url: String,

    /// Model used for every request
    pub model: String,

    /// Applied when a request does not set its own bound
    pub default_max_tokens: u32,

    /// Rate limit in requests per second
    pub requests_per_second: u32,

    /// Maximum retry attempts
    pub max_retries: u32,

    /// Initial backoff delay in milliseconds
    pub initial_backoff_ms: u64,

    /// Maximum backoff delay in milliseconds
    pub max_backoff_ms: u64,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl From<&AnthropicConfig> for ClaudeClientConfig {
    fn from(config: &AnthropicConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            default_max_tokens: config.max_tokens,
            requests_per_second: config.requests_per_second,
            max_retries: config.max_retries,
            initial_backoff_ms: config.initial_backoff_ms,
            max_backoff_ms: config.max_backoff_ms,
            timeout_secs: config.timeout_secs,
        }
    }
}

impl Default for ClaudeClientConfig {
    fn default() -> Self {
        Self::from(&AnthropicConfig::default())
    }
}

/// Chat gateway backed by the Anthropic Messages API
///
/// Requests are paced by a token bucket and transient failures are retried
/// with exponential backoff. For streamed replies only opening the stream is
/// retried; a failure mid-stream is surfaced to the caller.
pub struct ClaudeGateway {
    http_client: ReqwestClient,
    base_url: String,
    model: String,
    default_max_tokens: u32,
    rate_limiter: DefaultDirectRateLimiter,
    retry_policy: RetryPolicy,
}

impl ClaudeGateway {
    pub fn new(config: ClaudeClientConfig) -> Result<Self, ClaudeApiError> {
        if config.api_key.trim().is_empty() {
            return Err(ClaudeApiError::Configuration(
                "API key is not set (anthropic.api_key or ANTHROPIC_API_KEY)".to_string(),
            ));
        }

        info!(
            base_url = %config.base_url,
            model = %config.model,
            rate_limit_rps = config.requests_per_second,
            timeout_secs = config.timeout_secs,
            api_key = %redact_api_key(&config.api_key),
            "initializing Claude API client"
        );

        let mut headers = header::HeaderMap::new();
        let mut api_key = header::HeaderValue::from_str(&config.api_key)
            .map_err(|e| ClaudeApiError::Configuration(format!("invalid API key: {e}")))?;
        api_key.set_sensitive(true);
        headers.insert("x-api-key", api_key);
        headers.insert(
            "anthropic-version",
            header::HeaderValue::from_static(ANTHROPIC_VERSION),
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let http_client = ReqwestClient::builder()
            .pool_max_idle_per_host(10)
            .timeout(Duration::from_secs(config.timeout_secs))
            .tcp_nodelay(true)
            .default_headers(headers)
            .build()?;

        let rps = NonZeroU32::new(config.requests_per_second).ok_or_else(|| {
            ClaudeApiError::Configuration("requests_per_second must be positive".to_string())
        })?;

        Ok(Self {
            http_client,
            base_url: config.base_url,
            model: config.model,
            default_max_tokens: config.default_max_tokens,
            rate_limiter: RateLimiter::direct(Quota::per_second(rps)),
            retry_policy: RetryPolicy::new(
                config.max_retries,
                config.initial_backoff_ms,
                config.max_backoff_ms,
            ),
        })
    }

    /// Send a non-streaming request and return the parsed response
    #[instrument(skip(self, request), fields(model = %request.model, max_tokens = request.max_tokens))]
    pub async fn send_message(&self, request: &MessageRequest) -> Result<MessageResponse, ClaudeApiError> {
        let result = self
            .retry_policy
            .execute(|| async {
                self.rate_limiter.until_ready().await;
                let response = self.post(request).await?;
                Ok::<_, ClaudeApiError>(response.json::<MessageResponse>().await?)
            })
            .await;

        match &result {
            Ok(response) => debug!(
                input_tokens = response.usage.input_tokens,
                output_tokens = response.usage.output_tokens,
                "message request succeeded"
            ),
            Err(err) => warn!(error = %err, "message request failed"),
        }
        result
    }

    /// Open a streaming request, retrying only until the response headers arrive
    #[instrument(skip(self, request), fields(model = %request.model))]
    pub async fn open_stream(&self, request: &MessageRequest) -> Result<Response, ClaudeApiError> {
        self.retry_policy
            .execute(|| async {
                self.rate_limiter.until_ready().await;
                self.post(request).await
            })
            .await
    }

    async fn post(&self, request: &MessageRequest) -> Result<Response, ClaudeApiError> {
        let url = format!("{}/v1/messages", self.base_url);
        debug!(%url, "POST");

        let response = self
            .http_client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    ClaudeApiError::Timeout
                } else {
                    ClaudeApiError::NetworkError(err)
                }
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error body".to_string());
        warn!(%status, %body, "API error");
        Err(ClaudeApiError::from_status(status, body))
    }

    fn message_request(&self, request: ChatRequest) -> MessageRequest {
        MessageRequest::from_chat(&self.model, self.default_max_tokens, request)
    }
}

#[async_trait]
impl ChatGateway for ClaudeGateway {
    async fn complete(&self, request: ChatRequest) -> Result<String, GatewayError> {
        let request = self.message_request(request);
        let response = self.send_message(&request).await?;
        let text = response.text();
        if text.is_empty() {
            return Err(ClaudeApiError::EmptyResponse.into());
        }
        Ok(text)
    }

    async fn stream(&self, request: ChatRequest) -> Result<TextStream, GatewayError> {
        let request = self.message_request(request).streaming();
        let response = self.open_stream(&request).await?;
        let events = SseEventStream::new(Box::pin(response.bytes_stream()));
        Ok(Box::pin(
            text_fragments(events).map(|item| item.map_err(GatewayError::from)),
        ))
    }
}

/// First 8 characters of the key followed by a redaction marker
pub fn redact_api_key(api_key: &str) -> String {
    match api_key.get(..8) {
        Some(prefix) if api_key.len() > 8 => format!("{prefix}...[REDACTED]"),
        _ => "[REDACTED]".to_string(),
    }
}
