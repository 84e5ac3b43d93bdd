//! Server-Sent Events (SSE) decoding for streamed Messages API responses.
//!
//! The body is a sequence of frames separated by a blank line, each with a
//! `data:` line holding one JSON event. Frames are cut from a byte buffer so
//! a multi-byte character split across network chunks is reassembled
//! before decoding.

use futures::{Stream, StreamExt};
use serde::Deserialize;
use std::pin::Pin;
use std::task::{Context, Poll};
use tracing::{debug, warn};

use super::errors::ClaudeApiError;

/// Streamed event from the Messages API
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum StreamEvent {
    /// Content block delta (incremental update)
    #[serde(rename = "content_block_delta")]
    ContentBlockDelta { index: usize, delta: Delta },

    /// Message-level update carrying the stop reason
    #[serde(rename = "message_delta")]
    MessageDelta { delta: MessageDeltaData },

    /// Message stop event
    #[serde(rename = "message_stop")]
    MessageStop,

    /// Error event
    #[serde(rename = "error")]
    Error { error: ErrorData },

    /// `message_start`, `content_block_start`, `ping` and anything newer
    #[serde(other)]
    Other,
}

/// Content delta for streaming updates
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum Delta {
    #[serde(rename = "text_delta")]
    TextDelta { text: String },

    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MessageDeltaData {
    #[serde(default)]
    pub stop_reason: Option<String>,
}

/// Error data from stream
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ErrorData {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
}

/// Decodes a raw response body into [`StreamEvent`]s
pub struct SseEventStream<S> {
    inner: S,
    buffer: Vec<u8>,
    exhausted: bool,
}

impl<S> SseEventStream<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            buffer: Vec::new(),
            exhausted: false,
        }
    }

    /// Remove and return the next complete frame, if the buffer holds one
    fn next_frame(&mut self) -> Option<Vec<u8>> {
        let end = self.buffer.windows(2).position(|w| w == b"\n\n")?;
        let frame: Vec<u8> = self.buffer.drain(..end + 2).collect();
        Some(frame)
    }
}

/// Parse one SSE frame. `None` for frames without a JSON payload.
pub fn parse_frame(frame: &[u8]) -> Option<Result<StreamEvent, ClaudeApiError>> {
    let text = String::from_utf8_lossy(frame);
    let data: Vec<&str> = text
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter_map(|line| line.strip_prefix("data:"))
        .map(str::trim_start)
        .collect();

    if data.is_empty() {
        return None;
    }
    let payload = data.join("\n");
    if payload.trim().is_empty() || payload.trim() == "[DONE]" {
        return None;
    }

    match serde_json::from_str::<StreamEvent>(&payload) {
        Ok(event) => Some(Ok(event)),
        Err(err) => {
            warn!(error = %err, data = %payload, "failed to parse SSE event");
            Some(Err(ClaudeApiError::JsonError(err)))
        }
    }
}

impl<S, B> Stream for SseEventStream<S>
where
    S: Stream<Item = Result<B, reqwest::Error>> + Unpin,
    B: AsRef<[u8]>,
{
    type Item = Result<StreamEvent, ClaudeApiError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            while let Some(frame) = this.next_frame() {
                if let Some(event) = parse_frame(&frame) {
                    return Poll::Ready(Some(event));
                }
            }

            if this.exhausted {
                if this.buffer.iter().all(u8::is_ascii_whitespace) {
                    this.buffer.clear();
                    return Poll::Ready(None);
                }
                let rest = std::mem::take(&mut this.buffer);
                return Poll::Ready(parse_frame(&rest));
            }

            match this.inner.poll_next_unpin(cx) {
                Poll::Ready(Some(Ok(chunk))) => {
                    this.buffer.extend_from_slice(chunk.as_ref());
                }
                Poll::Ready(Some(Err(err))) => {
                    this.exhausted = true;
                    this.buffer.clear();
                    return Poll::Ready(Some(Err(ClaudeApiError::NetworkError(err))));
                }
                Poll::Ready(None) => {
                    debug!("SSE body finished");
                    this.exhausted = true;
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

/// Reduce an event stream to its text fragments.
///
/// `error` events become [`ClaudeApiError::StreamError`]; other non-text
/// events are skipped.
pub fn text_fragments<S>(events: S) -> impl Stream<Item = Result<String, ClaudeApiError>>
where
    S: Stream<Item = Result<StreamEvent, ClaudeApiError>>,
{
    events.filter_map(|event| async move {
        match event {
            Ok(StreamEvent::ContentBlockDelta {
                delta: Delta::TextDelta { text },
                ..
            }) if !text.is_empty() => Some(Ok(text)),
            Ok(StreamEvent::Error { error }) => Some(Err(ClaudeApiError::StreamError {
                error_type: error.error_type,
                message: error.message,
            })),
            Ok(_) => None,
            Err(err) => Some(Err(err)),
        }
    })
}
