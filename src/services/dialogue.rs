//! Persona-conditioned Socratic dialogue.
//!
//! A [`DialoguePolicy`] owns the transcript for one participant working on
//! one problem. The user turn is always appended before the gateway is
//! called, so a failed call still leaves the participant's message on
//! record.

use futures::{Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tracing::{debug, instrument};

use crate::domain::models::{Persona, Problem, Transcript, Turn};
use crate::domain::ports::{ChatGateway, ChatMessage, ChatRequest, GatewayError, TextStream};
use crate::services::prompts::{tutor_instruction, wrap_with_draft};

pub const DEFAULT_DIALOGUE_TEMPERATURE: f32 = 0.7;

pub struct DialoguePolicy {
    gateway: Arc<dyn ChatGateway>,
    persona: Persona,
    problem: Problem,
    instruction: String,
    transcript: Transcript,
    temperature: f32,
}

impl DialoguePolicy {
    pub fn new(gateway: Arc<dyn ChatGateway>, persona: Persona, problem: Problem) -> Self {
        let instruction = tutor_instruction(persona, &problem);
        Self {
            gateway,
            persona,
            problem,
            instruction,
            transcript: Transcript::new(),
            temperature: DEFAULT_DIALOGUE_TEMPERATURE,
        }
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn persona(&self) -> Persona {
        self.persona
    }

    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Participant turns so far; greetings are not counted
    pub fn turn_count(&self) -> usize {
        self.transcript.user_turns()
    }

    /// Append and return the persona's fixed greeting. No model call is made.
    pub fn initial_greeting(&mut self) -> String {
        let greeting = self.persona.greeting().to_string();
        self.transcript.push(Turn::assistant(greeting.clone()));
        greeting
    }

    /// Switch to a new problem with an empty transcript
    pub fn set_problem(&mut self, problem: Problem) {
        self.instruction = tutor_instruction(self.persona, &problem);
        self.problem = problem;
        self.transcript = Transcript::new();
    }

    /// Send the participant's message and record the tutor's reply.
    #[instrument(skip_all, fields(problem_id = self.problem.id, persona = %self.persona, has_draft = code_draft.is_some()))]
    pub async fn respond(&mut self, message: &str, code_draft: Option<&str>) -> Result<String, GatewayError> {
        let request = self.push_user_turn(message, code_draft);
        let reply = self.gateway.complete(request).await?;
        debug!(reply_len = reply.len(), "tutor replied");
        self.transcript.push(Turn::assistant(reply.clone()));
        Ok(reply)
    }

    /// Like [`respond`](Self::respond), but yields the reply as it arrives.
    ///
    /// The reply is appended to the transcript only when the returned stream
    /// has been drained to the end.
    #[instrument(skip_all, fields(problem_id = self.problem.id, persona = %self.persona, has_draft = code_draft.is_some()))]
    pub async fn respond_streaming(
        &mut self,
        message: &str,
        code_draft: Option<&str>,
    ) -> Result<ReplyStream<'_>, GatewayError> {
        let request = self.push_user_turn(message, code_draft);
        let inner = self.gateway.stream(request).await?;
        Ok(ReplyStream {
            inner,
            transcript: &mut self.transcript,
            buffer: String::new(),
            done: false,
        })
    }

    fn push_user_turn(&mut self, message: &str, code_draft: Option<&str>) -> ChatRequest {
        self.transcript
            .push(Turn::user(wrap_with_draft(message, code_draft)));
        let messages = self
            .transcript
            .turns()
            .iter()
            .map(|t| ChatMessage::new(t.role, t.content.clone()))
            .collect();
        ChatRequest::new(self.instruction.clone(), messages, self.temperature)
    }
}

/// Tutor reply delivered fragment by fragment.
///
/// Holds the policy's transcript until dropped. When the underlying stream
/// ends, the concatenated fragments are appended as one assistant turn. A
/// stream that is dropped early or fails records nothing.
pub struct ReplyStream<'a> {
    inner: TextStream,
    transcript: &'a mut Transcript,
    buffer: String,
    done: bool,
}

impl ReplyStream<'_> {
    /// Text received so far
    pub fn text(&self) -> &str {
        &self.buffer
    }

    /// Drain the stream, handing each fragment to `on_fragment`, and return the full reply
    pub async fn drain<F>(mut self, mut on_fragment: F) -> Result<String, GatewayError>
    where
        F: FnMut(&str),
    {
        while let Some(fragment) = self.next().await {
            on_fragment(&fragment?);
        }
        Ok(std::mem::take(&mut self.buffer))
    }
}

impl Stream for ReplyStream<'_> {
    type Item = Result<String, GatewayError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.done {
            return Poll::Ready(None);
        }
        match this.inner.as_mut().poll_next(cx) {
            Poll::Ready(Some(Ok(fragment))) => {
                this.buffer.push_str(&fragment);
                Poll::Ready(Some(Ok(fragment)))
            }
            Poll::Ready(Some(Err(err))) => {
                this.done = true;
                Poll::Ready(Some(Err(err)))
            }
            Poll::Ready(None) => {
                this.done = true;
                debug!(reply_len = this.buffer.len(), "tutor reply stream complete");
                this.transcript.push(Turn::assistant(this.buffer.clone()));
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
