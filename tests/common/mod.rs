//! Common test utilities for integration tests
//!
//! Provides a scripted chat gateway, an in-memory session store and fixture
//! problems shared across the integration test files.

#![allow(dead_code)]

use async_trait::async_trait;
use futures::stream;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Mutex;

use socratic_tutor::domain::errors::{DomainError, DomainResult};
use socratic_tutor::domain::models::{ExperimentSession, Problem, SessionDocument};
use socratic_tutor::domain::ports::{ChatGateway, ChatRequest, GatewayError, SessionStore, TextStream};

/// One scripted provider outcome
#[derive(Debug, Clone)]
pub enum Scripted {
    /// Whole reply; streamed as a single fragment
    Reply(String),
    /// Reply delivered in these fragments
    Fragments(Vec<String>),
    /// Fragments followed by a mid-stream failure
    BrokenStream(Vec<String>, GatewayError),
    /// Request fails before any output
    Fail(GatewayError),
}

/// Gateway that replays a script and records every request it receives
#[derive(Default)]
pub struct ScriptedGateway {
    script: Mutex<VecDeque<Scripted>>,
    fallback: Option<String>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedGateway {
    pub fn new(script: impl IntoIterator<Item = Scripted>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Replies from a list of plain strings
    pub fn replies(replies: &[&str]) -> Self {
        Self::new(replies.iter().map(|r| Scripted::Reply((*r).to_string())))
    }

    /// Answer every request with `reply` once the script runs out
    pub fn always(reply: &str) -> Self {
        Self {
            fallback: Some(reply.to_string()),
            ..Self::default()
        }
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn next(&self, request: ChatRequest) -> Scripted {
        self.requests.lock().unwrap().push(request);
        match self.script.lock().unwrap().pop_front() {
            Some(step) => step,
            None => match &self.fallback {
                Some(reply) => Scripted::Reply(reply.clone()),
                None => Scripted::Fail(GatewayError::Unavailable("script exhausted".to_string())),
            },
        }
    }
}

#[async_trait]
impl ChatGateway for ScriptedGateway {
    async fn complete(&self, request: ChatRequest) -> Result<String, GatewayError> {
        match self.next(request) {
            Scripted::Reply(text) => Ok(text),
            Scripted::Fragments(parts) => Ok(parts.concat()),
            Scripted::BrokenStream(_, err) | Scripted::Fail(err) => Err(err),
        }
    }

    async fn stream(&self, request: ChatRequest) -> Result<TextStream, GatewayError> {
        let items: Vec<Result<String, GatewayError>> = match self.next(request) {
            Scripted::Reply(text) => vec![Ok(text)],
            Scripted::Fragments(parts) => parts.into_iter().map(Ok).collect(),
            Scripted::BrokenStream(parts, err) => {
                let mut items: Vec<_> = parts.into_iter().map(Ok).collect();
                items.push(Err(err));
                items
            }
            Scripted::Fail(err) => return Err(err),
        };
        Ok(Box::pin(stream::iter(items)))
    }
}

/// Session store that keeps every saved snapshot in memory
#[derive(Default)]
pub struct MemorySessionStore {
    snapshots: Mutex<Vec<SessionDocument>>,
}

impl MemorySessionStore {
    pub fn save_count(&self) -> usize {
        self.snapshots.lock().unwrap().len()
    }

    pub fn latest(&self) -> Option<SessionDocument> {
        self.snapshots.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn save(&self, session: &ExperimentSession) -> DomainResult<PathBuf> {
        self.snapshots.lock().unwrap().push(session.to_document());
        Ok(PathBuf::from(format!("{}.json", session.session_id)))
    }

    async fn load(&self, session_id: &str) -> DomainResult<SessionDocument> {
        self.snapshots
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|doc| doc.session_id == session_id)
            .cloned()
            .ok_or_else(|| DomainError::Storage(format!("no session {session_id}")))
    }
}

/// A small valid problem with the given id
pub fn problem(id: u32) -> Problem {
    Problem {
        id,
        description: format!("Problem {id}: return the sum of a list of integers."),
        buggy_code: "def total(xs):\n    result = 0\n    for x in xs[1:]:\n        result += x\n    return result".to_string(),
        bug_description: "The loop skips the first element.".to_string(),
        expected_fixes: vec!["Iterate over xs instead of xs[1:]".to_string()],
        unit_tests: vec![
            "assert total([1, 2, 3]) == 6".to_string(),
            "assert total([]) == 0".to_string(),
        ],
        example_dialogue: None,
    }
}

/// Problems with ids 1..=n
pub fn problems(n: u32) -> Vec<Problem> {
    (1..=n).map(problem).collect()
}

/// Tagged problem file text
pub fn tagged_problem_text() -> String {
    [
        "<problem>",
        "Write a function `search(x, seq)` that returns the index of x in seq.",
        "</problem>",
        "<bug_code>",
        "1. def search(x, seq):",
        "2.     for i in range(len(seq)):",
        "3.         if x < seq[i]:",
        "4.             return i",
        "5.     return len(seq)",
        "</bug_code>",
        "<bug_desc>",
        "On line 3, the comparison should be <= rather than <.",
        "</bug_desc>",
        "<bug_fixes>",
        "Replace `<` with `<=` on line 3",
        "</bug_fixes>",
        "<unit_tests>",
        "assert search(5, [1, 5, 8]) == 1",
        "assert search(9, [1, 5, 8]) == 3",
        "</unit_tests>",
    ]
    .join("\n")
}
