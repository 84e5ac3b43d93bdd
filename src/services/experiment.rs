//! Experiment flow for one participant.
//!
//! Problems are presented in order. Each problem's dialogue runs until the
//! participant submits a fix; the submission is judged and recorded, then
//! the runner moves to the next problem or closes the session. The session
//! is persisted after every exchange.

use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Evaluation, ExperimentSession, JudgeConfig, Persona, Problem, Role};
use crate::domain::ports::{ChatGateway, GatewayError, SessionStore};
use crate::services::dialogue::{DialoguePolicy, DEFAULT_DIALOGUE_TEMPERATURE};
use crate::services::judge::SelfConsistencyJudge;

/// Per-participant settings
#[derive(Debug, Clone)]
pub struct RunnerSettings {
    pub participant_id: String,
    pub persona: Persona,
    pub judge: JudgeConfig,
    pub dialogue_temperature: f32,
}

impl RunnerSettings {
    pub fn new(participant_id: impl Into<String>, persona: Persona) -> Self {
        Self {
            participant_id: participant_id.into(),
            persona,
            judge: JudgeConfig::default(),
            dialogue_temperature: DEFAULT_DIALOGUE_TEMPERATURE,
        }
    }
}

/// Final figures reported when the last problem has been judged
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub solved: usize,
    pub total: usize,
    pub success_rate: f64,
    pub average_turns: f64,
}

/// What happened after a submission was judged
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    /// Moved on; `greeting` opens the next problem
    Next {
        evaluation: Evaluation,
        problem_id: u32,
        greeting: String,
    },
    /// That was the last problem
    Completed {
        evaluation: Evaluation,
        summary: SessionSummary,
    },
}

impl SubmissionOutcome {
    pub fn evaluation(&self) -> &Evaluation {
        match self {
            Self::Next { evaluation, .. } | Self::Completed { evaluation, .. } => evaluation,
        }
    }
}

pub struct ExperimentRunner {
    problems: Vec<Problem>,
    policy: DialoguePolicy,
    judge: SelfConsistencyJudge,
    session: ExperimentSession,
    store: Arc<dyn SessionStore>,
}

impl ExperimentRunner {
    pub fn new(
        gateway: Arc<dyn ChatGateway>,
        problems: Vec<Problem>,
        store: Arc<dyn SessionStore>,
        settings: RunnerSettings,
    ) -> DomainResult<Self> {
        let first = problems.first().cloned().ok_or(DomainError::NoProblems)?;
        let policy = DialoguePolicy::new(Arc::clone(&gateway), settings.persona, first)
            .with_temperature(settings.dialogue_temperature);
        let judge = SelfConsistencyJudge::new(gateway, settings.judge);
        let session = ExperimentSession::new(settings.participant_id, settings.persona);

        Ok(Self {
            problems,
            policy,
            judge,
            session,
            store,
        })
    }

    pub fn session(&self) -> &ExperimentSession {
        &self.session
    }

    pub fn policy(&self) -> &DialoguePolicy {
        &self.policy
    }

    pub fn total_problems(&self) -> usize {
        self.problems.len()
    }

    /// 1-based position of the active problem
    pub fn position(&self) -> usize {
        self.session.current_problem_index + 1
    }

    pub fn is_complete(&self) -> bool {
        self.session.is_finished()
    }

    /// The problem being worked on, or `None` once the session is closed
    pub fn current_problem(&self) -> Option<&Problem> {
        if self.is_complete() {
            None
        } else {
            Some(self.policy.problem())
        }
    }

    /// Greet the participant on the first problem and persist the new session.
    #[instrument(skip(self), fields(session_id = %self.session.session_id))]
    pub async fn start(&mut self) -> DomainResult<String> {
        self.ensure_active()?;
        let greeting = self.policy.initial_greeting();
        let problem_id = self.policy.problem().id;
        self.session
            .record_turn(problem_id, Role::Assistant, greeting.clone());
        let path = self.store.save(&self.session).await?;
        info!(path = %path.display(), persona = %self.session.persona, "experiment session started");
        Ok(greeting)
    }

    /// Send one participant message and return the tutor's reply
    pub async fn send(&mut self, message: &str, code_draft: Option<&str>) -> DomainResult<String> {
        self.ensure_active()?;
        let problem_id = self.policy.problem().id;
        self.session.record_turn(problem_id, Role::User, message);

        let result = self.policy.respond(message, code_draft).await;
        self.finish_exchange(problem_id, result).await
    }

    /// Streaming variant of [`send`](Self::send); `on_fragment` sees each piece as it arrives
    pub async fn send_streaming<F>(
        &mut self,
        message: &str,
        code_draft: Option<&str>,
        on_fragment: F,
    ) -> DomainResult<String>
    where
        F: FnMut(&str) + Send,
    {
        self.ensure_active()?;
        let problem_id = self.policy.problem().id;
        self.session.record_turn(problem_id, Role::User, message);

        let result = match self.policy.respond_streaming(message, code_draft).await {
            Ok(stream) => stream.drain(on_fragment).await,
            Err(err) => Err(err),
        };
        self.finish_exchange(problem_id, result).await
    }

    /// Judge the submitted code, record it, and advance.
    #[instrument(skip(self, code), fields(session_id = %self.session.session_id))]
    pub async fn submit(&mut self, code: &str) -> DomainResult<SubmissionOutcome> {
        self.ensure_active()?;
        let problem_id = self.policy.problem().id;

        let evaluation = self.judge.evaluate(self.policy.problem(), code).await?;
        self.session.record_submission(problem_id, code, &evaluation);
        self.store.save(&self.session).await?;

        if !self.session.is_judged(problem_id) {
            return Err(DomainError::VerdictMissing(problem_id));
        }

        let next_index = self.session.current_problem_index + 1;
        match self.problems.get(next_index).cloned() {
            Some(next) => {
                let next_id = next.id;
                self.session.current_problem_index = next_index;
                self.policy.set_problem(next);
                let greeting = self.policy.initial_greeting();
                self.session
                    .record_turn(next_id, Role::Assistant, greeting.clone());
                self.store.save(&self.session).await?;
                info!(from = problem_id, to = next_id, "advanced to next problem");
                Ok(SubmissionOutcome::Next {
                    evaluation,
                    problem_id: next_id,
                    greeting,
                })
            }
            None => {
                self.session.finish();
                self.store.save(&self.session).await?;
                let summary = self.summary();
                info!(
                    success_rate = summary.success_rate,
                    average_turns = summary.average_turns,
                    "experiment complete"
                );
                Ok(SubmissionOutcome::Completed {
                    evaluation,
                    summary,
                })
            }
        }
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            session_id: self.session.session_id.clone(),
            solved: self
                .session
                .attempts
                .iter()
                .filter(|a| a.is_correct == Some(true))
                .count(),
            total: self.problems.len(),
            success_rate: self.session.success_rate(),
            average_turns: self.session.average_turns(),
        }
    }

    async fn finish_exchange(
        &mut self,
        problem_id: u32,
        result: Result<String, GatewayError>,
    ) -> DomainResult<String> {
        match result {
            Ok(reply) => {
                self.session
                    .record_turn(problem_id, Role::Assistant, reply.clone());
                self.store.save(&self.session).await?;
                Ok(reply)
            }
            Err(err) => {
                warn!(problem_id, error = %err, "tutor reply failed");
                self.store.save(&self.session).await?;
                Err(err.into())
            }
        }
    }

    fn ensure_active(&self) -> DomainResult<()> {
        if self.is_complete() {
            Err(DomainError::ExperimentComplete)
        } else {
            Ok(())
        }
    }
}
