//! Self-consistency judge.
//!
//! A submission is evaluated by several independent single-turn calls that
//! each answer `CORRECT` or `INCORRECT`. Each answer becomes a binary score
//! and the verdict is `mean(scores) >= 0.5`.

use futures::future::try_join_all;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Evaluation, JudgeConfig, Problem};
use crate::domain::ports::{ChatGateway, ChatMessage, ChatRequest};
use crate::services::prompts::{judge_instruction, JUDGE_USER_MESSAGE};

/// Convert one judge response into a binary score.
///
/// `INCORRECT` takes precedence over `CORRECT`, since the former contains
/// the latter as a substring. Anything else scores 0.0.
pub fn score_response(response: &str) -> f64 {
    let normalized = response.trim().to_uppercase();
    if normalized.contains("CORRECT") && !normalized.contains("INCORRECT") {
        1.0
    } else {
        0.0
    }
}

/// Evaluates submitted fixes by majority vote over independent model calls
pub struct SelfConsistencyJudge {
    gateway: Arc<dyn ChatGateway>,
    config: JudgeConfig,
}

impl SelfConsistencyJudge {
    pub fn new(gateway: Arc<dyn ChatGateway>, config: JudgeConfig) -> Self {
        Self { gateway, config }
    }

    pub fn config(&self) -> &JudgeConfig {
        &self.config
    }

    /// Evaluate with the configured number of rounds
    pub async fn evaluate(&self, problem: &Problem, submitted_code: &str) -> DomainResult<Evaluation> {
        self.evaluate_with(problem, submitted_code, self.config.iterations)
            .await
    }

    /// Evaluate with an explicit number of rounds.
    ///
    /// Any gateway failure aborts the whole evaluation.
    #[instrument(skip(self, problem, submitted_code), fields(problem_id = problem.id))]
    pub async fn evaluate_with(
        &self,
        problem: &Problem,
        submitted_code: &str,
        iterations: usize,
    ) -> DomainResult<Evaluation> {
        if iterations == 0 {
            return Err(DomainError::InvalidIterations(iterations));
        }

        let request = ChatRequest::new(
            judge_instruction(problem, submitted_code),
            vec![ChatMessage::user(JUDGE_USER_MESSAGE)],
            self.config.temperature,
        );

        let scores = if self.config.concurrent {
            let rounds = (0..iterations).map(|round| self.single_round(round, request.clone()));
            try_join_all(rounds).await?
        } else {
            let mut scores = Vec::with_capacity(iterations);
            for round in 0..iterations {
                scores.push(self.single_round(round, request.clone()).await?);
            }
            scores
        };

        let evaluation = Evaluation::from_scores(scores);
        info!(
            verdict = evaluation.verdict,
            mean = evaluation.mean(),
            scores = ?evaluation.scores,
            "submission evaluated"
        );
        Ok(evaluation)
    }

    async fn single_round(&self, round: usize, request: ChatRequest) -> DomainResult<f64> {
        let response = self.gateway.complete(request).await?;
        let score = score_response(&response);
        debug!(round, score, response = %response.trim(), "judge round complete");
        Ok(score)
    }
}
