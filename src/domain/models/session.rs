use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::evaluation::Evaluation;
use super::persona::Persona;
use super::turn::{count_user_turns, Role, Turn};

/// One participant's work on one problem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemAttempt {
    pub problem_id: u32,

    #[serde(rename = "conversation_history")]
    pub turns: Vec<Turn>,

    #[serde(default)]
    pub final_code: String,

    /// `None` until the judge has ruled on a submission
    #[serde(default)]
    pub is_correct: Option<bool>,

    #[serde(default)]
    pub judge_scores: Vec<f64>,
}

impl ProblemAttempt {
    pub fn new(problem_id: u32) -> Self {
        Self {
            problem_id,
            turns: vec![],
            final_code: String::new(),
            is_correct: None,
            judge_scores: vec![],
        }
    }

    /// Participant messages in this attempt
    pub fn turn_count(&self) -> usize {
        count_user_turns(&self.turns)
    }

    pub fn is_judged(&self) -> bool {
        self.is_correct.is_some()
    }
}

/// Complete record of one participant's run through the experiment
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentSession {
    pub session_id: String,
    pub participant_id: String,
    pub persona: Persona,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub attempts: Vec<ProblemAttempt>,
    pub current_problem_index: usize,
}

impl ExperimentSession {
    /// Open a session with a fresh id of the form
    /// `{participant}_{YYYYmmdd_HHMMSS}_{8 hex}`.
    pub fn new(participant_id: impl Into<String>, persona: Persona) -> Self {
        let participant_id = participant_id.into();
        let session_id = generate_session_id(&participant_id);
        Self {
            session_id,
            participant_id,
            persona,
            start_time: Utc::now(),
            end_time: None,
            attempts: vec![],
            current_problem_index: 0,
        }
    }

    pub fn record_turn(&mut self, problem_id: u32, role: Role, content: impl Into<String>) {
        self.attempt_mut(problem_id).turns.push(Turn::new(role, content));
    }

    pub fn record_submission(&mut self, problem_id: u32, code: impl Into<String>, evaluation: &Evaluation) {
        let attempt = self.attempt_mut(problem_id);
        attempt.final_code = code.into();
        attempt.is_correct = Some(evaluation.verdict);
        attempt.judge_scores.clone_from(&evaluation.scores);
    }

    pub fn attempt(&self, problem_id: u32) -> Option<&ProblemAttempt> {
        self.attempts.iter().find(|a| a.problem_id == problem_id)
    }

    /// Whether a verdict has been recorded for `problem_id`
    pub fn is_judged(&self, problem_id: u32) -> bool {
        self.attempt(problem_id).is_some_and(ProblemAttempt::is_judged)
    }

    pub fn finish(&mut self) {
        self.end_time = Some(Utc::now());
    }

    pub fn is_finished(&self) -> bool {
        self.end_time.is_some()
    }

    /// Correct submissions over judged submissions; 0.0 when none are judged
    pub fn success_rate(&self) -> f64 {
        let judged: Vec<_> = self.attempts.iter().filter(|a| a.is_judged()).collect();
        if judged.is_empty() {
            return 0.0;
        }
        let correct = judged.iter().filter(|a| a.is_correct == Some(true)).count();
        ratio(correct, judged.len())
    }

    /// Mean participant turns per judged attempt; 0.0 when none are judged
    pub fn average_turns(&self) -> f64 {
        let judged: Vec<_> = self.attempts.iter().filter(|a| a.is_judged()).collect();
        if judged.is_empty() {
            return 0.0;
        }
        let total: usize = judged.iter().map(|a| a.turn_count()).sum();
        ratio(total, judged.len())
    }

    pub fn to_document(&self) -> SessionDocument {
        SessionDocument {
            session_id: self.session_id.clone(),
            participant_id: self.participant_id.clone(),
            persona: self.persona,
            start_time: self.start_time,
            end_time: self.end_time,
            current_problem_index: self.current_problem_index,
            metrics: SessionMetrics {
                success_rate: self.success_rate(),
                average_turns: self.average_turns(),
            },
            problem_attempts: self
                .attempts
                .iter()
                .map(|a| AttemptDocument {
                    problem_id: a.problem_id,
                    final_code: a.final_code.clone(),
                    is_correct: a.is_correct,
                    judge_scores: a.judge_scores.clone(),
                    turn_count: a.turn_count(),
                    conversation_history: a.turns.clone(),
                })
                .collect(),
        }
    }

    fn attempt_mut(&mut self, problem_id: u32) -> &mut ProblemAttempt {
        let index = match self.attempts.iter().position(|a| a.problem_id == problem_id) {
            Some(index) => index,
            None => {
                self.attempts.push(ProblemAttempt::new(problem_id));
                self.attempts.len() - 1
            }
        };
        &mut self.attempts[index]
    }
}

fn generate_session_id(participant_id: &str) -> String {
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{participant_id}_{stamp}_{}", &suffix[..8])
}

#[allow(clippy::cast_precision_loss)]
fn ratio(numerator: usize, denominator: usize) -> f64 {
    numerator as f64 / denominator as f64
}

/// Aggregate metrics persisted alongside a session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionMetrics {
    pub success_rate: f64,
    pub average_turns: f64,
}

/// Persisted form of one problem attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptDocument {
    pub problem_id: u32,
    pub final_code: String,
    pub is_correct: Option<bool>,
    pub judge_scores: Vec<f64>,
    pub turn_count: usize,
    pub conversation_history: Vec<Turn>,
}

/// Persisted form of an [`ExperimentSession`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDocument {
    pub session_id: String,
    pub participant_id: String,
    pub persona: Persona,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub current_problem_index: usize,
    pub metrics: SessionMetrics,
    pub problem_attempts: Vec<AttemptDocument>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_format() {
        let session = ExperimentSession::new("P007", Persona::Warm);
        let parts: Vec<&str> = session.session_id.split('_').collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0], "P007");
        assert_eq!(parts[1].len(), 8);
        assert_eq!(parts[2].len(), 6);
        assert_eq!(parts[3].len(), 8);
        assert!(parts[3].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_metrics_with_no_judged_attempts() {
        let mut session = ExperimentSession::new("P1", Persona::Formal);
        session.record_turn(1, Role::User, "hello");
        assert!((session.success_rate() - 0.0).abs() < f64::EPSILON);
        assert!((session.average_turns() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_metrics_over_judged_attempts() {
        let mut session = ExperimentSession::new("P1", Persona::Formal);
        session.record_turn(1, Role::Assistant, "greeting");
        session.record_turn(1, Role::User, "a");
        session.record_turn(1, Role::User, "b");
        session.record_submission(1, "fixed", &Evaluation::from_scores(vec![1.0, 1.0, 0.0]));
        session.record_turn(2, Role::User, "c");
        session.record_submission(2, "wrong", &Evaluation::from_scores(vec![0.0, 0.0, 0.0]));
        session.record_turn(3, Role::User, "unjudged");

        assert!((session.success_rate() - 0.5).abs() < f64::EPSILON);
        assert!((session.average_turns() - 1.5).abs() < f64::EPSILON);
        assert!(session.is_judged(1));
        assert!(!session.is_judged(3));
    }

    #[test]
    fn test_turns_accumulate_on_same_attempt() {
        let mut session = ExperimentSession::new("P1", Persona::Formal);
        session.record_turn(4, Role::User, "first");
        session.record_turn(4, Role::Assistant, "reply");
        assert_eq!(session.attempts.len(), 1);
        assert_eq!(session.attempt(4).unwrap().turns.len(), 2);
    }

    #[test]
    fn test_document_shape() {
        let mut session = ExperimentSession::new("P1", Persona::Warm);
        session.record_turn(1, Role::User, "hi");
        session.record_submission(1, "code", &Evaluation::from_scores(vec![1.0]));
        let json = serde_json::to_value(session.to_document()).unwrap();

        assert_eq!(json["persona"], "warm");
        assert_eq!(json["metrics"]["success_rate"], 1.0);
        assert_eq!(json["problem_attempts"][0]["turn_count"], 1);
        assert_eq!(json["problem_attempts"][0]["is_correct"], true);
        assert_eq!(
            json["problem_attempts"][0]["conversation_history"][0]["role"],
            "user"
        );
        assert!(json["end_time"].is_null());
    }
}
