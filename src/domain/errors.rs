//! Domain errors for the Socratic tutor harness.

use thiserror::Error;

use crate::domain::ports::chat_gateway::GatewayError;

/// Domain-level errors that can occur while running an experiment.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid problem {id}: {reason}")]
    InvalidProblem { id: u32, reason: String },

    #[error("Problem not found: {0}")]
    ProblemNotFound(u32),

    #[error("Duplicate problem id: {0}")]
    DuplicateProblem(u32),

    #[error("Judge iterations must be at least 1, got {0}")]
    InvalidIterations(usize),

    #[error("No problems are available for this experiment")]
    NoProblems,

    #[error("Experiment already completed")]
    ExperimentComplete,

    #[error("Cannot advance past problem {0}: no verdict has been recorded")]
    VerdictMissing(u32),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        DomainError::Storage(err.to_string())
    }
}
