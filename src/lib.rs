//! Socratic Tutor - experiment harness for LLM debugging tutors
//!
//! Participants debug small Python programs in conversation with a tutor
//! that asks guiding questions instead of revealing the bug. The tutor
//! speaks in one of two personas. Submitted fixes are graded by a judge
//! that samples the model several times and takes the majority verdict.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): problems, personas, sessions and the ports
//!   to the model provider, the problem bank and the session store
//! - **Service Layer** (`services`): judge, dialogue policy and experiment runner
//! - **Infrastructure Layer** (`infrastructure`): Anthropic client, config,
//!   dataset parsing, session files and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use socratic_tutor::services::SelfConsistencyJudge;
//!
//! let judge = SelfConsistencyJudge::new(gateway, JudgeConfig::default());
//! let evaluation = judge.evaluate(&problem, &code).await?;
//! println!("correct: {}", evaluation.verdict);
//! ```

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    Config, Evaluation, ExperimentSession, JudgeConfig, Persona, Problem, Role, Turn,
};
pub use domain::ports::{ChatGateway, ChatMessage, ChatRequest, GatewayError, ProblemBank, SessionStore};
pub use domain::{DomainError, DomainResult};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{DialoguePolicy, ExperimentRunner, SelfConsistencyJudge};
