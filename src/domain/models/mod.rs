pub mod config;
pub mod evaluation;
pub mod persona;
pub mod problem;
pub mod session;
pub mod turn;

pub use config::{
    AnthropicConfig, Config, DialogueConfig, ExperimentConfig, JudgeConfig, LogFormat,
    LoggingConfig, ProblemBankConfig, ProblemEntry, ProblemFormat, RotationPolicy, SessionsConfig,
};
pub use evaluation::Evaluation;
pub use persona::{Persona, UnknownPersona};
pub use problem::Problem;
pub use session::{
    AttemptDocument, ExperimentSession, ProblemAttempt, SessionDocument, SessionMetrics,
};
pub use turn::{Role, Transcript, Turn};
