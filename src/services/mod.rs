pub mod dialogue;
pub mod experiment;
pub mod judge;
pub mod prompts;

pub use dialogue::{DialoguePolicy, ReplyStream};
pub use experiment::{ExperimentRunner, RunnerSettings, SessionSummary, SubmissionOutcome};
pub use judge::{score_response, SelfConsistencyJudge};
