use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure for the tutor harness
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Anthropic Messages API configuration
    #[serde(default)]
    pub anthropic: AnthropicConfig,

    /// Self-consistency judge configuration
    #[serde(default)]
    pub judge: JudgeConfig,

    /// Tutoring dialogue configuration
    #[serde(default)]
    pub dialogue: DialogueConfig,

    /// Problem bank location
    #[serde(default)]
    pub problems: ProblemBankConfig,

    /// Session persistence
    #[serde(default)]
    pub sessions: SessionsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Experiment flow
    #[serde(default)]
    pub experiment: ExperimentConfig,
}

/// Anthropic Messages API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AnthropicConfig {
    /// API key; filled from `ANTHROPIC_API_KEY` when empty
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Upper bound on generated tokens per request
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries for transient failures (429, 5xx, network)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial backoff delay in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Maximum backoff delay in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,

    /// Requests per second allowed by the token bucket
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
}

fn default_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_model() -> String {
    "claude-opus-4-5-20251101".to_string()
}

const fn default_max_tokens() -> u32 {
    16384
}

const fn default_timeout_secs() -> u64 {
    300
}

const fn default_max_retries() -> u32 {
    2
}

const fn default_initial_backoff_ms() -> u64 {
    1000
}

const fn default_max_backoff_ms() -> u64 {
    30_000
}

const fn default_requests_per_second() -> u32 {
    10
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            requests_per_second: default_requests_per_second(),
        }
    }
}

/// Self-consistency judge configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct JudgeConfig {
    /// Number of independent evaluation rounds
    #[serde(default = "default_iterations")]
    pub iterations: usize,

    #[serde(default = "default_judge_temperature")]
    pub temperature: f32,

    /// Issue rounds concurrently instead of one after another
    #[serde(default)]
    pub concurrent: bool,
}

const fn default_iterations() -> usize {
    3
}

const fn default_judge_temperature() -> f32 {
    0.3
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
            temperature: default_judge_temperature(),
            concurrent: false,
        }
    }
}

/// Tutoring dialogue configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DialogueConfig {
    #[serde(default = "default_dialogue_temperature")]
    pub temperature: f32,

    /// Stream tutor replies fragment by fragment
    #[serde(default = "default_true")]
    pub stream: bool,
}

const fn default_dialogue_temperature() -> f32 {
    0.7
}

const fn default_true() -> bool {
    true
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            temperature: default_dialogue_temperature(),
            stream: true,
        }
    }
}

/// On-disk problem formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemFormat {
    /// `<problem>...</problem>` style tagged sections
    Tagged,
    /// `name: ---` delimited sections
    TreeInstruct,
}

/// Explicitly listed problem file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemEntry {
    pub id: u32,
    /// Path relative to the problems directory, or absolute
    pub file: PathBuf,
    #[serde(default = "default_format")]
    pub format: ProblemFormat,
}

const fn default_format() -> ProblemFormat {
    ProblemFormat::Tagged
}

/// Problem bank location
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProblemBankConfig {
    #[serde(default = "default_problems_dir")]
    pub directory: PathBuf,

    /// When empty, `directory` is scanned for `<n>.txt` tagged files
    #[serde(default)]
    pub entries: Vec<ProblemEntry>,
}

fn default_problems_dir() -> PathBuf {
    PathBuf::from("data/problems")
}

impl Default for ProblemBankConfig {
    fn default() -> Self {
        Self {
            directory: default_problems_dir(),
            entries: vec![],
        }
    }
}

/// Session persistence
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SessionsConfig {
    #[serde(default = "default_sessions_dir")]
    pub directory: PathBuf,
}

fn default_sessions_dir() -> PathBuf {
    PathBuf::from("logs/sessions")
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            directory: default_sessions_dir(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Terminal output format
    #[serde(default = "default_log_format")]
    pub format: LogFormat,

    /// Directory for rolling JSON log files; stderr only when unset
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    #[serde(default)]
    pub rotation: RotationPolicy,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    #[default]
    Daily,
    Hourly,
    Never,
}

fn default_log_level() -> String {
    "info".to_string()
}

const fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: RotationPolicy::default(),
        }
    }
}

/// Experiment flow
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ExperimentConfig {
    /// Cap on problems presented; all loaded problems when unset
    #[serde(default)]
    pub total_problems: Option<usize>,

    /// Post-experiment survey link shown on completion
    #[serde(default)]
    pub survey_url: Option<String>,
}
