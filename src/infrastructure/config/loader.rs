use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Project config file, relative to the working directory
pub const PROJECT_CONFIG_FILE: &str = "socratic.yaml";
/// Local overrides, relative to the working directory
pub const LOCAL_CONFIG_FILE: &str = "socratic.local.yaml";
/// Fallback source for `anthropic.api_key`
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid judge iterations: {0}. Must be at least 1")]
    InvalidIterations(usize),

    #[error("Invalid {field} temperature: {value}. Must be between 0.0 and 1.0")]
    InvalidTemperature { field: &'static str, value: f32 },

    #[error("Invalid max_tokens: {0}. Must be at least 1")]
    InvalidMaxTokens(u32),

    #[error("Invalid requests_per_second: {0}. Must be at least 1")]
    InvalidRateLimit(u32),

    #[error(
        "Invalid backoff configuration: initial_backoff_ms ({0}) must be less than max_backoff_ms ({1})"
    )]
    InvalidBackoff(u64, u64),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Sessions directory cannot be empty")]
    EmptySessionsDirectory,

    #[error("Invalid total_problems: 0. Leave unset to use every loaded problem")]
    InvalidTotalProblems,

    #[error("Duplicate problem entry id: {0}")]
    DuplicateEntry(u32),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from the working directory
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. socratic.yaml (project config)
    /// 3. socratic.local.yaml (local overrides, optional)
    /// 4. Environment variables (SOCRATIC_* prefix, `__` separates sections)
    pub fn load() -> Result<Config> {
        Self::load_in(Path::new("."))
    }

    /// Same as [`load`](Self::load) with config files resolved against `dir`
    pub fn load_in(dir: &Path) -> Result<Config> {
        let mut config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(dir.join(PROJECT_CONFIG_FILE)))
            .merge(Yaml::file(dir.join(LOCAL_CONFIG_FILE)))
            .merge(Env::prefixed("SOCRATIC_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::apply_api_key_fallback(&mut config);
        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        let mut config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.display()))?;

        Self::apply_api_key_fallback(&mut config);
        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.judge.iterations == 0 {
            return Err(ConfigError::InvalidIterations(config.judge.iterations));
        }

        for (field, value) in [
            ("judge", config.judge.temperature),
            ("dialogue", config.dialogue.temperature),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidTemperature { field, value });
            }
        }

        let anthropic = &config.anthropic;
        if anthropic.max_tokens == 0 {
            return Err(ConfigError::InvalidMaxTokens(anthropic.max_tokens));
        }
        if anthropic.requests_per_second == 0 {
            return Err(ConfigError::InvalidRateLimit(anthropic.requests_per_second));
        }
        if anthropic.initial_backoff_ms >= anthropic.max_backoff_ms {
            return Err(ConfigError::InvalidBackoff(
                anthropic.initial_backoff_ms,
                anthropic.max_backoff_ms,
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        if config.sessions.directory.as_os_str().is_empty() {
            return Err(ConfigError::EmptySessionsDirectory);
        }

        if config.experiment.total_problems == Some(0) {
            return Err(ConfigError::InvalidTotalProblems);
        }

        let mut seen = HashSet::new();
        for entry in &config.problems.entries {
            if !seen.insert(entry.id) {
                return Err(ConfigError::DuplicateEntry(entry.id));
            }
        }

        Ok(())
    }

    fn apply_api_key_fallback(config: &mut Config) {
        if config.anthropic.api_key.trim().is_empty() {
            if let Ok(key) = std::env::var(API_KEY_ENV) {
                config.anthropic.api_key = key;
            }
        }
    }
}
