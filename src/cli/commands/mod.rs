//! CLI command implementations.

pub mod judge;
pub mod problems;
pub mod run;
pub mod session;

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::domain::models::Config;
use crate::domain::ports::ChatGateway;
use crate::infrastructure::claude::{ClaudeClientConfig, ClaudeGateway};
use crate::infrastructure::dataset::FileProblemBank;

/// Anthropic gateway built from the loaded configuration
pub(crate) fn build_gateway(config: &Config) -> Result<Arc<dyn ChatGateway>> {
    let gateway = ClaudeGateway::new(ClaudeClientConfig::from(&config.anthropic))
        .context("Failed to create Anthropic client. Set ANTHROPIC_API_KEY or anthropic.api_key")?;
    Ok(Arc::new(gateway))
}

/// Problem bank honouring `experiment.total_problems`
pub(crate) fn load_bank(config: &Config) -> Result<FileProblemBank> {
    FileProblemBank::load(&config.problems, config.experiment.total_problems).with_context(|| {
        format!(
            "Failed to load problems from {}",
            config.problems.directory.display()
        )
    })
}
