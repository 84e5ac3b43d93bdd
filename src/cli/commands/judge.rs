//! One-shot judging of a code fix.

use anyhow::{anyhow, Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use super::{build_gateway, load_bank};
use crate::cli::display::{format_scores, output, verdict_label, CommandOutput};
use crate::cli::progress::create_spinner;
use crate::domain::models::{Config, Evaluation};
use crate::domain::ports::ProblemBank;
use crate::services::SelfConsistencyJudge;

#[derive(Args, Debug)]
pub struct JudgeArgs {
    /// Problem ID
    #[arg(short, long)]
    pub problem: u32,

    /// File containing the submitted code
    #[arg(long, value_name = "FILE")]
    pub code: PathBuf,

    /// Evaluation rounds (defaults to judge.iterations)
    #[arg(short, long)]
    pub iterations: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct JudgeOutput {
    pub problem_id: u32,
    pub verdict: bool,
    pub scores: Vec<f64>,
    pub mean: f64,
    pub iterations: usize,
}

impl JudgeOutput {
    pub fn new(problem_id: u32, evaluation: &Evaluation) -> Self {
        Self {
            problem_id,
            verdict: evaluation.verdict,
            scores: evaluation.scores.clone(),
            mean: evaluation.mean(),
            iterations: evaluation.scores.len(),
        }
    }
}

impl CommandOutput for JudgeOutput {
    fn to_human(&self) -> String {
        format!(
            "Problem {}: {}\n  scores {} (mean {:.2} over {} rounds)",
            self.problem_id,
            verdict_label(self.verdict),
            format_scores(&self.scores),
            self.mean,
            self.iterations
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: JudgeArgs, config: &Config, json_mode: bool) -> Result<()> {
    let bank = load_bank(config)?;
    let problem = bank
        .get(args.problem)
        .ok_or_else(|| anyhow!("Problem not found: {}", args.problem))?;
    let code = tokio::fs::read_to_string(&args.code)
        .await
        .with_context(|| format!("Failed to read code from {}", args.code.display()))?;

    let judge = SelfConsistencyJudge::new(build_gateway(config)?, config.judge.clone());
    let iterations = args.iterations.unwrap_or(config.judge.iterations);

    let spinner = create_spinner(
        format!("Judging problem {} over {iterations} rounds...", problem.id),
        json_mode,
    );
    let result = judge.evaluate_with(problem, &code, iterations).await;
    spinner.finish_and_clear();

    let evaluation = result?;
    output(&JudgeOutput::new(problem.id, &evaluation), json_mode);
    Ok(())
}
