//! Problem bank CLI commands.

use anyhow::{anyhow, Result};
use clap::{Args, Subcommand};
use serde::Serialize;

use super::load_bank;
use crate::cli::display::{first_line, list_table, output, render_list, truncate, CommandOutput, DetailView};
use crate::domain::models::{Config, Problem};
use crate::domain::ports::ProblemBank;

#[derive(Args, Debug)]
pub struct ProblemsArgs {
    #[command(subcommand)]
    pub command: ProblemsCommands,
}

#[derive(Subcommand, Debug)]
pub enum ProblemsCommands {
    /// List loaded problems
    List,
    /// Show a problem, including the withheld bug description and fixes
    Show {
        /// Problem ID
        id: u32,
    },
}

#[derive(Debug, Serialize)]
pub struct ProblemSummaryOutput {
    pub id: u32,
    pub description: String,
    pub expected_fixes: usize,
    pub unit_tests: usize,
    pub has_example_dialogue: bool,
}

impl From<&Problem> for ProblemSummaryOutput {
    fn from(problem: &Problem) -> Self {
        Self {
            id: problem.id,
            description: first_line(&problem.description).to_string(),
            expected_fixes: problem.expected_fixes.len(),
            unit_tests: problem.unit_tests.len(),
            has_example_dialogue: problem.example_dialogue.is_some(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProblemListOutput {
    pub problems: Vec<ProblemSummaryOutput>,
    pub total: usize,
}

impl CommandOutput for ProblemListOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["id", "description", "fixes", "tests"]);
        for problem in &self.problems {
            table.add_row(vec![
                problem.id.to_string(),
                truncate(&problem.description, 60),
                problem.expected_fixes.to_string(),
                problem.unit_tests.to_string(),
            ]);
        }
        render_list("problem", &table, self.total)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
pub struct ProblemDetailOutput {
    #[serde(flatten)]
    pub problem: Problem,
}

impl CommandOutput for ProblemDetailOutput {
    fn to_human(&self) -> String {
        let p = &self.problem;
        let mut view = DetailView::new(&format!("Problem {}", p.id))
            .field("Unit tests", &p.unit_tests.len().to_string())
            .field_opt(
                "Example dialogue",
                p.example_dialogue.as_ref().map(|_| "yes"),
            )
            .section("Description")
            .block(&p.description)
            .section("Buggy Code")
            .block(&p.buggy_code)
            .section("Bug Description")
            .block(&p.bug_description)
            .section("Expected Fixes");
        for fix in &p.expected_fixes {
            view = view.item(fix);
        }
        if !p.unit_tests.is_empty() {
            view = view.section("Unit Tests");
            for test in &p.unit_tests {
                view = view.item(test);
            }
        }
        view.render()
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub fn execute(args: ProblemsArgs, config: &Config, json_mode: bool) -> Result<()> {
    let bank = load_bank(config)?;

    match args.command {
        ProblemsCommands::List => {
            let problems: Vec<ProblemSummaryOutput> =
                bank.problems().iter().map(ProblemSummaryOutput::from).collect();
            let out = ProblemListOutput {
                total: problems.len(),
                problems,
            };
            output(&out, json_mode);
        }
        ProblemsCommands::Show { id } => {
            let problem = bank
                .get(id)
                .cloned()
                .ok_or_else(|| anyhow!("Problem not found: {id}"))?;
            output(&ProblemDetailOutput { problem }, json_mode);
        }
    }

    Ok(())
}
