//! Interactive tutoring session.
//!
//! Lines typed by the participant go to the tutor. Lines starting with `:`
//! are harness commands:
//!
//! ```text
//! :draft <file>    attach the file as the current code draft
//! :clear-draft     detach the draft
//! :submit [file]   submit the file (or the draft) for judging
//! :problem         show the current problem again
//! :quit            leave; the session stays on disk as recorded
//! ```

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use super::{build_gateway, load_bank};
use crate::cli::display::{
    action_failure, action_success, format_scores, output, verdict_label, CommandOutput,
    DetailView,
};
use crate::cli::progress::create_spinner;
use crate::domain::models::{Config, Persona, Problem};
use crate::infrastructure::sessions::JsonSessionStore;
use crate::services::{ExperimentRunner, RunnerSettings, SessionSummary, SubmissionOutcome};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Participant identifier recorded in the session
    #[arg(short, long)]
    pub participant: String,

    /// Tutor persona: formal (alias neutral) or warm (alias emotional)
    #[arg(long)]
    pub persona: Persona,

    /// Wait for complete replies instead of streaming them
    #[arg(long)]
    pub no_stream: bool,
}

/// One line of participant input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Empty,
    Message(String),
    Draft(PathBuf),
    ClearDraft,
    Submit(Option<PathBuf>),
    Problem,
    Quit,
    Invalid(String),
}

/// Classify one input line
pub fn parse_input(line: &str) -> Input {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }
    let Some(command) = line.strip_prefix(':') else {
        return Input::Message(line.to_string());
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, Some(rest.trim()).filter(|r| !r.is_empty())),
        None => (command, None),
    };

    match (name, arg) {
        ("draft", Some(path)) => Input::Draft(PathBuf::from(path)),
        ("draft", None) => Input::Invalid("usage: :draft <file>".to_string()),
        ("clear-draft", None) => Input::ClearDraft,
        ("submit", path) => Input::Submit(path.map(PathBuf::from)),
        ("problem", None) => Input::Problem,
        ("quit" | "q", None) => Input::Quit,
        _ => Input::Invalid(format!(
            "unknown command ':{command}'. Commands: :draft <file>, :clear-draft, :submit [file], :problem, :quit"
        )),
    }
}

#[derive(Debug, Serialize)]
pub struct RunSummaryOutput {
    #[serde(flatten)]
    pub summary: SessionSummary,
    pub completed: bool,
    pub session_file: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub survey_url: Option<String>,
}

impl CommandOutput for RunSummaryOutput {
    fn to_human(&self) -> String {
        let title = if self.completed {
            "Your Results"
        } else {
            "Session saved (incomplete)"
        };
        let mut view = DetailView::new(title)
            .field(
                "Problems solved",
                &format!("{} / {}", self.summary.solved, self.summary.total),
            )
            .field(
                "Success rate",
                &format!("{:.1}%", self.summary.success_rate * 100.0),
            )
            .field(
                "Average turns",
                &format!("{:.1}", self.summary.average_turns),
            )
            .field("Session ID", &self.summary.session_id)
            .field("Session file", &self.session_file.display().to_string());
        if self.completed {
            view = view.field_opt("Survey", self.survey_url.as_deref());
        }
        let mut rendered = view.render();
        if self.completed {
            rendered.push_str("\n\nThank you for participating in this experiment!");
        }
        rendered
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: RunArgs, config: &Config, json_mode: bool) -> Result<()> {
    let problems = load_bank(config)?.into_problems();
    let gateway = build_gateway(config)?;
    let store = Arc::new(
        JsonSessionStore::new(&config.sessions.directory)
            .await
            .context("Failed to open session directory")?,
    );

    let settings = RunnerSettings {
        judge: config.judge.clone(),
        dialogue_temperature: config.dialogue.temperature,
        ..RunnerSettings::new(args.participant, args.persona)
    };
    let mut runner = ExperimentRunner::new(gateway, problems, store.clone(), settings)?;
    let stream = config.dialogue.stream && !args.no_stream;

    let greeting = runner.start().await?;
    if let Some(problem) = runner.current_problem() {
        print_problem(problem, runner.position(), runner.total_problems());
    }
    print_tutor(&greeting);

    let mut draft: Option<String> = None;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while !runner.is_complete() {
        prompt()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_input(&line) {
            Input::Empty => {}
            Input::Quit => break,
            Input::Invalid(message) => println!("{}", action_failure(&message)),
            Input::Problem => {
                if let Some(problem) = runner.current_problem() {
                    print_problem(problem, runner.position(), runner.total_problems());
                }
            }
            Input::ClearDraft => {
                draft = None;
                println!("{}", action_success("Draft cleared"));
            }
            Input::Draft(path) => match read_code(&path).await {
                Ok(code) => {
                    println!(
                        "{}",
                        action_success(&format!(
                            "Draft attached from {} ({} lines)",
                            path.display(),
                            code.lines().count()
                        ))
                    );
                    draft = Some(code);
                }
                Err(err) => println!("{}", action_failure(&format!("{err:#}"))),
            },
            Input::Message(text) => {
                let result = if stream {
                    print!("{} ", style("tutor>").cyan().bold());
                    let reply = runner
                        .send_streaming(&text, draft.as_deref(), |fragment| {
                            print!("{fragment}");
                            let _ = io::stdout().flush();
                        })
                        .await;
                    println!();
                    reply.map(|_| ())
                } else {
                    runner
                        .send(&text, draft.as_deref())
                        .await
                        .map(|reply| print_tutor(&reply))
                };
                if let Err(err) = result {
                    println!("{}", action_failure(&format!("Tutor unavailable: {err}")));
                }
            }
            Input::Submit(path) => {
                let code = match path {
                    Some(path) => match read_code(&path).await {
                        Ok(code) => code,
                        Err(err) => {
                            println!("{}", action_failure(&format!("{err:#}")));
                            continue;
                        }
                    },
                    None => match draft.clone() {
                        Some(code) => code,
                        None => {
                            println!(
                                "{}",
                                action_failure("Nothing to submit. Use :submit <file> or attach a :draft first")
                            );
                            continue;
                        }
                    },
                };

                let spinner = create_spinner("Evaluating your fix...", false);
                let result = runner.submit(&code).await;
                spinner.finish_and_clear();

                match result {
                    Ok(outcome) => {
                        let evaluation = outcome.evaluation();
                        println!(
                            "Your fix was evaluated as {} {}",
                            verdict_label(evaluation.verdict),
                            style(format_scores(&evaluation.scores)).dim()
                        );
                        if let SubmissionOutcome::Next { greeting, .. } = outcome {
                            draft = None;
                            if let Some(problem) = runner.current_problem() {
                                print_problem(problem, runner.position(), runner.total_problems());
                            }
                            print_tutor(&greeting);
                        }
                    }
                    Err(err) => println!("{}", action_failure(&format!("Evaluation failed: {err}"))),
                }
            }
        }
    }

    let completed = runner.is_complete();
    if !completed {
        info!(
            session_id = %runner.session().session_id,
            position = runner.position(),
            "participant left before finishing"
        );
    }

    let summary = runner.summary();
    let out = RunSummaryOutput {
        session_file: store.path_for(&summary.session_id),
        summary,
        completed,
        survey_url: config.experiment.survey_url.clone(),
    };
    output(&out, json_mode);
    Ok(())
}

async fn read_code(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

fn prompt() -> Result<()> {
    print!("{} ", style("you>").green().bold());
    io::stdout().flush().context("Failed to flush stdout")
}

fn print_tutor(text: &str) {
    println!("{} {text}", style("tutor>").cyan().bold());
}

fn print_problem(problem: &Problem, position: usize, total: usize) {
    let view = DetailView::new(&format!("Problem {position} / {total}"))
        .block(&problem.description)
        .section("Your task: find and fix the bug in the code below")
        .block(&problem.buggy_code);
    println!("\n{}\n", view.render());
}
