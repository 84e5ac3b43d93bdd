//! Recorded session CLI commands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::cli::display::{list_table, output, render_list, CommandOutput, DetailView};
use crate::domain::models::{Config, SessionDocument};
use crate::domain::ports::SessionStore;
use crate::infrastructure::sessions::JsonSessionStore;

#[derive(Args, Debug)]
pub struct SessionArgs {
    #[command(subcommand)]
    pub command: SessionCommands,
}

#[derive(Subcommand, Debug)]
pub enum SessionCommands {
    /// Show metrics and per-problem results of a stored session
    Show {
        /// Session ID (file name without .json)
        session_id: String,
    },
}

#[derive(Debug, Serialize)]
pub struct SessionShowOutput {
    #[serde(flatten)]
    pub document: SessionDocument,
}

impl CommandOutput for SessionShowOutput {
    fn to_human(&self) -> String {
        let doc = &self.document;
        let end_time = doc.end_time.map(|t| t.to_rfc3339());
        let solved = doc
            .problem_attempts
            .iter()
            .filter(|a| a.is_correct == Some(true))
            .count();

        let header = DetailView::new(&format!("Session {}", doc.session_id))
            .field("Participant", &doc.participant_id)
            .field("Persona", doc.persona.as_str())
            .field("Started", &doc.start_time.to_rfc3339())
            .field_opt("Finished", end_time.as_deref())
            .field("Solved", &format!("{solved} / {}", doc.problem_attempts.len()))
            .field("Success rate", &format!("{:.1}%", doc.metrics.success_rate * 100.0))
            .field("Average turns", &format!("{:.1}", doc.metrics.average_turns))
            .render();

        let mut table = list_table(&["problem", "result", "turns", "scores"]);
        for attempt in &doc.problem_attempts {
            let result = match attempt.is_correct {
                Some(true) => "correct",
                Some(false) => "incorrect",
                None => "unjudged",
            };
            let scores: Vec<String> = attempt.judge_scores.iter().map(|s| format!("{s}")).collect();
            table.add_row(vec![
                attempt.problem_id.to_string(),
                result.to_string(),
                attempt.turn_count.to_string(),
                scores.join(" "),
            ]);
        }

        format!(
            "{header}\n\n{}",
            render_list("attempt", &table, doc.problem_attempts.len())
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: SessionArgs, config: &Config, json_mode: bool) -> Result<()> {
    let store = JsonSessionStore::new(&config.sessions.directory)
        .await
        .context("Failed to open session directory")?;

    match args.command {
        SessionCommands::Show { session_id } => {
            let document = store
                .load(&session_id)
                .await
                .with_context(|| format!("Failed to load session {session_id}"))?;
            output(&SessionShowOutput { document }, json_mode);
        }
    }

    Ok(())
}
