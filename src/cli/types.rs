//! CLI type definitions
//!
//! Top-level clap structures; each subcommand's arguments live with its
//! command module.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::commands::judge::JudgeArgs;
use super::commands::problems::ProblemsArgs;
use super::commands::run::RunArgs;
use super::commands::session::SessionArgs;

#[derive(Parser, Debug)]
#[command(name = "socratic")]
#[command(about = "Socratic debugging tutor experiment harness", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults, then this file; env overrides are not applied)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run an interactive tutoring session for one participant
    Run(RunArgs),

    /// Inspect the problem bank
    Problems(ProblemsArgs),

    /// Judge a code fix against a problem
    Judge(JudgeArgs),

    /// Inspect recorded sessions
    Session(SessionArgs),
}
