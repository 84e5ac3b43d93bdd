//! Display framework for CLI output formatting.
//!
//! Shared primitives for tables, detail views and verdict styling used
//! across command output. Styling goes through `console`, which honours
//! `NO_COLOR` and non-tty output.

pub mod detail;
pub mod table;

use console::style;
use serde::Serialize;

pub use detail::DetailView;
pub use table::{list_table, render_list};

/// Trait for types that can be rendered as human-readable or JSON output.
pub trait CommandOutput: Serialize {
    fn to_human(&self) -> String;
    fn to_json(&self) -> serde_json::Value;
}

/// Dispatch output based on JSON mode flag.
pub fn output<T: CommandOutput>(result: &T, json_mode: bool) {
    if json_mode {
        println!(
            "{}",
            serde_json::to_string_pretty(&result.to_json()).unwrap_or_default()
        );
    } else {
        println!("{}", result.to_human());
    }
}

/// Render a success action result.
pub fn action_success(message: &str) -> String {
    format!("{} {}", style("\u{2713}").green().bold(), message)
}

/// Render a failure action result.
pub fn action_failure(message: &str) -> String {
    format!("{} {}", style("\u{2717}").red().bold(), message)
}

/// CORRECT in green or INCORRECT in red
pub fn verdict_label(verdict: bool) -> String {
    if verdict {
        style("CORRECT").green().bold().to_string()
    } else {
        style("INCORRECT").red().bold().to_string()
    }
}

/// Scores as `[1, 0, 1]`
pub fn format_scores(scores: &[f64]) -> String {
    let parts: Vec<String> = scores.iter().map(|s| format!("{s}")).collect();
    format!("[{}]", parts.join(", "))
}

/// Truncate a string to at most `max_len` characters, appending "..." if truncated.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

/// First line of a possibly multi-line text
pub fn first_line(s: &str) -> &str {
    s.lines().next().unwrap_or("").trim()
}
