//! `name: ---` delimited problem files (TreeInstruct).

use regex::Regex;

use super::normalize::{parse_bug_fixes, strip_line_numbers};
use super::DatasetError;
use crate::domain::models::Problem;

/// Trimmed content of `name: ---\nname:\n...---`; empty when absent
pub fn extract_section(text: &str, name: &str) -> Result<String, DatasetError> {
    let name = regex::escape(name);
    let pattern = Regex::new(&format!("(?s){name}: ---\n{name}:\n?(.*?)---"))?;
    Ok(pattern
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default())
}

/// Build a problem from TreeInstruct text. These files carry no unit tests.
pub fn parse_tree_instruct(text: &str, id: u32) -> Result<Problem, DatasetError> {
    Ok(Problem {
        id,
        description: extract_section(text, "problem")?,
        buggy_code: strip_line_numbers(&extract_section(text, "buggy_code")?),
        bug_description: extract_section(text, "bug_desc")?,
        expected_fixes: parse_bug_fixes(&extract_section(text, "bug_fixes")?),
        unit_tests: vec![],
        example_dialogue: None,
    })
}
