//! `<tag>...</tag>` problem files (Socratic Debugging Benchmark).

use regex::Regex;

use super::normalize::{parse_bug_fixes, parse_unit_tests, strip_line_numbers};
use super::DatasetError;
use crate::domain::models::Problem;

/// Trimmed content of the first `<tag>...</tag>` section; empty when absent
pub fn extract_tag(text: &str, tag: &str) -> Result<String, DatasetError> {
    let tag = regex::escape(tag);
    let pattern = Regex::new(&format!("(?s)<{tag}>(.*?)</{tag}>"))?;
    Ok(pattern
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default())
}

/// Build a problem from tagged text
pub fn parse_tagged(text: &str, id: u32) -> Result<Problem, DatasetError> {
    let dialogue = extract_tag(text, "dialogue")?;
    Ok(Problem {
        id,
        description: extract_tag(text, "problem")?,
        buggy_code: strip_line_numbers(&extract_tag(text, "bug_code")?),
        bug_description: extract_tag(text, "bug_desc")?,
        expected_fixes: parse_bug_fixes(&extract_tag(text, "bug_fixes")?),
        unit_tests: parse_unit_tests(&extract_tag(text, "unit_tests")?),
        example_dialogue: (!dialogue.is_empty()).then_some(dialogue),
    })
}
