//! Text normalisation shared by both problem formats.

use regex::Regex;
use std::sync::LazyLock;

static LINE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s?").expect("line-number pattern is valid"));

/// Leading words that open a new fix in a `bug_fixes` section
const FIX_OPENERS: [&str; 6] = ["Replace", "After", "Insert", "Remove", "Change", "Add"];

/// Remove a leading `N.` plus at most one space from every line.
///
/// Indentation past that single space is preserved.
pub fn strip_line_numbers(code: &str) -> String {
    code.split('\n')
        .map(|line| LINE_NUMBER.replace(line, ""))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Group the lines of a `bug_fixes` section into individual fixes.
///
/// A fix starts at a line beginning with one of the opener words; following
/// lines belong to it until the next opener.
pub fn parse_bug_fixes(content: &str) -> Vec<String> {
    let mut fixes = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let opens_fix = FIX_OPENERS.iter().any(|opener| line.starts_with(opener));
        if opens_fix && !current.is_empty() {
            fixes.push(current.join("\n"));
            current.clear();
        }
        current.push(line);
    }
    if !current.is_empty() {
        fixes.push(current.join("\n"));
    }
    fixes
}

/// Keep the `assert` lines of a `unit_tests` section
pub fn parse_unit_tests(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with("assert"))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_line_numbers_keeps_indentation() {
        let code = "1. def foo():\n2.     return 1\n10. x = 2";
        assert_eq!(strip_line_numbers(code), "def foo():\n    return 1\nx = 2");
    }

    #[test]
    fn test_strip_line_numbers_without_numbers() {
        assert_eq!(strip_line_numbers("plain\n  code"), "plain\n  code");
    }

    #[test]
    fn test_parse_bug_fixes_groups_continuations() {
        let content = "Replace `<` with `<=` on line 3.\nAfter line 5 insert:\n```py\nreturn -1\n```\n";
        assert_eq!(
            parse_bug_fixes(content),
            vec![
                "Replace `<` with `<=` on line 3.".to_string(),
                "After line 5 insert:\n```py\nreturn -1\n```".to_string(),
            ]
        );
    }

    #[test]
    fn test_parse_bug_fixes_free_text() {
        assert_eq!(
            parse_bug_fixes("The loop bound should include n."),
            vec!["The loop bound should include n.".to_string()]
        );
        assert!(parse_bug_fixes("   \n ").is_empty());
    }

    #[test]
    fn test_parse_unit_tests_keeps_asserts_only() {
        let content = "assert f(1) == 1\n# comment\n  assert f(2) == 4\nprint('x')";
        assert_eq!(
            parse_unit_tests(content),
            vec!["assert f(1) == 1".to_string(), "assert f(2) == 4".to_string()]
        );
    }
}
