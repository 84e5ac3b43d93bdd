//! Domain model for debugging problems.
//!
//! A problem is loaded once from the problem bank and never mutated. The
//! bug description and expected fixes are withheld from the participant and
//! only ever reach the model through system instructions.
use serde::{Deserialize, Serialize};

use crate::domain::errors::{DomainError, DomainResult};

/// A single debugging exercise presented to a participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    /// Unique identifier, 1..N within a problem bank
    pub id: u32,

    /// Natural-language statement of what the code should do
    pub description: String,

    /// Source code containing the bug
    pub buggy_code: String,

    /// Explanation of the bug (never shown to the participant)
    pub bug_description: String,

    /// Human-readable descriptions of acceptable fixes, in order
    pub expected_fixes: Vec<String>,

    /// Unit-test assertions; empty for sources that ship none
    #[serde(default)]
    pub unit_tests: Vec<String>,

    /// Reference tutoring dialogue, when the source provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_dialogue: Option<String>,
}

impl Problem {
    /// Check that the problem carries everything the prompts embed.
    ///
    /// Unit tests are allowed to be empty.
    pub fn validate(&self) -> DomainResult<()> {
        let invalid = |reason: &str| DomainError::InvalidProblem {
            id: self.id,
            reason: reason.to_string(),
        };

        if self.id == 0 {
            return Err(invalid("id must be at least 1"));
        }
        if self.buggy_code.trim().is_empty() {
            return Err(invalid("buggy code is empty"));
        }
        if self.bug_description.trim().is_empty() {
            return Err(invalid("bug description is empty"));
        }
        if self.expected_fixes.iter().all(|fix| fix.trim().is_empty()) {
            return Err(invalid("at least one expected fix is required"));
        }
        Ok(())
    }

    /// Expected fixes joined one per line, in order
    pub fn expected_fixes_text(&self) -> String {
        self.expected_fixes.join("\n")
    }

    /// Unit tests joined one per line, in order
    pub fn unit_tests_text(&self) -> String {
        self.unit_tests.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn problem() -> Problem {
        Problem {
            id: 1,
            description: "Write a search function".to_string(),
            buggy_code: "def search(x, seq):\n  return 0".to_string(),
            bug_description: "Should use <= instead of <".to_string(),
            expected_fixes: vec!["Replace < with <=".to_string()],
            unit_tests: vec!["assert search(5, [5]) == 0".to_string()],
            example_dialogue: None,
        }
    }

    #[test]
    fn test_valid_problem() {
        assert!(problem().validate().is_ok());
    }

    #[test]
    fn test_empty_unit_tests_are_allowed() {
        let p = Problem {
            unit_tests: vec![],
            ..problem()
        };
        assert!(p.validate().is_ok());
        assert_eq!(p.unit_tests_text(), "");
    }

    #[test]
    fn test_missing_expected_fixes_rejected() {
        let p = Problem {
            expected_fixes: vec![],
            ..problem()
        };
        assert!(matches!(
            p.validate(),
            Err(DomainError::InvalidProblem { id: 1, .. })
        ));
    }

    #[test]
    fn test_blank_bug_description_rejected() {
        let p = Problem {
            bug_description: "   ".to_string(),
            ..problem()
        };
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_joined_text_preserves_order() {
        let p = Problem {
            expected_fixes: vec!["first".to_string(), "second".to_string()],
            unit_tests: vec!["assert a".to_string(), "assert b".to_string()],
            ..problem()
        };
        assert_eq!(p.expected_fixes_text(), "first\nsecond");
        assert_eq!(p.unit_tests_text(), "assert a\nassert b");
    }
}
