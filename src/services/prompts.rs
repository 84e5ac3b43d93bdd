//! System-instruction rendering for the tutor and the judge.

use std::fmt::Write;

use crate::domain::models::{Persona, Problem};

/// User text sent with every evaluation round
pub const JUDGE_USER_MESSAGE: &str = "Please evaluate the student's code fix.";

/// Build the tutor's system instruction for `persona` and `problem`.
///
/// The bug description and expected fixes are embedded under headings that
/// tell the model to withhold them.
pub fn tutor_instruction(persona: Persona, problem: &Problem) -> String {
    let mut out = String::new();
    out.push_str(persona.preamble());
    out.push_str("\n\nYour role:\n");
    for guideline in persona.guidelines() {
        let _ = writeln!(out, "- {guideline}");
    }
    let _ = write!(
        out,
        "\nProblem Context:\n{description}\n\n\
         Buggy Code:\n```python\n{buggy_code}\n```\n\n\
         Bug Description (DO NOT REVEAL TO STUDENT):\n{bug_description}\n\n\
         Expected Fix (DO NOT REVEAL TO STUDENT):\n{expected_fix}\n\n\
         Unit Tests:\n```python\n{unit_tests}\n```\n\n",
        description = problem.description,
        buggy_code = problem.buggy_code,
        bug_description = problem.bug_description,
        expected_fix = problem.expected_fixes_text(),
        unit_tests = problem.unit_tests_text(),
    );
    out.push_str(persona.closing());
    out
}

/// Build the judge's system instruction for one submission.
pub fn judge_instruction(problem: &Problem, submitted_code: &str) -> String {
    format!(
        "You are an expert code evaluator. Your task is to determine if the student's proposed \
         bug fix correctly addresses the bug in the original code.\n\n\
         Original Buggy Code:\n```python\n{buggy_code}\n```\n\n\
         Bug Description:\n{bug_description}\n\n\
         Expected Fix(es):\n{expected_fixes}\n\n\
         Student's Final Code:\n```python\n{submitted_code}\n```\n\n\
         Unit Tests that must pass:\n```python\n{unit_tests}\n```\n\n\
         Evaluate whether the student's code:\n\
         1. Addresses the described bug\n\
         2. Would pass all the unit tests\n\
         3. Is semantically equivalent to the expected fix (may have different style but same logic)\n\n\
         Respond with ONLY \"CORRECT\" if the fix is valid, or \"INCORRECT\" if not. \
         Do not include any other text.",
        buggy_code = problem.buggy_code,
        bug_description = problem.bug_description,
        expected_fixes = problem.expected_fixes_text(),
        unit_tests = problem.unit_tests_text(),
    )
}

/// Render a participant message together with their current code draft.
pub fn wrap_with_draft(message: &str, code_draft: Option<&str>) -> String {
    match code_draft {
        Some(code) => format!(
            "[Student's current code]\n```python\n{code}\n```\n\n[Student's message]\n{message}"
        ),
        None => message.to_string(),
    }
}
