//! Result of a self-consistency evaluation.
use serde::{Deserialize, Serialize};

/// Score threshold at or above which the mean counts as a pass
pub const PASS_THRESHOLD: f64 = 0.5;

/// Verdict plus the per-round scores that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub verdict: bool,
    pub scores: Vec<f64>,
}

impl Evaluation {
    /// Aggregate per-round scores into a verdict.
    pub fn from_scores(scores: Vec<f64>) -> Self {
        Self {
            verdict: passes(&scores),
            scores,
        }
    }

    pub fn mean(&self) -> f64 {
        mean(&self.scores)
    }

    /// Number of rounds that scored 1.0
    pub fn agreeing_rounds(&self) -> usize {
        self.scores.iter().filter(|s| **s >= 1.0).count()
    }
}

/// Arithmetic mean; 0.0 for an empty slice
pub fn mean(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let n = scores.len() as f64;
    scores.iter().sum::<f64>() / n
}

/// `mean >= 0.5`; an exact tie passes
pub fn passes(scores: &[f64]) -> bool {
    !scores.is_empty() && mean(scores) >= PASS_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_of_three_passes() {
        let eval = Evaluation::from_scores(vec![1.0, 0.0, 1.0]);
        assert!(eval.verdict);
        assert_eq!(eval.agreeing_rounds(), 2);
    }

    #[test]
    fn test_exact_tie_passes() {
        assert!(passes(&[1.0, 0.0, 1.0, 0.0]));
    }

    #[test]
    fn test_one_of_three_fails() {
        assert!(!Evaluation::from_scores(vec![0.0, 1.0, 0.0]).verdict);
    }

    #[test]
    fn test_empty_scores_never_pass() {
        assert!(!passes(&[]));
        assert!((mean(&[]) - 0.0).abs() < f64::EPSILON);
    }
}
