use crate::domain::models::Problem;

/// Read-only, ordered collection of problems
pub trait ProblemBank: Send + Sync {
    /// All problems in presentation order
    fn problems(&self) -> &[Problem];

    fn get(&self, id: u32) -> Option<&Problem> {
        self.problems().iter().find(|p| p.id == id)
    }

    fn len(&self) -> usize {
        self.problems().len()
    }

    fn is_empty(&self) -> bool {
        self.problems().is_empty()
    }
}
